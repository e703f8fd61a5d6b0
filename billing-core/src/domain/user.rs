use super::{supplied, ProviderId};

pub type UserId = u64;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub fullname: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub subscribed_provider: Option<ProviderId>,
}

/// Registration payload. Missing fields deserialize as empty strings so that
/// validation can report them instead of the JSON layer.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub fullname: String,
}

/// Partial update of a user. `None` and blank strings leave the field as is.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub fullname: Option<String>,
}

impl User {
    pub fn from_new(id: UserId, new: NewUser) -> Self {
        Self {
            id,
            username: new.username,
            email: new.email,
            fullname: new.fullname,
            subscribed_provider: None,
        }
    }
}

impl UserPatch {
    pub fn apply_to(&self, user: &mut User) {
        if let Some(v) = supplied(&self.username) {
            user.username = v.to_string();
        }
        if let Some(v) = supplied(&self.email) {
            user.email = v.to_string();
        }
        if let Some(v) = supplied(&self.fullname) {
            user.fullname = v.to_string();
        }
    }
}
