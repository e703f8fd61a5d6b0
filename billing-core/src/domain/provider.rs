use super::supplied;

pub type ProviderId = u64;

/// An energy/utility provider charging a flat rate per consumed unit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub charge: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct NewProvider {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Missing charge deserializes as NaN and is rejected by validation.
    #[cfg_attr(feature = "serde", serde(default = "missing_charge"))]
    pub charge: f64,
}

/// Partial update of a provider.
///
/// Unlike strings, a zero charge is a real value and is applied.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProviderPatch {
    pub name: Option<String>,
    pub charge: Option<f64>,
}

#[cfg(feature = "serde")]
fn missing_charge() -> f64 {
    f64::NAN
}

impl NewProvider {
    pub fn new(name: impl Into<String>, charge: f64) -> Self {
        Self {
            name: name.into(),
            charge,
        }
    }
}

impl Provider {
    pub fn from_new(id: ProviderId, new: NewProvider) -> Self {
        Self {
            id,
            name: new.name,
            charge: new.charge,
        }
    }
}

impl ProviderPatch {
    pub fn apply_to(&self, provider: &mut Provider) {
        if let Some(v) = supplied(&self.name) {
            provider.name = v.to_string();
        }
        if let Some(charge) = self.charge {
            provider.charge = charge;
        }
    }
}
