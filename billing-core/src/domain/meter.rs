use time::OffsetDateTime;

use super::{supplied, UserId};

pub type MeterId = u64;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Meter {
    pub id: MeterId,
    pub user_id: UserId,
    pub name: String,
    pub readings: Vec<Reading>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct NewMeter {
    pub user_id: UserId,
    pub name: String,
}

/// Partial update of a meter. Ownership and readings are not editable.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct MeterPatch {
    pub name: Option<String>,
}

/// One consumption delta recorded against a meter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    pub units: f64,
    #[cfg_attr(feature = "serde", serde(with = "super::timestamp"))]
    pub time: OffsetDateTime,
}

impl Meter {
    pub fn from_new(id: MeterId, new: NewMeter) -> Self {
        Self {
            id,
            user_id: new.user_id,
            name: new.name,
            readings: Vec::new(),
        }
    }
}

impl MeterPatch {
    pub fn apply_to(&self, meter: &mut Meter) {
        if let Some(v) = supplied(&self.name) {
            meter.name = v.to_string();
        }
    }
}

impl Reading {
    pub fn new(units: f64, time: OffsetDateTime) -> Self {
        Self { units, time }
    }
}
