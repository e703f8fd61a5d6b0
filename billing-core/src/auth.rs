//! Admin authorization, applied by callers before privileged operations.

use crate::error::{BillingError, Result};

pub trait Authorizer: Send + Sync {
    /// `credential` is whatever the caller presented, if anything.
    fn authorize(&self, credential: Option<&str>) -> Result<()>;
}

/// Used when no admin secret is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _credential: Option<&str>) -> Result<()> {
        Ok(())
    }
}

/// Accepts exactly one shared secret.
#[derive(Clone)]
pub struct SharedSecret {
    secret: String,
}

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret").finish_non_exhaustive()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl Authorizer for SharedSecret {
    fn authorize(&self, credential: Option<&str>) -> Result<()> {
        match credential {
            None => Err(BillingError::Unauthorized("admin key required".to_string())),
            Some(presented) if constant_time_eq(presented.as_bytes(), self.secret.as_bytes()) => {
                Ok(())
            }
            Some(_) => Err(BillingError::Unauthorized("admin key rejected".to_string())),
        }
    }
}
