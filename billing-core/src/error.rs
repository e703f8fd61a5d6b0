use std::fmt;

use crate::domain::{ProviderId, UserId};

/// The kinds of entity held by a [`Store`](crate::store::Store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Provider,
    Meter,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Provider => "provider",
            Self::Meter => "meter",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BillingError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },
    #[error("user {user_id} is not subscribed to a provider")]
    NotSubscribed { user_id: UserId },
    #[error("user {user_id} is subscribed to provider {provider_id}, which no longer exists")]
    DanglingSubscription {
        user_id: UserId,
        provider_id: ProviderId,
    },
    #[error("no meters found for user {user_id}")]
    NoMeters { user_id: UserId },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl BillingError {
    pub fn not_found(kind: EntityKind, id: u64) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// True for every outcome that means "the thing you asked about is not
    /// there", including unresolvable subscriptions and meterless users.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::NotSubscribed { .. }
                | Self::DanglingSubscription { .. }
                | Self::NoMeters { .. }
        )
    }

    /// Short machine-readable tag for the error family.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::NotSubscribed { .. } | Self::DanglingSubscription { .. } => "provider_not_found",
            Self::NoMeters { .. } => "meters_not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Unauthorized(_) => "unauthorized",
        }
    }
}

pub type Result<T, E = BillingError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_family_is_grouped() {
        assert!(BillingError::not_found(EntityKind::Meter, 3).is_not_found());
        assert!(BillingError::NotSubscribed { user_id: 1 }.is_not_found());
        assert!(BillingError::DanglingSubscription {
            user_id: 1,
            provider_id: 9
        }
        .is_not_found());
        assert!(BillingError::NoMeters { user_id: 1 }.is_not_found());
        assert!(!BillingError::invalid("bad").is_not_found());
        assert!(!BillingError::Unauthorized("nope".into()).is_not_found());
    }

    #[test]
    fn display_names_the_entity() {
        let err = BillingError::not_found(EntityKind::Provider, 7);
        assert_eq!(err.to_string(), "provider 7 not found");
    }
}
