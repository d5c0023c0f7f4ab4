//! Account lifecycle status.
//!
//! Stored as lowercase text in `accounts.status`. Only [`AccountStatus::Active`]
//! accounts can hold a usable session.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    /// Created but not yet activated.
    Pending,
    Disabled,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown account status: {0}")]
pub struct UnknownAccountStatus(pub String);

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Pending => "pending",
            AccountStatus::Disabled => "disabled",
        }
    }

    pub fn can_authenticate(self) -> bool {
        self == AccountStatus::Active
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AccountStatus {
    type Error = UnknownAccountStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(AccountStatus::Active),
            "pending" => Ok(AccountStatus::Pending),
            "disabled" => Ok(AccountStatus::Disabled),
            _ => Err(UnknownAccountStatus(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_text() {
        for status in [
            AccountStatus::Active,
            AccountStatus::Pending,
            AccountStatus::Disabled,
        ] {
            let parsed = AccountStatus::try_from(status.as_str().to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_text_is_rejected() {
        let err = AccountStatus::try_from("ACTIVE".to_string()).unwrap_err();
        assert_eq!(err.0, "ACTIVE");
    }

    #[test]
    fn only_active_can_authenticate() {
        assert!(AccountStatus::Active.can_authenticate());
        assert!(!AccountStatus::Pending.can_authenticate());
        assert!(!AccountStatus::Disabled.can_authenticate());
    }
}
