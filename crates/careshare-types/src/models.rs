use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle of a needed item. `Pledged` is terminal for donors; only the
/// owning orphanage can move an item back to `Active` through an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Active,
    Pledged,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Pledged => "Pledged",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Pledged" => Ok(Self::Pledged),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DonationStatus {
    Submitted,
    Received,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::Received => "Received",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Submitted" => Ok(Self::Submitted),
            "Received" => Ok(Self::Received),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_status_parses_exact_names_only() {
        assert_eq!("Active".parse::<ItemStatus>(), Ok(ItemStatus::Active));
        assert_eq!("Pledged".parse::<ItemStatus>(), Ok(ItemStatus::Pledged));
        assert!("active".parse::<ItemStatus>().is_err());
        assert!("".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn donation_status_display_matches_storage_name() {
        assert_eq!(DonationStatus::Received.to_string(), "Received");
        assert_eq!(
            DonationStatus::Submitted.as_str().parse::<DonationStatus>(),
            Ok(DonationStatus::Submitted)
        );
    }

    #[test]
    fn status_serializes_as_plain_string() {
        let json = serde_json::to_string(&ItemStatus::Pledged).unwrap();
        assert_eq!(json, "\"Pledged\"");
    }
}
