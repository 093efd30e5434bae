use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::ValidationError;

/// Статус жизненного цикла записи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    #[default]
    Pending,
    Inactive,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Pending => "pending",
            EntityStatus::Inactive => "inactive",
        }
    }

    pub fn all() -> [EntityStatus; 3] {
        [
            EntityStatus::Active,
            EntityStatus::Pending,
            EntityStatus::Inactive,
        ]
    }
}

impl std::fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(EntityStatus::Active),
            "pending" => Ok(EntityStatus::Pending),
            "inactive" => Ok(EntityStatus::Inactive),
            other => Err(ValidationError::new(
                "status",
                format!("Unknown status '{}'", other),
            )),
        }
    }
}
