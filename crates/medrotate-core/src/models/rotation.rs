//! Rotation model and the default rotation sets

use serde::{Deserialize, Serialize};

use super::RotationId;

/// Icon used when the caller does not pick one
pub const DEFAULT_ICON: &str = "heart";

/// A clinical service/specialty period that scopes a set of notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation {
    /// Unique identifier
    pub id: RotationId,
    /// Display name (e.g. "Cardiology")
    pub name: String,
    /// Symbolic icon tag (e.g. "heart-pulse")
    pub icon: String,
    /// Whether the last write reached the remote (in intent)
    #[serde(default)]
    pub synced: bool,
}

impl Rotation {
    /// Create a rotation with a freshly generated id
    #[must_use]
    pub fn new(name: impl Into<String>, icon: impl Into<String>, synced: bool) -> Self {
        Self {
            id: RotationId::generate(),
            name: name.into(),
            icon: icon.into(),
            synced,
        }
    }
}

/// Which fixed set seeds an empty store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultRotationSet {
    /// Regional curriculum with stable slug ids
    #[default]
    Regional,
    /// General specialties with generated ids
    General,
}

const REGIONAL_ROTATIONS: [(&str, &str, &str); 5] = [
    ("medicine", "Medicine", "heart-pulse"),
    ("surgery", "Surgery", "brain"),
    ("obgyn", "Reproductive Health (OBGYN)", "lungs"),
    ("pediatrics", "Pediatrics", "baby"),
    ("emergency", "Emergency Medicine", "truck-medical"),
];

const GENERAL_ROTATIONS: [(&str, &str); 5] = [
    ("Cardiology", "heart-pulse"),
    ("Neurology", "brain"),
    ("Pediatrics", "baby"),
    ("Surgery", "scalpel"),
    ("Emergency Medicine", "truck-medical"),
];

impl DefaultRotationSet {
    /// Materialize the set with every record's `synced` flag set to `synced`
    #[must_use]
    pub fn rotations(self, synced: bool) -> Vec<Rotation> {
        match self {
            Self::Regional => REGIONAL_ROTATIONS
                .iter()
                .map(|(id, name, icon)| Rotation {
                    id: RotationId::from(*id),
                    name: (*name).to_string(),
                    icon: (*icon).to_string(),
                    synced,
                })
                .collect(),
            Self::General => GENERAL_ROTATIONS
                .iter()
                .map(|(name, icon)| Rotation::new(*name, *icon, synced))
                .collect(),
        }
    }
}

impl std::str::FromStr for DefaultRotationSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regional" => Ok(Self::Regional),
            "general" => Ok(Self::General),
            other => Err(format!("unknown default rotation set '{other}'")),
        }
    }
}
