//! Flat reference entities: storage locations and specimen types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId};

/// A physical storage location (freezer, shelf, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: EntityId,
    pub description: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Entity for Location {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// A kind of biological specimen (plasma, whole blood, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecimenType {
    pub id: EntityId,
    pub label: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Entity for SpecimenType {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
