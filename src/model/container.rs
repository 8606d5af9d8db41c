//! Storage container entities: matrix tubes and the plates that hold them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId};

/// A barcoded 2D matrix tube holding one specimen aliquot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixTube {
    pub id: EntityId,
    /// Id of the specimen this tube holds.
    pub specimen: EntityId,
    /// Id of the plate this tube sits in.
    pub plate: EntityId,
    pub barcode: String,
    /// Well coordinate on the plate, e.g. `"A01"`.
    pub well_position: String,
    #[serde(default)]
    pub comments: Option<String>,
    /// True once the aliquot has been used up.
    #[serde(default)]
    pub exhausted: bool,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Entity for MatrixTube {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// A matrix plate: a rack of tube wells stored at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixPlate {
    pub id: EntityId,
    /// Human-facing plate identifier (scanner filename stem).
    pub uid: String,
    /// Id of the location storing this plate.
    pub location: EntityId,
    /// Hidden plates are filtered out of list views unless the show-hidden
    /// toggle is on.
    #[serde(default)]
    pub hidden: bool,
    /// Ids of the tubes currently on this plate.
    #[serde(default)]
    pub tubes: Vec<EntityId>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Entity for MatrixPlate {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
