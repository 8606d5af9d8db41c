//! Study, study subject, and specimen entities.
//!
//! A study owns subjects (`Study.subjects` is a foreign-key id list), a
//! subject owns specimens (`StudySubject.specimens`), and a specimen points
//! back at its subject and forward at its specimen type. The id lists are the
//! cache's responsibility: after any transition they must only name ids that
//! exist in the target table.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId};

/// A research study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    pub id: EntityId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_code: Option<String>,
    pub lead_person: Option<String>,
    pub is_longitudinal: Option<bool>,
    /// Ids of this study's subjects, in server order.
    #[serde(default)]
    pub subjects: Vec<EntityId>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Entity for Study {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// An enrolled subject within a study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySubject {
    pub id: EntityId,
    /// Study-scoped subject identifier (the uid printed on labels).
    pub uid: String,
    /// Owning study id.
    pub study: EntityId,
    /// Ids of specimens collected from this subject.
    #[serde(default)]
    pub specimens: Vec<EntityId>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Entity for StudySubject {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// A collected specimen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specimen {
    pub id: EntityId,
    /// Owning subject id.
    pub study_subject: EntityId,
    /// The specimen's type id.
    pub specimen_type: EntityId,
    /// Collection date as recorded by the lab; may be unknown.
    #[serde(default)]
    pub collection_date: Option<NaiveDate>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Entity for Specimen {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
