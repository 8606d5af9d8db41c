//! Wire payload types for detail loads and bulk operations.
//!
//! A detail load returns one primary entity plus the related collections the
//! server denormalized alongside it (a study arrives with its subjects, their
//! specimens, and those specimens' tubes). The plate endpoint is
//! shape-polymorphic: a single plate for a detail load, a whole list for a
//! bulk CSV update matched by filename. [`OneOrMany`] coerces both shapes to
//! a list here at the transport boundary, so everything downstream is
//! shape-uniform.

use serde::Deserialize;

use super::{EntityId, MatrixPlate, MatrixTube, Specimen, Study, StudySubject};

/// A response field that may be a single value or an array of values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Coerce to a list.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(value: T) -> Self {
        Self::One(value)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values)
    }
}

/// Detail-load payload for a study: the study plus its related subgraph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudyEntry {
    pub study: Study,
    #[serde(rename = "study_subject", default)]
    pub study_subjects: Vec<StudySubject>,
    #[serde(rename = "specimen", default)]
    pub specimens: Vec<Specimen>,
    #[serde(rename = "matrix_tube", default)]
    pub matrix_tubes: Vec<MatrixTube>,
}

impl StudyEntry {
    /// A subgraph-free entry, as returned by create/update echoes.
    pub fn bare(study: Study) -> Self {
        Self {
            study,
            study_subjects: Vec::new(),
            specimens: Vec::new(),
            matrix_tubes: Vec::new(),
        }
    }
}

/// Detail-load (or bulk-update) payload for matrix plates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlateEntry {
    /// One plate for a detail load, several for a bulk update.
    #[serde(rename = "matrix_plate")]
    pub plates: OneOrMany<MatrixPlate>,
    #[serde(rename = "study_subject", default)]
    pub study_subjects: Vec<StudySubject>,
    #[serde(rename = "specimen", default)]
    pub specimens: Vec<Specimen>,
    #[serde(rename = "matrix_tube", default)]
    pub matrix_tubes: Vec<MatrixTube>,
}

impl PlateEntry {
    /// A subgraph-free entry holding a single plate.
    pub fn bare(plate: MatrixPlate) -> Self {
        Self {
            plates: OneOrMany::One(plate),
            study_subjects: Vec::new(),
            specimens: Vec::new(),
            matrix_tubes: Vec::new(),
        }
    }

    /// A subgraph-free entry holding a list of plates, as echoed by the
    /// hide/unhide endpoints.
    pub fn many(plates: Vec<MatrixPlate>) -> Self {
        Self {
            plates: OneOrMany::Many(plates),
            study_subjects: Vec::new(),
            specimens: Vec::new(),
            matrix_tubes: Vec::new(),
        }
    }
}

/// What a bulk delete removed, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BulkDeleteOutcome {
    #[serde(rename = "matrix_tube_ids")]
    pub tube_ids: Vec<EntityId>,
    #[serde(rename = "specimen_ids")]
    pub specimen_ids: Vec<EntityId>,
}
