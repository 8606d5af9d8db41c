//! Entity model types mirrored from the backend schema.
//!
//! Every record carries a server-assigned string id plus `created` /
//! `last_updated` timestamps. The cache stores entities exactly as the server
//! canonicalized them — updates replace whole records, never merge partial
//! fields.

pub mod container;
pub mod payload;
pub mod reference;
pub mod study;

pub use container::{MatrixPlate, MatrixTube};
pub use payload::{BulkDeleteOutcome, OneOrMany, PlateEntry, StudyEntry};
pub use reference::{Location, SpecimenType};
pub use study::{Specimen, Study, StudySubject};

/// Server-assigned entity identifier. Unique per table, opaque to the client.
pub type EntityId = String;

/// A uniquely identified domain record storable in a [`crate::store::Table`].
pub trait Entity: Clone + Send + Sync + 'static {
    /// The record's table-unique id.
    fn id(&self) -> &EntityId;
}
