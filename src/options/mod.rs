//! Option vocabularies and the save-time option record.

/// Typed options and their command-line names.
pub mod mapping;
/// Options consumed by a single save.
pub mod save;
