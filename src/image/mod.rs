/// Argument accumulation for pending edits.
pub mod arguments;
pub mod effects;
pub mod fill;
/// Frame sequence state decided at save time.
pub mod layers;
/// The deferred image handle.
pub mod logical;
