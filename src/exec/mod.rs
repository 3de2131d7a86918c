//! Everything that touches the external tool: the invocation contract, probes, driver
//! selection and temporary files.

pub(crate) mod context;
/// Backend drivers and tool settings.
pub mod driver;
/// The invocation boundary.
pub mod executor;
pub(crate) mod probe;
/// Self-deleting temporary files.
pub mod temp;
