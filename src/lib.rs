//! magick-exec translates chainable image edits into a single ImageMagick command line.
//!
//! Nothing touches pixels in-process. Each edit appends command-line tokens to a
//! [`LogicalImage`]; a save plans one argv from those tokens plus [`SaveOptions`] and hands it
//! to an [`Executor`]:
//!
//! - Create a [`Magick`] entry point from [`ToolSettings`]
//! - `open`, `load`, `read` or `create` a [`LogicalImage`]
//! - Chain edits, then `save`, `get` or `show` (or `plan` to inspect the argv)
#![forbid(unsafe_code)]

mod foundation;

/// External tool plumbing.
pub mod exec;
/// Image handles and their edit vocabulary.
pub mod image;
mod magick;
pub mod options;
/// Save planning.
pub mod plan;

pub use crate::foundation::core::{Color, MetadataBag, Point, Profile, Size};
pub use crate::foundation::error::{MagickError, MagickResult, UnsupportedKind};

pub use crate::exec::driver::{Driver, Toolchain, ToolSettings, Version, create_driver};
pub use crate::exec::executor::{
    Executor, RecordingExecutor, SystemExecutor, ToolOutput, is_tool_on_path,
};
pub use crate::image::effects::{Effects, Kernel};
pub use crate::image::fill::Fill;
pub use crate::image::layers::{LayerState, Layers};
pub use crate::image::logical::LogicalImage;
pub use crate::magick::Magick;
pub use crate::options::mapping::{Filter, Interlace, Palette, ResolutionUnit};
pub use crate::options::save::SaveOptions;
pub use crate::plan::planner::{SavePlan, mime_type};
