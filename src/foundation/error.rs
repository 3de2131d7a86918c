use std::fmt;

/// Convenience result type used across the crate.
pub type MagickResult<T> = Result<T, MagickError>;

/// What kind of value an [`MagickError::Unsupported`] error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnsupportedKind {
    /// Output or input image format.
    Format,
    /// Resolution unit.
    Unit,
    /// Any enumerated option (filter, interlace scheme, ...).
    Option,
    /// Colorspace reported by the prober.
    Colorspace,
    /// Palette name.
    Palette,
    /// Toolchain or toolchain version.
    Toolchain,
}

impl fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Format => "format",
            Self::Unit => "unit",
            Self::Option => "option",
            Self::Colorspace => "colorspace",
            Self::Palette => "palette",
            Self::Toolchain => "toolchain",
        })
    }
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum MagickError {
    /// Malformed geometry, out-of-range parameters or otherwise unusable input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Coordinates or sizes exceeding the image bounds.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// A value the tool vocabulary has no mapping for.
    #[error("unsupported {kind}: {value}")]
    Unsupported {
        /// Category of the rejected value.
        kind: UnsupportedKind,
        /// The offending value, verbatim.
        value: String,
    },

    /// The external tool ran and reported failure.
    #[error("external tool failed ({status}): {stderr}")]
    ExternalTool {
        /// Exit status as reported by the executor.
        status: String,
        /// Captured diagnostic output.
        stderr: String,
    },

    /// The call cannot proceed in the current state.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MagickError {
    /// Build a [`MagickError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a [`MagickError::OutOfRange`] value.
    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }

    /// Build a [`MagickError::Unsupported`] value.
    pub fn unsupported(kind: UnsupportedKind, value: impl Into<String>) -> Self {
        Self::Unsupported {
            kind,
            value: value.into(),
        }
    }

    /// Build a [`MagickError::ExternalTool`] value.
    pub fn external_tool(status: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ExternalTool {
            status: status.into(),
            stderr: stderr.into(),
        }
    }

    /// Build a [`MagickError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
