use std::fmt;
use std::path::{Path, PathBuf};

use crate::foundation::error::{MagickError, MagickResult};

/// Which ImageMagick command layout to drive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
    /// Separate `convert` and `identify` binaries.
    #[default]
    ImageMagick6,
    /// Single `magick` binary (`magick identify` for probes).
    ImageMagick7,
}

/// Tool-level settings shared by every image opened through one entry point.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    pub toolchain: Toolchain,
    /// Directory holding the binaries; `None` resolves them through `PATH`.
    pub bin_dir: Option<PathBuf>,
    /// Directory for temporary files; `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
    /// Query `-version` at construction and reject tools older than the driver minimum.
    pub check_version: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            toolchain: Toolchain::default(),
            bin_dir: None,
            temp_dir: None,
            check_version: true,
        }
    }
}

impl ToolSettings {
    pub fn validate(&self) -> MagickResult<()> {
        for (what, dir) in [("bin_dir", &self.bin_dir), ("temp_dir", &self.temp_dir)] {
            if let Some(dir) = dir
                && !dir.is_dir()
            {
                return Err(MagickError::invalid_argument(format!(
                    "{what} '{}' is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    pub fn with_bin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = Some(dir.into());
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_version_check(mut self, check: bool) -> Self {
        self.check_version = check;
        self
    }
}

/// `major.minor.patch` of an installed tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the version from a `-version` banner such as
    /// `Version: ImageMagick 6.9.11-60 Q16 x86_64 2021-01-25`.
    pub fn from_banner(banner: &str) -> MagickResult<Self> {
        let missing = || MagickError::precondition("ImageMagick is not installed");
        let token = banner
            .split_once("ImageMagick ")
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .ok_or_else(missing)?;

        let numeric = token.split('-').next().unwrap_or(token);
        let mut parts = numeric.split('.').map(str::parse::<u32>);
        let mut next = || parts.next().transpose().map_err(|_| missing());
        let major = next()?.ok_or_else(missing)?;
        let minor = next()?.unwrap_or(0);
        let patch = next()?.unwrap_or(0);
        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One backend's command layout. Selected from [`ToolSettings::toolchain`] by [`create_driver`].
pub trait Driver: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;
    /// Program (and leading subcommand, if any) that runs conversions.
    fn convert_argv(&self) -> Vec<String>;
    /// Program (and leading subcommand, if any) that runs `identify` probes.
    fn identify_argv(&self) -> Vec<String>;
    fn min_version(&self) -> Version;
}

#[derive(Debug)]
struct ImageMagick6Driver {
    bin_dir: Option<PathBuf>,
}

impl Driver for ImageMagick6Driver {
    fn name(&self) -> &'static str {
        "imagemagick6"
    }

    fn convert_argv(&self) -> Vec<String> {
        vec![program(self.bin_dir.as_deref(), "convert")]
    }

    fn identify_argv(&self) -> Vec<String> {
        vec![program(self.bin_dir.as_deref(), "identify")]
    }

    fn min_version(&self) -> Version {
        Version::new(6, 2, 9)
    }
}

#[derive(Debug)]
struct ImageMagick7Driver {
    bin_dir: Option<PathBuf>,
}

impl Driver for ImageMagick7Driver {
    fn name(&self) -> &'static str {
        "imagemagick7"
    }

    fn convert_argv(&self) -> Vec<String> {
        vec![program(self.bin_dir.as_deref(), "magick")]
    }

    fn identify_argv(&self) -> Vec<String> {
        vec![
            program(self.bin_dir.as_deref(), "magick"),
            "identify".to_string(),
        ]
    }

    fn min_version(&self) -> Version {
        Version::new(7, 0, 0)
    }
}

fn program(bin_dir: Option<&Path>, name: &str) -> String {
    match bin_dir {
        Some(dir) => dir.join(name).to_string_lossy().into_owned(),
        None => name.to_string(),
    }
}

pub fn create_driver(kind: Toolchain, settings: &ToolSettings) -> Box<dyn Driver> {
    let bin_dir = settings.bin_dir.clone();
    match kind {
        Toolchain::ImageMagick6 => Box::new(ImageMagick6Driver { bin_dir }),
        Toolchain::ImageMagick7 => Box::new(ImageMagick7Driver { bin_dir }),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/exec/driver.rs"]
mod tests;
