use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::exec::context::ToolContext;
use crate::exec::driver::ToolSettings;
use crate::exec::executor::{Executor, SystemExecutor};
use crate::exec::temp::ScopedFile;
use crate::foundation::core::{Color, MetadataBag, Size};
use crate::foundation::error::{MagickError, MagickResult};
use crate::image::logical::LogicalImage;
use crate::options::mapping::Palette;

/// Entry point producing [`LogicalImage`]s.
///
/// Construction resolves the backend driver and, unless disabled in [`ToolSettings`], checks
/// that the installed tool is recent enough. Every image created here shares that context.
#[derive(Clone, Debug)]
pub struct Magick {
    ctx: Arc<ToolContext>,
}

impl Magick {
    /// Run the tool as a child process.
    pub fn new(settings: &ToolSettings) -> MagickResult<Self> {
        Self::with_executor(settings, Arc::new(SystemExecutor))
    }

    pub fn with_executor(
        settings: &ToolSettings,
        executor: Arc<dyn Executor>,
    ) -> MagickResult<Self> {
        let ctx = ToolContext::new(settings, executor)?;
        Ok(Self { ctx: Arc::new(ctx) })
    }

    /// Name of the selected backend driver.
    pub fn driver_name(&self) -> &'static str {
        self.ctx.driver().name()
    }

    /// Open an image file. Saving without a path later writes back to `path`.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(&self, path: impl AsRef<Path>) -> MagickResult<LogicalImage> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MagickError::invalid_argument(format!(
                "file '{}' does not exist",
                path.display()
            )));
        }

        let mut metadata = MetadataBag::new();
        metadata.insert("filepath", path.to_string_lossy());
        self.probe_file(path, Some(path.to_path_buf()), metadata)
    }

    /// Open an image from its encoded bytes, kept in a temporary file for the image's lifetime.
    pub fn load(&self, bytes: &[u8]) -> MagickResult<LogicalImage> {
        let file: ScopedFile = self.ctx.temp().write("im", bytes)?;
        let mut image = self.probe_file(&file, None, MetadataBag::new())?;
        image.attach(file);
        Ok(image)
    }

    /// Read `reader` to the end, then [`Magick::load`] the bytes.
    pub fn read(&self, mut reader: impl Read) -> MagickResult<LogicalImage> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .context("failed to read image stream")?;
        self.load(&bytes)
    }

    /// Blank canvas of `size`, white unless `background` is given.
    pub fn create(&self, size: Size, background: Option<Color>) -> MagickResult<LogicalImage> {
        if size.is_empty() {
            return Err(MagickError::invalid_argument(format!(
                "canvas size {size} must be positive"
            )));
        }
        let color = background.unwrap_or(Color::WHITE);
        let input = vec![
            "-size".to_string(),
            size.to_string(),
            format!("xc:{color}"),
        ];
        let image = LogicalImage::new(
            Arc::clone(&self.ctx),
            input,
            None,
            Palette::Rgb,
            1,
            MetadataBag::new(),
        );
        Ok(image.with_size(size))
    }

    fn probe_file(
        &self,
        path: &Path,
        source: Option<PathBuf>,
        metadata: MetadataBag,
    ) -> MagickResult<LogicalImage> {
        let prober = self.ctx.prober();
        let palette = prober.palette(path)?;
        let frames = prober.frame_count(path)?;
        tracing::debug!(%palette, frames, "image opened");

        Ok(LogicalImage::new(
            Arc::clone(&self.ctx),
            vec![path.to_string_lossy().into_owned()],
            source,
            palette,
            frames,
            metadata,
        ))
    }
}

#[cfg(test)]
#[path = "../tests/unit/magick.rs"]
mod tests;
