use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::exec::context::ToolContext;
use crate::exec::temp::ScopedFile;
use crate::foundation::core::{Color, MetadataBag, Point, Profile, Size};
use crate::foundation::error::{MagickError, MagickResult};
use crate::image::arguments::Arguments;
use crate::image::effects::Effects;
use crate::image::fill::Fill;
use crate::image::layers::Layers;
use crate::options::mapping::{Filter, Interlace, Palette};
use crate::options::save::SaveOptions;
use crate::plan::planner::{PlanInput, SavePlan, mime_type, plan_save};

/// One not-yet-rendered image edit session.
///
/// Editing calls translate into command-line tokens immediately; nothing runs until the image
/// is saved (or a query such as [`LogicalImage::size`] needs an answer from the tool). Two
/// images holding the same tokens behave identically, whatever calls produced them.
#[derive(Debug)]
pub struct LogicalImage {
    ctx: Arc<ToolContext>,
    /// Tokens reading the source: a file path, or a `-size WxH xc:<color>` canvas.
    input: Vec<String>,
    source: Option<PathBuf>,
    arguments: Arguments,
    palette: Palette,
    size: Option<Size>,
    layers: Layers,
    metadata: MetadataBag,
}

impl LogicalImage {
    pub(crate) fn new(
        ctx: Arc<ToolContext>,
        input: Vec<String>,
        source: Option<PathBuf>,
        palette: Palette,
        frames: usize,
        metadata: MetadataBag,
    ) -> Self {
        Self {
            ctx,
            input,
            source,
            arguments: Arguments::new(),
            palette,
            size: None,
            layers: Layers::new(frames),
            metadata,
        }
    }

    pub(crate) fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Keep `file` alive for as long as this image (or any copy) references it.
    pub(crate) fn attach(&mut self, file: ScopedFile) {
        self.arguments.attach(file);
    }

    /// Independent branch: later edits to either image never reach the other.
    pub fn copy(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            input: self.input.clone(),
            source: self.source.clone(),
            arguments: self.arguments.clone(),
            palette: self.palette,
            size: self.size,
            layers: self.layers.fresh(),
            metadata: self.metadata.clone(),
        }
    }

    /// Pending tokens, in the order they will be passed to the tool.
    pub fn arguments(&self) -> &[String] {
        self.arguments.tokens()
    }

    pub fn input(&self) -> &[String] {
        &self.input
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn metadata(&self) -> &MetadataBag {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataBag {
        &mut self.metadata
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    /// Current size, asking the tool (with all pending arguments applied) when not cached.
    pub fn size(&mut self) -> MagickResult<Size> {
        let size = self.resolved_size()?;
        self.size = Some(size);
        Ok(size)
    }

    fn resolved_size(&self) -> MagickResult<Size> {
        match self.size {
            Some(size) => Ok(size),
            None => self.ctx.prober().size(&self.source_tokens()),
        }
    }

    fn source_tokens(&self) -> Vec<String> {
        self.input
            .iter()
            .chain(self.arguments.tokens())
            .cloned()
            .collect()
    }

    pub fn crop(&mut self, start: Point, size: Size) -> MagickResult<&mut Self> {
        let bounds = self.size()?;
        if size.is_empty() || !start.is_in(bounds) || !bounds.contains(size, start) {
            return Err(MagickError::out_of_range(format!(
                "crop {size}+{}+{} must start inside and stay within the {bounds} image",
                start.x, start.y
            )));
        }

        self.arguments.push(
            "-crop",
            [format!(
                "{}x{}+{}+{}",
                size.width, size.height, start.x, start.y
            )],
        );
        self.size = None;
        Ok(self)
    }

    pub fn flip_horizontally(&mut self) -> &mut Self {
        self.arguments.push_flag("-flop");
        self
    }

    pub fn flip_vertically(&mut self) -> &mut Self {
        self.arguments.push_flag("-flip");
        self
    }

    /// Remove profiles and comments.
    pub fn strip(&mut self) -> &mut Self {
        self.arguments.push_flag("-strip");
        self
    }

    /// Resize to exactly `size`. The cached size is updated without asking the tool.
    pub fn resize(&mut self, size: Size, filter: Filter) -> MagickResult<&mut Self> {
        if size.is_empty() {
            return Err(MagickError::invalid_argument(format!(
                "resize target {size} must be positive"
            )));
        }
        self.arguments.push("-resize", [size.to_string()]);
        if let Some(name) = filter.tool_name() {
            self.arguments.push("-filter", [name]);
        }
        self.size = Some(size);
        Ok(self)
    }

    /// Rotate clockwise by `angle` degrees, filling uncovered corners with `background`.
    pub fn rotate(&mut self, angle: f64, background: Option<Color>) -> MagickResult<&mut Self> {
        if !angle.is_finite() {
            return Err(MagickError::invalid_argument(format!(
                "rotation angle must be finite, got {angle}"
            )));
        }
        if let Some(color) = background {
            self.arguments.push("-background", [color.to_string()]);
        }
        self.arguments.push("-rotate", [angle.to_string()]);
        self.size = None;
        Ok(self)
    }

    pub fn interlace(&mut self, scheme: Interlace) -> &mut Self {
        self.arguments.push("-interlace", [scheme.tool_name()]);
        self
    }

    /// Apply a color profile; its bytes go through a temporary file.
    pub fn profile(&mut self, profile: &Profile) -> MagickResult<&mut Self> {
        let file = self.ctx.temp().write("ip", &profile.data)?;
        self.arguments
            .push("-profile", [file.to_string_lossy().into_owned()]);
        self.arguments.attach(file);
        Ok(self)
    }

    /// Convert to `palette`. A no-op when the palette does not change.
    pub fn use_palette(&mut self, palette: Palette) -> &mut Self {
        if self.palette == palette {
            return self;
        }
        self.arguments.push("-type", [palette.matte_type()]);
        self.arguments.push("-colorspace", [palette.colorspace()]);
        self.palette = palette;
        self
    }

    /// Composite `image` at `start` with `alpha` percent opacity.
    pub fn paste(
        &mut self,
        image: &LogicalImage,
        start: Point,
        alpha: u8,
    ) -> MagickResult<&mut Self> {
        if alpha > 100 {
            return Err(MagickError::invalid_argument(format!(
                "paste alpha must be a percentage from 0 to 100, got {alpha}"
            )));
        }
        let bounds = self.size()?;
        let pasted = image.resolved_size()?;
        if !bounds.contains(pasted, start) {
            return Err(MagickError::out_of_range(format!(
                "cannot paste a {pasted} image at +{}+{}, it moves outside the {bounds} image",
                start.x, start.y
            )));
        }

        self.arguments
            .push_group(image.source_tokens(), image.arguments.resources());
        self.arguments
            .push("-geometry", [format!("+{}+{}", start.x, start.y)]);
        if alpha == 100 {
            self.arguments.push("-compose", ["Over"]);
        } else {
            self.arguments.push("-compose", ["Dissolve"]);
            self.arguments
                .push("-define", [format!("compose:args={alpha}")]);
        }
        self.arguments.push_flag("-composite");
        Ok(self)
    }

    /// Grayscale copy without alpha, suitable for [`LogicalImage::apply_mask`].
    pub fn mask(&self) -> LogicalImage {
        let mut mask = self.copy();
        mask.arguments.push("-modulate", ["100,0,100"]);
        mask.arguments.push("-alpha", ["off"]);
        mask
    }

    /// Use the intensity of `mask` as this image's opacity. Sizes must match.
    pub fn apply_mask(&mut self, mask: &LogicalImage) -> MagickResult<&mut Self> {
        let size = self.size()?;
        let mask_size = mask.resolved_size()?;
        if size != mask_size {
            return Err(MagickError::invalid_argument(format!(
                "the mask is {mask_size} while the image is {size}; sizes must match"
            )));
        }

        let mut group = mask.source_tokens();
        group.extend(["-alpha".to_string(), "off".to_string()]);
        self.arguments.push_group(group, mask.arguments.resources());
        self.arguments.push("-alpha", ["off"]);
        self.arguments.push("-compose", ["CopyOpacity"]);
        self.arguments.push_flag("-composite");
        Ok(self)
    }

    /// Composite `fill` over the whole image.
    pub fn fill(&mut self, fill: &Fill) -> MagickResult<&mut Self> {
        let size = self.size()?;
        self.arguments.push_group(fill.canvas_tokens(size), &[]);
        self.arguments.push("-compose", ["Over"]);
        self.arguments.push_flag("-composite");
        Ok(self)
    }

    pub fn effects(&mut self) -> Effects<'_> {
        Effects::new(&mut self.arguments)
    }

    /// Append every frame of `image` to this image's frame sequence.
    pub fn add_layer(&mut self, image: &LogicalImage) -> &mut Self {
        self.arguments
            .push_group(image.source_tokens(), image.arguments.resources());
        // The group carries no -flatten, so every frame of the other image is read.
        for _ in 0..image.layers.frames() {
            self.layers.added();
        }
        self
    }

    pub fn remove_layer(&mut self, index: usize) -> MagickResult<&mut Self> {
        self.layers.check_removable(index)?;
        self.arguments.push("-delete", [index.to_string()]);
        self.layers.removed();
        // The size query reports the first frame, which may now be a different one.
        self.size = None;
        Ok(self)
    }

    /// Expand every frame to the full canvas so frames can be edited independently.
    pub fn coalesce_layers(&mut self) -> &mut Self {
        self.arguments.push_flag("-coalesce");
        self.size = None;
        self
    }

    /// Color of the pixel at `point`, with pending arguments applied.
    pub fn color_at(&mut self, point: Point) -> MagickResult<Color> {
        let size = self.size()?;
        if !point.is_in(size) {
            return Err(MagickError::out_of_range(format!(
                "point +{}+{} is outside the {size} image",
                point.x, point.y
            )));
        }
        self.ctx.prober().color_at(&self.source_tokens(), point)
    }

    /// Distinct colors of the image, with pending arguments applied.
    pub fn histogram(&self) -> MagickResult<Vec<Color>> {
        self.ctx.prober().histogram(&self.source_tokens())
    }

    /// Build the command line a save to `path` would run, without running it.
    ///
    /// `path` falls back to the file the image was opened from.
    pub fn plan(&self, path: Option<&Path>, options: &SaveOptions) -> MagickResult<SavePlan> {
        let destination = path.or(self.source.as_deref()).ok_or_else(|| {
            MagickError::precondition(
                "a save path can only be omitted for images opened from a file",
            )
        })?;

        plan_save(
            PlanInput {
                program: self.ctx.driver().convert_argv(),
                input: &self.input,
                arguments: self.arguments.tokens(),
                source: self.source.as_deref(),
                layers: &self.layers,
            },
            destination,
            options,
        )
    }

    /// Plan and run the save. On failure the image is left as it was.
    #[tracing::instrument(skip_all)]
    pub fn save(&mut self, path: Option<&Path>, options: &SaveOptions) -> MagickResult<&mut Self> {
        let plan = self.plan(path, options)?;
        ensure_parent_dir(plan.destination())?;
        let (argv, layers) = plan.into_parts();
        self.ctx.run(&argv)?;
        self.layers = layers;
        Ok(self)
    }

    /// Encoded bytes in `format`, produced through a temporary file that is always removed.
    pub fn get(&mut self, format: &str, options: &SaveOptions) -> MagickResult<Vec<u8>> {
        let mut options = options.clone();
        options.format = Some(format.to_string());

        let suffix = format!(".{}", format.to_ascii_lowercase());
        let target = self.ctx.temp().create("im", &suffix)?.into_temp_path();
        let path: &Path = &target;
        self.save(Some(path), &options)?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read rendered image '{}'", target.display()))?;
        Ok(bytes)
    }

    /// Write the encoded bytes to `out` and return their MIME type.
    pub fn show(
        &mut self,
        format: &str,
        options: &SaveOptions,
        out: &mut impl Write,
    ) -> MagickResult<&'static str> {
        let mime = mime_type(format)?;
        let bytes = self.get(format, options)?;
        out.write_all(&bytes)
            .context("failed to write rendered image")?;
        Ok(mime)
    }
}

impl Clone for LogicalImage {
    fn clone(&self) -> Self {
        self.copy()
    }
}

fn ensure_parent_dir(path: &Path) -> MagickResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/image/logical.rs"]
mod tests;
