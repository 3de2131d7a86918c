//! Save planning: turning pending arguments plus [`SaveOptions`] into one final argv.
//!
//! The planner is a pure function of its inputs. All validation happens here, before anything
//! is executed, so a planning error never leaves a half-run tool behind.

use std::path::{Path, PathBuf};

use crate::foundation::error::{MagickError, MagickResult, UnsupportedKind};
use crate::image::layers::Layers;
use crate::options::save::SaveOptions;

const JPEG_FORMATS: [&str; 3] = ["jpeg", "jpg", "pjpeg"];
const PNG_DEFAULT_LEVEL: i32 = 7;
const PNG_DEFAULT_FILTER: i32 = 5;

/// Finished, single-use command line for one save.
#[derive(Debug)]
pub struct SavePlan {
    argv: Vec<String>,
    format: String,
    destination: PathBuf,
    layers: Layers,
}

impl SavePlan {
    /// Full argv, program first, destination last.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Resolved output format, lowercased.
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Layer state this save puts the image in.
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Layers) {
        (self.argv, self.layers)
    }
}

/// What the planner reads from an image.
pub(crate) struct PlanInput<'a> {
    /// Program and leading subcommand.
    pub program: Vec<String>,
    pub input: &'a [String],
    pub arguments: &'a [String],
    /// File the image was opened from, if any.
    pub source: Option<&'a Path>,
    pub layers: &'a Layers,
}

#[tracing::instrument(skip_all, fields(destination = %destination.display()))]
pub(crate) fn plan_save(
    input: PlanInput<'_>,
    destination: &Path,
    options: &SaveOptions,
) -> MagickResult<SavePlan> {
    let format = resolve_format(options.format.as_deref(), destination, input.source)?;

    let mut layers = input.layers.fresh();
    if options.animated {
        layers.animate(
            &format,
            options.animated_delay,
            options.animated_loops.unwrap_or(0),
        )?;
    } else if layers.len() > 1 && options.flattens() {
        layers.merge();
    }

    let compression = compression(&format, options)?;
    let resolution = resolution_tokens(options);

    let mut argv = input.program;
    argv.extend(input.input.iter().cloned());
    argv.extend(input.arguments.iter().cloned());
    argv.extend(layers.tokens());
    if let Some(value) = compression {
        argv.extend(["-quality".to_string(), value.to_string()]);
    }
    argv.extend(resolution);
    argv.extend(["-format".to_string(), format.clone()]);
    argv.push(destination.to_string_lossy().into_owned());

    tracing::debug!(%format, tokens = argv.len(), "save planned");
    Ok(SavePlan {
        argv,
        format,
        destination: destination.to_path_buf(),
        layers,
    })
}

/// Explicit option, then the destination extension, then the source extension.
pub(crate) fn resolve_format(
    explicit: Option<&str>,
    destination: &Path,
    source: Option<&Path>,
) -> MagickResult<String> {
    let extension = |p: &Path| {
        p.extension()
            .map(|e| e.to_string_lossy().into_owned())
            .filter(|e| !e.is_empty())
    };

    explicit
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .or_else(|| extension(destination))
        .or_else(|| source.and_then(extension))
        .map(|f| f.to_ascii_lowercase())
        .ok_or_else(|| {
            MagickError::unsupported(
                UnsupportedKind::Format,
                format!(
                    "cannot determine an output format for '{}'",
                    destination.display()
                ),
            )
        })
}

/// Value for `-quality`; the first applicable option wins.
pub(crate) fn compression(format: &str, options: &SaveOptions) -> MagickResult<Option<u32>> {
    if let Some(quality) = options.quality {
        return Ok(Some(quality));
    }
    if JPEG_FORMATS.contains(&format)
        && let Some(quality) = options.jpeg_quality
    {
        return Ok(Some(quality));
    }
    if format == "png"
        && (options.png_compression_level.is_some() || options.png_compression_filter.is_some())
    {
        let level = png_digit(
            "png_compression_level",
            options.png_compression_level,
            PNG_DEFAULT_LEVEL,
        )?;
        let filter = png_digit(
            "png_compression_filter",
            options.png_compression_filter,
            PNG_DEFAULT_FILTER,
        )?;
        return Ok(Some(level * 10 + filter));
    }
    Ok(None)
}

fn png_digit(name: &str, value: Option<i32>, default: i32) -> MagickResult<u32> {
    let value = value.unwrap_or(default);
    u32::try_from(value)
        .ok()
        .filter(|v| *v <= 9)
        .ok_or_else(|| {
            MagickError::invalid_argument(format!(
                "{name} option should be an integer from 0 to 9, got {value}"
            ))
        })
}

/// `-units/-density/-resample[/-filter]`, only when units, x and y are all set.
pub(crate) fn resolution_tokens(options: &SaveOptions) -> Vec<String> {
    let (Some(units), Some(x), Some(y)) = (
        options.resolution_units,
        options.resolution_x,
        options.resolution_y,
    ) else {
        return Vec::new();
    };

    let density = format!("{x}x{y}");
    let mut tokens = vec![
        "-units".to_string(),
        units.tool_name().to_string(),
        "-density".to_string(),
        density.clone(),
        "-resample".to_string(),
        density,
    ];
    if let Some(filter) = options.resampling_filter.and_then(|f| f.tool_name()) {
        tokens.extend(["-filter".to_string(), filter.to_string()]);
    }
    tokens
}

/// MIME type for the formats `show` can emit.
pub fn mime_type(format: &str) -> MagickResult<&'static str> {
    const MIME_TYPES: [(&str, &str); 6] = [
        ("jpeg", "image/jpeg"),
        ("jpg", "image/jpeg"),
        ("gif", "image/gif"),
        ("png", "image/png"),
        ("wbmp", "image/vnd.wap.wbmp"),
        ("xbm", "image/xbm"),
    ];
    let wanted = format.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(f, _)| *f == wanted)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| {
            let known: Vec<&str> = MIME_TYPES.iter().map(|(f, _)| *f).collect();
            MagickError::unsupported(
                UnsupportedKind::Format,
                format!("{format} (only {} are supported)", known.join(", ")),
            )
        })
}

#[cfg(test)]
#[path = "../../tests/unit/plan/planner.rs"]
mod tests;
