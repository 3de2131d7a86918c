use std::path::Path;

use crate::exec::driver::{Driver, Version};
use crate::exec::executor::{Executor, ToolOutput};
use crate::foundation::core::{Color, Point, Size};
use crate::foundation::error::{MagickError, MagickResult};
use crate::options::mapping::Palette;

/// Read-only queries answered by the external tool.
pub(crate) struct Prober<'a> {
    driver: &'a dyn Driver,
    executor: &'a dyn Executor,
}

impl<'a> Prober<'a> {
    pub(crate) fn new(driver: &'a dyn Driver, executor: &'a dyn Executor) -> Self {
        Self { driver, executor }
    }

    pub(crate) fn version(&self) -> MagickResult<Version> {
        let mut argv = self.driver.convert_argv();
        argv.push("-version".to_string());
        let out = self.run(&argv)?;
        Version::from_banner(&out.stdout_lossy())
    }

    /// Palette of the file at `path`, from its `%[colorspace]`.
    pub(crate) fn palette(&self, path: &Path) -> MagickResult<Palette> {
        let out = self.identify("%[colorspace]\n", path)?;
        Palette::from_colorspace(first_line(&out.stdout_lossy()))
    }

    /// Number of frames stored in the file at `path`.
    pub(crate) fn frame_count(&self, path: &Path) -> MagickResult<usize> {
        let out = self.identify("%n\n", path)?;
        let stdout = out.stdout_lossy();
        let line = first_line(&stdout);
        line.parse::<usize>()
            .map_err(|_| unexpected_output("frame count", line))
    }

    /// Size after applying `source` (input tokens followed by pending arguments).
    pub(crate) fn size(&self, source: &[String]) -> MagickResult<Size> {
        let out = self.info(source, "%wx%h\n")?;
        parse_size_line(first_line(&out.stdout_lossy()))
    }

    pub(crate) fn color_at(&self, source: &[String], at: Point) -> MagickResult<Color> {
        let format = format!("%[hex:p{{{},{}}}]\n", at.x, at.y);
        let out = self.info(source, &format)?;
        parse_tool_hex(first_line(&out.stdout_lossy()))
    }

    /// One color per distinct pixel value, in the order the tool lists them.
    pub(crate) fn histogram(&self, source: &[String]) -> MagickResult<Vec<Color>> {
        let mut argv = self.driver.convert_argv();
        argv.extend(source.iter().cloned());
        argv.extend(["-format", "%c", "histogram:info:-"].map(String::from));
        let out = self.run(&argv)?;
        parse_histogram(&out.stdout_lossy())
    }

    fn identify(&self, format: &str, path: &Path) -> MagickResult<ToolOutput> {
        let mut argv = self.driver.identify_argv();
        argv.extend(["-format".to_string(), format.to_string()]);
        argv.push(path.to_string_lossy().into_owned());
        self.run(&argv)
    }

    fn info(&self, source: &[String], format: &str) -> MagickResult<ToolOutput> {
        let mut argv = self.driver.convert_argv();
        argv.extend(source.iter().cloned());
        argv.extend(["-format".to_string(), format.to_string(), "info:".to_string()]);
        self.run(&argv)
    }

    fn run(&self, argv: &[String]) -> MagickResult<ToolOutput> {
        tracing::debug!(?argv, "probe");
        self.executor.execute(argv)?.into_result()
    }
}

fn first_line(s: &str) -> &str {
    s.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

fn unexpected_output(what: &str, got: &str) -> MagickError {
    MagickError::external_tool("unexpected output", format!("expected {what}, got '{got}'"))
}

pub(crate) fn parse_size_line(line: &str) -> MagickResult<Size> {
    let parsed = line.split_once('x').and_then(|(w, h)| {
        let w = w.trim().parse::<u32>().ok()?;
        let h = h.trim().parse::<u32>().ok()?;
        Some(Size::new(w, h))
    });
    parsed.ok_or_else(|| unexpected_output("WxH", line))
}

/// Parse hex pixels as printed by the tool: 8-bit (`RRGGBB[AA]`) or 16-bit
/// (`RRRRGGGGBBBB[AAAA]`) channels, with or without a leading `#`.
pub(crate) fn parse_tool_hex(s: &str) -> MagickResult<Color> {
    let hex = s.trim().trim_start_matches('#');
    match hex.len() {
        6 | 8 => Color::parse_hex(hex),
        12 | 16 if hex.is_ascii() => {
            let narrowed: String = hex
                .as_bytes()
                .chunks(4)
                .flat_map(|c| c[..2].iter().map(|&b| char::from(b)))
                .collect();
            Color::parse_hex(&narrowed)
        }
        _ => Err(unexpected_output("hex color", s)),
    }
}

pub(crate) fn parse_histogram(output: &str) -> MagickResult<Vec<Color>> {
    output
        .lines()
        .filter_map(|line| {
            let (_, rest) = line.split_once('#')?;
            rest.split_whitespace().next()
        })
        .map(parse_tool_hex)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/exec/probe.rs"]
mod tests;
