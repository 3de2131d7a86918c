use crate::options::mapping::{Filter, ResolutionUnit};

/// Save-time options, consumed once per save call.
///
/// Keys mirror the option names accepted in JSON (`animated.delay`, `png_compression_level`,
/// ...). Unset fields mean "not given"; which ones take effect for a given format is decided by
/// the save planner.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaveOptions {
    /// Explicit output format; wins over the destination extension.
    pub format: Option<String>,
    pub quality: Option<u32>,
    pub jpeg_quality: Option<u32>,
    /// PNG zlib level, 0..=9.
    pub png_compression_level: Option<i32>,
    /// PNG filter type, 0..=9.
    pub png_compression_filter: Option<i32>,
    #[serde(alias = "resolution-units")]
    pub resolution_units: Option<ResolutionUnit>,
    #[serde(alias = "resolution-x")]
    pub resolution_x: Option<u32>,
    #[serde(alias = "resolution-y")]
    pub resolution_y: Option<u32>,
    #[serde(alias = "resampling-filter")]
    pub resampling_filter: Option<Filter>,
    pub animated: bool,
    /// Frame delay in milliseconds.
    #[serde(rename = "animated.delay")]
    pub animated_delay: Option<u32>,
    /// Loop count, 0 loops forever.
    #[serde(rename = "animated.loops")]
    pub animated_loops: Option<u32>,
    /// Merge multi-layer images before saving. Unset means `true`.
    pub flatten: Option<bool>,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn quality(mut self, quality: u32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn jpeg_quality(mut self, quality: u32) -> Self {
        self.jpeg_quality = Some(quality);
        self
    }

    pub fn png_compression_level(mut self, level: i32) -> Self {
        self.png_compression_level = Some(level);
        self
    }

    pub fn png_compression_filter(mut self, filter: i32) -> Self {
        self.png_compression_filter = Some(filter);
        self
    }

    pub fn resolution(mut self, units: ResolutionUnit, x: u32, y: u32) -> Self {
        self.resolution_units = Some(units);
        self.resolution_x = Some(x);
        self.resolution_y = Some(y);
        self
    }

    pub fn resampling_filter(mut self, filter: Filter) -> Self {
        self.resampling_filter = Some(filter);
        self
    }

    pub fn animated(mut self, delay_ms: Option<u32>, loops: Option<u32>) -> Self {
        self.animated = true;
        self.animated_delay = delay_ms;
        self.animated_loops = loops;
        self
    }

    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = Some(flatten);
        self
    }

    /// `false` only when `flatten` was explicitly disabled.
    pub fn flattens(&self) -> bool {
        self.flatten != Some(false)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/options/save.rs"]
mod tests;
