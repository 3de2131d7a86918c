use crate::foundation::core::Color;
use crate::foundation::error::{MagickError, MagickResult};
use crate::image::arguments::Arguments;

/// Convolution kernel, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl Kernel {
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> MagickResult<Self> {
        if width == 0 || height == 0 || values.len() != width * height {
            return Err(MagickError::invalid_argument(format!(
                "kernel of {width}x{height} needs {} values, got {}",
                width * height,
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// Color and filter effects appended to an image's arguments.
pub struct Effects<'a> {
    arguments: &'a mut Arguments,
}

impl<'a> Effects<'a> {
    pub(crate) fn new(arguments: &'a mut Arguments) -> Self {
        Self { arguments }
    }

    pub fn gamma(&mut self, correction: f64) -> MagickResult<&mut Self> {
        if !(correction.is_finite() && correction > 0.0) {
            return Err(MagickError::invalid_argument(format!(
                "gamma correction must be positive, got {correction}"
            )));
        }
        self.arguments.push("-gamma", [correction.to_string()]);
        Ok(self)
    }

    pub fn negative(&mut self) -> &mut Self {
        self.arguments.push_flag("-negate");
        self
    }

    pub fn grayscale(&mut self) -> &mut Self {
        self.arguments.push("-colorspace", ["Gray"]);
        self
    }

    /// Tint every pixel fully towards `color`.
    pub fn colorize(&mut self, color: Color) -> &mut Self {
        self.arguments.push("-fill", [color.to_string()]);
        self.arguments.push("-colorize", ["100"]);
        self
    }

    pub fn sharpen(&mut self) -> &mut Self {
        self.arguments.push("-sharpen", ["2x1"]);
        self
    }

    pub fn blur(&mut self, sigma: f64) -> MagickResult<&mut Self> {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(MagickError::invalid_argument(format!(
                "blur sigma must be non-negative, got {sigma}"
            )));
        }
        self.arguments.push("-gaussian-blur", [format!("0x{sigma}")]);
        Ok(self)
    }

    /// Shift brightness by `brightness` percent, -100..=100.
    pub fn brightness(&mut self, brightness: f64) -> MagickResult<&mut Self> {
        let rounded = brightness.round();
        if !(-100.0..=100.0).contains(&rounded) {
            return Err(MagickError::invalid_argument(format!(
                "brightness can range from -100 to 100, got {rounded}"
            )));
        }
        self.arguments
            .push("-brightness-contrast", [format!("{}x0", rounded as i32)]);
        Ok(self)
    }

    pub fn convolve(&mut self, kernel: &Kernel) -> MagickResult<&mut Self> {
        if kernel.width != 3 || kernel.height != 3 {
            return Err(MagickError::invalid_argument(format!(
                "a convolution matrix must be 3x3 ({}x{} provided)",
                kernel.width, kernel.height
            )));
        }
        let values: Vec<String> = kernel.values.iter().map(f64::to_string).collect();
        self.arguments.push("-convolve", [values.join(",")]);
        Ok(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/effects.rs"]
mod tests;
