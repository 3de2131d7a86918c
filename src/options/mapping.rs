//! Fixed vocabularies translating typed options into ImageMagick command-line names.
//!
//! Each table is a plain `const` array; lookups by key never fail for the typed enums, and
//! parsing a name back (`FromStr`) fails with [`UnsupportedKind::Option`] (or the more specific
//! kind noted on the type) carrying the offending value.

use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{MagickError, MagickResult, UnsupportedKind};

/// Resampling filter used by `resize` and by save-time resampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Let the tool pick; no `-filter` flag is emitted.
    #[default]
    Undefined,
    Bessel,
    Blackman,
    Box,
    Catrom,
    Cubic,
    Gaussian,
    Hanning,
    Hamming,
    Hermite,
    Lanczos,
    Mitchell,
    Point,
    Quadratic,
    Sinc,
    Triangle,
}

/// `(filter, option key, tool name)`; an empty tool name means "omit the flag".
const FILTERS: [(Filter, &str, &str); 16] = [
    (Filter::Undefined, "undefined", ""),
    (Filter::Bessel, "bessel", "Kaiser"),
    (Filter::Blackman, "blackman", "Blackman"),
    (Filter::Box, "box", "Box"),
    (Filter::Catrom, "catrom", "Catrom"),
    (Filter::Cubic, "cubic", "Cubic"),
    (Filter::Gaussian, "gaussian", "Gaussian"),
    (Filter::Hanning, "hanning", "Hanning"),
    (Filter::Hamming, "hamming", "Hamming"),
    (Filter::Hermite, "hermite", "Hermite"),
    (Filter::Lanczos, "lanczos", "Lanczos"),
    (Filter::Mitchell, "mitchell", "Mitchell"),
    (Filter::Point, "point", "Point"),
    (Filter::Quadratic, "quadratic", "Quadratic"),
    (Filter::Sinc, "sinc", "Sinc"),
    (Filter::Triangle, "triangle", "Triangle"),
];

impl Filter {
    /// Name understood by `-filter`, or `None` for [`Filter::Undefined`].
    pub fn tool_name(self) -> Option<&'static str> {
        FILTERS
            .iter()
            .find(|(f, _, _)| *f == self)
            .map(|(_, _, name)| *name)
            .filter(|name| !name.is_empty())
    }

    pub fn key(self) -> &'static str {
        FILTERS
            .iter()
            .find(|(f, _, _)| *f == self)
            .map_or("undefined", |(_, key, _)| *key)
    }
}

/// Interlace scheme passed to `-interlace`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Interlace {
    None,
    Line,
    Plane,
    Partition,
}

const INTERLACE: [(Interlace, &str); 4] = [
    (Interlace::None, "none"),
    (Interlace::Line, "line"),
    (Interlace::Plane, "plane"),
    (Interlace::Partition, "partition"),
];

impl Interlace {
    pub fn tool_name(self) -> &'static str {
        INTERLACE
            .iter()
            .find(|(s, _)| *s == self)
            .map_or("none", |(_, name)| *name)
    }
}

/// Unit of `resolution_x`/`resolution_y` in save options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolutionUnit {
    PixelsPerCentimeter,
    PixelsPerInch,
}

/// `(unit, option key, tool name)`.
const UNITS: [(ResolutionUnit, &str, &str); 2] = [
    (
        ResolutionUnit::PixelsPerCentimeter,
        "ppc",
        "PixelsPerCentimeter",
    ),
    (ResolutionUnit::PixelsPerInch, "ppi", "PixelsPerInch"),
];

impl ResolutionUnit {
    pub fn tool_name(self) -> &'static str {
        UNITS
            .iter()
            .find(|(u, _, _)| *u == self)
            .map_or("PixelsPerInch", |(_, _, name)| *name)
    }
}

/// Color model of an image. Parsing an unknown name fails with [`UnsupportedKind::Palette`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Palette {
    #[default]
    Rgb,
    Cmyk,
    Grayscale,
}

/// `(palette, option key, -colorspace name, -type name)`. The matte types keep the alpha channel.
const PALETTES: [(Palette, &str, &str, &str); 3] = [
    (Palette::Rgb, "rgb", "sRGB", "TrueColorMatte"),
    (Palette::Cmyk, "cmyk", "CMYK", "TrueColorMatte"),
    (Palette::Grayscale, "gray", "Gray", "GrayscaleMatte"),
];

impl Palette {
    pub fn name(self) -> &'static str {
        self.row().1
    }

    /// Name understood by `-colorspace`.
    pub fn colorspace(self) -> &'static str {
        self.row().2
    }

    /// Name understood by `-type`.
    pub fn matte_type(self) -> &'static str {
        self.row().3
    }

    /// Map the `%[colorspace]` answer of `identify` onto a palette.
    pub fn from_colorspace(colorspace: &str) -> MagickResult<Self> {
        match colorspace.trim() {
            "RGB" | "sRGB" => Ok(Self::Rgb),
            "CMYK" => Ok(Self::Cmyk),
            "Gray" => Ok(Self::Grayscale),
            other => Err(MagickError::unsupported(UnsupportedKind::Colorspace, other)),
        }
    }

    fn row(self) -> (Palette, &'static str, &'static str, &'static str) {
        PALETTES
            .iter()
            .copied()
            .find(|(p, _, _, _)| *p == self)
            .unwrap_or(PALETTES[0])
    }
}

fn lookup<T: Copy>(
    rows: impl IntoIterator<Item = (T, &'static str)>,
    kind: UnsupportedKind,
    s: &str,
) -> MagickResult<T> {
    let wanted = s.trim().to_ascii_lowercase();
    rows.into_iter()
        .find(|(_, key)| *key == wanted)
        .map(|(v, _)| v)
        .ok_or_else(|| MagickError::unsupported(kind, s))
}

impl FromStr for Filter {
    type Err = MagickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(
            FILTERS.iter().map(|(f, key, _)| (*f, *key)),
            UnsupportedKind::Option,
            s,
        )
    }
}

impl FromStr for Interlace {
    type Err = MagickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(INTERLACE.iter().copied(), UnsupportedKind::Option, s)
    }
}

impl FromStr for ResolutionUnit {
    type Err = MagickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let aliases = [
            (ResolutionUnit::PixelsPerCentimeter, "pixelspercentimeter"),
            (ResolutionUnit::PixelsPerInch, "pixelsperinch"),
        ];
        lookup(
            UNITS
                .iter()
                .map(|(u, key, _)| (*u, *key))
                .chain(aliases),
            UnsupportedKind::Unit,
            s,
        )
    }
}

impl FromStr for Palette {
    type Err = MagickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let aliases = [(Palette::Grayscale, "grayscale")];
        lookup(
            PALETTES
                .iter()
                .map(|(p, key, _, _)| (*p, *key))
                .chain(aliases),
            UnsupportedKind::Palette,
            s,
        )
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! serde_via_str {
    ($($ty:ty),* $(,)?) => {$(
        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
                let s = String::deserialize(de)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    )*};
}

serde_via_str!(Filter, Interlace, ResolutionUnit, Palette);

#[cfg(test)]
#[path = "../../tests/unit/options/mapping.rs"]
mod tests;
