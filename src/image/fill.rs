use crate::foundation::core::{Color, Size};

/// Content composited over the whole image by `LogicalImage::fill`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    Solid(Color),
    /// Left-to-right gradient.
    Horizontal { start: Color, end: Color },
    /// Top-to-bottom gradient.
    Vertical { start: Color, end: Color },
    /// Center-to-edge gradient.
    Radial { inner: Color, outer: Color },
}

impl Fill {
    /// Tokens creating a `size` canvas holding this fill.
    pub(crate) fn canvas_tokens(&self, size: Size) -> Vec<String> {
        let mut tokens = vec!["-size".to_string(), size.to_string()];
        match self {
            Self::Solid(color) => tokens.push(format!("xc:{color}")),
            Self::Horizontal { start, end } => tokens.extend([
                "-define".to_string(),
                "gradient:direction=East".to_string(),
                format!("gradient:{start}-{end}"),
            ]),
            Self::Vertical { start, end } => tokens.push(format!("gradient:{start}-{end}")),
            Self::Radial { inner, outer } => {
                tokens.push(format!("radial-gradient:{inner}-{outer}"));
            }
        }
        tokens
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/fill.rs"]
mod tests;
