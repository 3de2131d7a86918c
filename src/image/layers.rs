use crate::foundation::error::{MagickError, MagickResult, UnsupportedKind};

/// Formats that can be written as multi-frame animations.
const ANIMATED_FORMATS: [&str; 1] = ["gif"];

/// Encoding intent for a multi-frame image, decided at save time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LayerState {
    #[default]
    Single,
    /// Collapse every frame into one.
    Merged,
    /// Keep every frame and encode them as an animation.
    Animating {
        format: String,
        /// Frame delay in milliseconds; `None` keeps the tool default.
        delay: Option<u32>,
        /// Loop count, 0 loops forever.
        loops: u32,
    },
}

/// Frame sequence bookkeeping for one image.
///
/// `frames` counts the frames the argument list reads in. The state is only changed by the
/// save planner; leaving [`LayerState::Single`] lasts for one save cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layers {
    frames: usize,
    state: LayerState,
}

impl Layers {
    pub(crate) fn new(frames: usize) -> Self {
        Self {
            frames: frames.max(1),
            state: LayerState::Single,
        }
    }

    /// Number of layers the image will have once the current state is applied.
    pub fn len(&self) -> usize {
        match self.state {
            LayerState::Merged => 1,
            _ => self.frames,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> &LayerState {
        &self.state
    }

    /// Same frames, back in [`LayerState::Single`].
    pub(crate) fn fresh(&self) -> Self {
        Self::new(self.frames)
    }

    /// Frames the tool reads, whatever the pending state.
    pub(crate) fn frames(&self) -> usize {
        self.frames
    }

    pub(crate) fn added(&mut self) {
        self.frames += 1;
    }

    pub(crate) fn check_removable(&self, index: usize) -> MagickResult<()> {
        if index >= self.frames {
            return Err(MagickError::out_of_range(format!(
                "layer {index} does not exist ({} layers)",
                self.frames
            )));
        }
        if self.frames == 1 {
            return Err(MagickError::precondition("cannot remove the only layer"));
        }
        Ok(())
    }

    pub(crate) fn removed(&mut self) {
        self.frames = self.frames.saturating_sub(1).max(1);
    }

    /// Collapse to a single frame. Idempotent.
    pub(crate) fn merge(&mut self) {
        self.state = LayerState::Merged;
    }

    /// Record animation intent; a later call replaces an earlier one.
    pub(crate) fn animate(
        &mut self,
        format: &str,
        delay: Option<u32>,
        loops: u32,
    ) -> MagickResult<()> {
        let format = format.to_ascii_lowercase();
        if !ANIMATED_FORMATS.contains(&format.as_str()) {
            return Err(MagickError::unsupported(
                UnsupportedKind::Format,
                format!("{format} (animation is only supported for gif)"),
            ));
        }
        self.state = LayerState::Animating {
            format,
            delay,
            loops,
        };
        Ok(())
    }

    /// Tokens realizing the current state.
    pub(crate) fn tokens(&self) -> Vec<String> {
        match &self.state {
            LayerState::Single => Vec::new(),
            LayerState::Merged => vec!["-flatten".to_string()],
            LayerState::Animating { delay, loops, .. } => {
                let mut tokens = Vec::with_capacity(4);
                if let Some(delay) = delay {
                    // The tool counts delays in 1/100 s ticks.
                    tokens.extend(["-delay".to_string(), (delay / 10).to_string()]);
                }
                tokens.extend(["-loop".to_string(), loops.to_string()]);
                tokens
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/layers.rs"]
mod tests;
