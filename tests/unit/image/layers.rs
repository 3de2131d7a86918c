use super::*;

#[test]
fn starts_single_with_at_least_one_frame() {
    let layers = Layers::new(0);
    assert_eq!(layers.len(), 1);
    assert_eq!(layers.state(), &LayerState::Single);
    assert!(layers.tokens().is_empty());
}

#[test]
fn merge_is_idempotent_and_collapses() {
    let mut layers = Layers::new(3);
    layers.merge();
    layers.merge();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers.frames(), 3);
    assert_eq!(layers.tokens(), ["-flatten"]);
}

#[test]
fn animate_last_call_wins() {
    let mut layers = Layers::new(3);
    layers.animate("gif", Some(500), 2).unwrap();
    layers.animate("GIF", Some(100), 0).unwrap();
    assert_eq!(
        layers.state(),
        &LayerState::Animating {
            format: "gif".to_string(),
            delay: Some(100),
            loops: 0,
        }
    );
    assert_eq!(layers.len(), 3);
    assert_eq!(layers.tokens(), ["-delay", "10", "-loop", "0"]);
}

#[test]
fn animate_without_delay_keeps_tool_default() {
    let mut layers = Layers::new(2);
    layers.animate("gif", None, 5).unwrap();
    assert_eq!(layers.tokens(), ["-loop", "5"]);
}

#[test]
fn animate_rejects_non_gif() {
    let mut layers = Layers::new(2);
    assert!(matches!(
        layers.animate("png", None, 0),
        Err(MagickError::Unsupported {
            kind: UnsupportedKind::Format,
            ..
        })
    ));
    assert_eq!(layers.state(), &LayerState::Single);
}

#[test]
fn fresh_resets_state_but_keeps_frames() {
    let mut layers = Layers::new(4);
    layers.merge();
    let fresh = layers.fresh();
    assert_eq!(fresh.state(), &LayerState::Single);
    assert_eq!(fresh.len(), 4);
}

#[test]
fn removal_checks_bounds() {
    let mut layers = Layers::new(2);
    assert!(matches!(
        layers.check_removable(2),
        Err(MagickError::OutOfRange(_))
    ));
    layers.check_removable(1).unwrap();
    layers.removed();
    assert!(matches!(
        layers.check_removable(0),
        Err(MagickError::Precondition(_))
    ));
}
