use std::sync::Arc;

use super::*;
use crate::exec::temp::TempStore;

#[test]
fn push_keeps_flag_and_values_together_in_order() {
    let mut args = Arguments::new();
    args.push_flag("-flop");
    args.push("-crop", ["10x10+0+0"]);
    args.push("-density", vec!["300x300".to_string()]);
    assert_eq!(
        args.tokens(),
        ["-flop", "-crop", "10x10+0+0", "-density", "300x300"]
    );
}

#[test]
fn pushes_never_deduplicate() {
    let mut args = Arguments::new();
    args.push_flag("-flip");
    args.push_flag("-flip");
    assert_eq!(args.tokens(), ["-flip", "-flip"]);
}

#[test]
fn clones_are_isolated() {
    let mut original = Arguments::new();
    original.push_flag("-strip");

    let mut branch = original.clone();
    branch.push_flag("-flip");
    original.push_flag("-flop");

    assert_eq!(original.tokens(), ["-strip", "-flop"]);
    assert_eq!(branch.tokens(), ["-strip", "-flip"]);
}

#[test]
fn clones_share_attached_files_until_both_drop() {
    let file = TempStore::default().write("ip", b"x").unwrap();
    let path = file.to_path_buf();

    let mut args = Arguments::new();
    args.push("-profile", [path.to_string_lossy().into_owned()]);
    args.attach(Arc::clone(&file));
    drop(file);

    let branch = args.clone();
    drop(args);
    assert!(path.exists());
    drop(branch);
    assert!(!path.exists());
}

#[test]
fn groups_wrap_tokens_in_parentheses() {
    let mut args = Arguments::new();
    args.push_group(vec!["other.png".to_string(), "-flip".to_string()], &[]);
    assert_eq!(args.tokens(), ["(", "other.png", "-flip", ")"]);
}
