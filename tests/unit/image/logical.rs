use super::*;
use crate::exec::driver::ToolSettings;
use crate::exec::executor::{RecordingExecutor, ToolOutput};
use crate::image::layers::LayerState;

fn strings(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn is_query(argv: &[String]) -> bool {
    argv.last().is_some_and(|a| a == "info:" || a == "histogram:info:-")
}

/// Answers size queries with `100x50` and succeeds on everything else.
fn sized_executor() -> Arc<RecordingExecutor> {
    Arc::new(RecordingExecutor::new(|argv| {
        if is_query(argv) {
            Ok(ToolOutput::ok("100x50\n"))
        } else {
            Ok(ToolOutput::ok(Vec::new()))
        }
    }))
}

fn context(executor: &Arc<RecordingExecutor>) -> Arc<ToolContext> {
    let settings = ToolSettings::default().with_version_check(false);
    Arc::new(ToolContext::new(&settings, executor.clone()).unwrap())
}

fn opened(ctx: &Arc<ToolContext>, frames: usize) -> LogicalImage {
    LogicalImage::new(
        Arc::clone(ctx),
        strings(&["in.png"]),
        Some(PathBuf::from("in.png")),
        Palette::Rgb,
        frames,
        MetadataBag::new(),
    )
}

fn canvas(ctx: &Arc<ToolContext>, size: Size) -> LogicalImage {
    LogicalImage::new(
        Arc::clone(ctx),
        strings(&["-size", size.to_string().as_str(), "xc:#000000"]),
        None,
        Palette::Rgb,
        1,
        MetadataBag::new(),
    )
    .with_size(size)
}

#[test]
fn edits_concatenate_in_call_order() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.flip_horizontally().strip().flip_vertically();
    assert_eq!(img.arguments(), ["-flop", "-strip", "-flip"]);
    assert_eq!(exec.call_count(), 0);
}

#[test]
fn copies_branch_independently() {
    let exec = sized_executor();
    let mut a = opened(&context(&exec), 1);
    a.flip_horizontally();
    let mut b = a.copy();
    b.strip();
    a.flip_vertically();

    assert_eq!(a.arguments(), ["-flop", "-flip"]);
    assert_eq!(b.arguments(), ["-flop", "-strip"]);
}

#[test]
fn copies_do_not_share_metadata() {
    let exec = sized_executor();
    let mut a = opened(&context(&exec), 1);
    a.metadata_mut().insert("author", "a");
    let mut b = a.clone();
    b.metadata_mut().insert("author", "b");
    assert_eq!(a.metadata().get("author"), Some("a"));
    assert_eq!(b.metadata().get("author"), Some("b"));
}

#[test]
fn crop_outside_bounds_leaves_arguments_unchanged() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.strip();

    for (start, size) in [
        (Point::new(90, 0), Size::new(20, 10)),
        (Point::new(100, 0), Size::new(1, 1)),
        (Point::new(0, 50), Size::new(1, 1)),
        (Point::new(0, 0), Size::new(0, 10)),
    ] {
        let err = img.crop(start, size).unwrap_err();
        assert!(matches!(err, MagickError::OutOfRange(_)), "{err}");
        assert_eq!(img.arguments(), ["-strip"]);
    }
    // The size was queried once and cached.
    assert_eq!(exec.call_count(), 1);
}

#[test]
fn crop_appends_geometry_and_forgets_size() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.crop(Point::new(10, 10), Size::new(90, 40)).unwrap();
    assert_eq!(img.arguments(), ["-crop", "90x40+10+10"]);

    img.size().unwrap();
    assert_eq!(exec.call_count(), 2);
    assert_eq!(
        exec.last_call().unwrap(),
        strings(&[
            "convert",
            "in.png",
            "-crop",
            "90x40+10+10",
            "-format",
            "%wx%h\n",
            "info:"
        ])
    );
}

#[test]
fn resize_sets_size_without_probing() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.resize(Size::new(40, 20), Filter::Lanczos).unwrap();
    assert_eq!(img.arguments(), ["-resize", "40x20", "-filter", "Lanczos"]);
    assert_eq!(img.size().unwrap(), Size::new(40, 20));
    assert_eq!(exec.call_count(), 0);

    img.resize(Size::new(10, 10), Filter::Undefined).unwrap();
    assert_eq!(img.arguments().len(), 6);

    assert!(matches!(
        img.resize(Size::new(0, 10), Filter::Undefined),
        Err(MagickError::InvalidArgument(_))
    ));
}

#[test]
fn rotate_emits_background_first() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.rotate(90.0, Some(Color::WHITE))
        .unwrap()
        .rotate(-45.5, None)
        .unwrap();
    assert_eq!(
        img.arguments(),
        ["-background", "#ffffff", "-rotate", "90", "-rotate", "-45.5"]
    );
}

#[test]
fn rotate_rejects_non_finite_angles() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    for angle in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(
            img.rotate(angle, Some(Color::WHITE)),
            Err(MagickError::InvalidArgument(_))
        ));
    }
    assert!(img.arguments().is_empty());
}

#[test]
fn interlace_uses_tool_names() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.interlace(Interlace::Plane);
    assert_eq!(img.arguments(), ["-interlace", "plane"]);
}

#[test]
fn palette_change_is_a_no_op_when_equal() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.use_palette(Palette::Rgb);
    assert!(img.arguments().is_empty());

    img.use_palette(Palette::Grayscale);
    assert_eq!(
        img.arguments(),
        ["-type", "GrayscaleMatte", "-colorspace", "Gray"]
    );
    assert_eq!(img.palette(), Palette::Grayscale);
}

#[test]
fn profile_goes_through_a_scoped_temp_file() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.profile(&Profile::new("srgb", b"icc bytes".to_vec()))
        .unwrap();

    assert_eq!(img.arguments()[0], "-profile");
    let path = PathBuf::from(&img.arguments()[1]);
    assert_eq!(std::fs::read(&path).unwrap(), b"icc bytes");

    let copy = img.copy();
    drop(img);
    assert!(path.exists());
    drop(copy);
    assert!(!path.exists());
}

#[test]
fn paste_composites_a_group() {
    let exec = sized_executor();
    let ctx = context(&exec);
    let mut img = opened(&ctx, 1);
    let stamp = canvas(&ctx, Size::new(10, 10));

    img.paste(&stamp, Point::new(5, 5), 100).unwrap();
    assert_eq!(
        img.arguments(),
        [
            "(",
            "-size",
            "10x10",
            "xc:#000000",
            ")",
            "-geometry",
            "+5+5",
            "-compose",
            "Over",
            "-composite"
        ]
    );
}

#[test]
fn paste_with_partial_alpha_dissolves() {
    let exec = sized_executor();
    let ctx = context(&exec);
    let mut img = opened(&ctx, 1);
    let stamp = canvas(&ctx, Size::new(10, 10));

    img.paste(&stamp, Point::new(0, 0), 40).unwrap();
    let args = img.arguments();
    assert_eq!(
        &args[args.len() - 5..],
        ["-compose", "Dissolve", "-define", "compose:args=40", "-composite"]
    );
}

#[test]
fn paste_validates_alpha_and_bounds() {
    let exec = sized_executor();
    let ctx = context(&exec);
    let mut img = opened(&ctx, 1);
    let stamp = canvas(&ctx, Size::new(10, 10));

    assert!(matches!(
        img.paste(&stamp, Point::new(0, 0), 101),
        Err(MagickError::InvalidArgument(_))
    ));
    assert!(matches!(
        img.paste(&stamp, Point::new(95, 0), 100),
        Err(MagickError::OutOfRange(_))
    ));
    assert!(img.arguments().is_empty());
}

#[test]
fn mask_is_a_desaturated_copy() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.strip();
    let mask = img.mask();
    assert_eq!(
        mask.arguments(),
        ["-strip", "-modulate", "100,0,100", "-alpha", "off"]
    );
    assert_eq!(img.arguments(), ["-strip"]);
}

#[test]
fn apply_mask_requires_matching_sizes() {
    let exec = sized_executor();
    let ctx = context(&exec);
    let mut img = opened(&ctx, 1);

    let small = canvas(&ctx, Size::new(10, 10));
    assert!(matches!(
        img.apply_mask(&small),
        Err(MagickError::InvalidArgument(_))
    ));
    assert!(img.arguments().is_empty());

    let mask = canvas(&ctx, Size::new(100, 50));
    img.apply_mask(&mask).unwrap();
    let args = img.arguments();
    assert_eq!(args[0], "(");
    assert_eq!(
        &args[args.len() - 5..],
        ["-alpha", "off", "-compose", "CopyOpacity", "-composite"]
    );
}

#[test]
fn fill_covers_the_current_size() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.fill(&Fill::Solid(Color::rgb(255, 0, 0))).unwrap();
    assert_eq!(
        img.arguments(),
        [
            "(",
            "-size",
            "100x50",
            "xc:#ff0000",
            ")",
            "-compose",
            "Over",
            "-composite"
        ]
    );
}

#[test]
fn effects_append_to_the_same_sequence() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.strip();
    img.effects().negative().sharpen();
    assert_eq!(img.arguments(), ["-strip", "-negate", "-sharpen", "2x1"]);
}

#[test]
fn layers_can_be_added_and_removed() {
    let exec = sized_executor();
    let ctx = context(&exec);
    let mut img = opened(&ctx, 1);
    assert!(matches!(
        img.remove_layer(0),
        Err(MagickError::Precondition(_))
    ));

    let mut other = opened(&ctx, 2);
    other.strip();
    img.add_layer(&other);
    assert_eq!(img.layers().len(), 3);
    assert_eq!(img.arguments(), ["(", "in.png", "-strip", ")"]);

    assert!(matches!(
        img.remove_layer(3),
        Err(MagickError::OutOfRange(_))
    ));
    img.remove_layer(1).unwrap().coalesce_layers();
    assert_eq!(img.layers().len(), 2);
    assert_eq!(
        &img.arguments()[4..],
        ["-delete", "1", "-coalesce"]
    );
}

#[test]
fn removing_the_first_layer_forgets_the_cached_size() {
    let exec = Arc::new(RecordingExecutor::new(|argv| {
        if is_query(argv) {
            Ok(ToolOutput::ok("10x10\n"))
        } else {
            Ok(ToolOutput::ok(Vec::new()))
        }
    }));
    let ctx = context(&exec);
    let mut img = canvas(&ctx, Size::new(100, 50));
    img.add_layer(&canvas(&ctx, Size::new(10, 10)));
    img.remove_layer(0).unwrap();

    assert_eq!(img.size().unwrap(), Size::new(10, 10));
    assert_eq!(exec.call_count(), 1);
    assert!(matches!(
        img.crop(Point::new(50, 20), Size::new(40, 20)),
        Err(MagickError::OutOfRange(_))
    ));
    assert_eq!(&img.arguments()[img.arguments().len() - 2..], ["-delete", "0"]);
}

#[test]
fn coalesce_forgets_the_cached_size() {
    let exec = sized_executor();
    let mut img = canvas(&context(&exec), Size::new(10, 10));
    img.coalesce_layers();

    assert_eq!(img.size().unwrap(), Size::new(100, 50));
    assert_eq!(exec.call_count(), 1);
    assert_eq!(exec.last_call().unwrap()[4], "-coalesce");
}

#[test]
fn adding_a_saved_image_counts_every_frame() {
    let exec = sized_executor();
    let ctx = context(&exec);
    let mut saved = opened(&ctx, 3);
    saved
        .save(Some(Path::new("out.png")), &SaveOptions::default())
        .unwrap();
    assert_eq!(saved.layers().state(), &LayerState::Merged);

    let mut img = opened(&ctx, 1);
    img.add_layer(&saved);
    assert_eq!(img.layers().len(), 4);
    img.remove_layer(3).unwrap();
    assert_eq!(img.layers().len(), 3);
    assert_eq!(img.arguments(), ["(", "in.png", ")", "-delete", "3"]);
}

#[test]
fn plan_does_not_execute() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 1);
    img.strip();
    let plan = img.plan(None, &SaveOptions::default()).unwrap();
    assert_eq!(
        plan.argv(),
        ["convert", "in.png", "-strip", "-format", "png", "in.png"]
    );
    assert_eq!(exec.call_count(), 0);
}

#[test]
fn save_path_can_only_be_omitted_for_opened_images() {
    let exec = sized_executor();
    let mut img = canvas(&context(&exec), Size::new(4, 4));
    assert!(matches!(
        img.save(None, &SaveOptions::default()),
        Err(MagickError::Precondition(_))
    ));
    assert_eq!(exec.call_count(), 0);
}

#[test]
fn save_merges_layers_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested").join("out.gif");
    let dest_arg = dest.to_string_lossy().into_owned();
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 3);

    img.save(Some(&dest), &SaveOptions::default()).unwrap();
    assert_eq!(img.layers().state(), &LayerState::Merged);
    assert!(dest.parent().unwrap().is_dir());
    assert_eq!(
        exec.last_call().unwrap(),
        strings(&[
            "convert",
            "in.png",
            "-flatten",
            "-format",
            "gif",
            dest_arg.as_str()
        ])
    );

    // A copy starts over from a single-state layer set.
    assert_eq!(img.copy().layers().state(), &LayerState::Single);
}

#[test]
fn failed_save_keeps_layer_state() {
    let exec = Arc::new(RecordingExecutor::new(|_| {
        Ok(ToolOutput::failed(1, "convert: no encode delegate"))
    }));
    let mut img = opened(&context(&exec), 3);

    let err = img
        .save(Some(Path::new("out.gif")), &SaveOptions::default())
        .unwrap_err();
    match err {
        MagickError::ExternalTool { stderr, .. } => assert!(stderr.contains("delegate")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(img.layers().state(), &LayerState::Single);
}

#[test]
fn animated_save_writes_delay_and_loops() {
    let exec = sized_executor();
    let mut img = opened(&context(&exec), 2);
    let opts = SaveOptions::new().animated(Some(100), Some(2));

    img.save(Some(Path::new("anim.gif")), &opts).unwrap();
    assert_eq!(
        exec.last_call().unwrap(),
        strings(&[
            "convert", "in.png", "-delay", "10", "-loop", "2", "-format", "gif", "anim.gif"
        ])
    );
    assert!(matches!(
        img.layers().state(),
        LayerState::Animating { loops: 2, .. }
    ));
}

#[test]
fn get_reads_back_and_removes_the_temp_file() {
    let exec = Arc::new(RecordingExecutor::new(|argv| {
        if let Some(dest) = argv.last() {
            std::fs::write(dest, b"GIF89a").unwrap();
        }
        Ok(ToolOutput::ok(Vec::new()))
    }));
    let mut img = opened(&context(&exec), 1);

    let bytes = img.get("GIF", &SaveOptions::default()).unwrap();
    assert_eq!(bytes, b"GIF89a");

    let argv = exec.last_call().unwrap();
    let dest = PathBuf::from(argv.last().unwrap());
    assert_eq!(argv[argv.len() - 3..argv.len() - 1], ["-format", "gif"]);
    assert_eq!(dest.extension().unwrap(), "gif");
    assert!(!dest.exists());
}

#[test]
fn show_writes_bytes_and_reports_mime() {
    let exec = Arc::new(RecordingExecutor::new(|argv| {
        if let Some(dest) = argv.last() {
            std::fs::write(dest, b"\x89PNG").unwrap();
        }
        Ok(ToolOutput::ok(Vec::new()))
    }));
    let mut img = opened(&context(&exec), 1);

    let mut out = Vec::new();
    let mime = img.show("png", &SaveOptions::default(), &mut out).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(out, b"\x89PNG");

    assert!(img.show("tiff", &SaveOptions::default(), &mut out).is_err());
    assert_eq!(exec.call_count(), 1);
}

#[test]
fn color_at_checks_bounds_then_queries() {
    let exec = Arc::new(RecordingExecutor::new(|argv| {
        let format = &argv[argv.len() - 2];
        if format.starts_with("%[hex:") {
            Ok(ToolOutput::ok("FF000080\n"))
        } else {
            Ok(ToolOutput::ok("100x50\n"))
        }
    }));
    let mut img = opened(&context(&exec), 1);

    assert!(matches!(
        img.color_at(Point::new(100, 0)),
        Err(MagickError::OutOfRange(_))
    ));
    assert_eq!(
        img.color_at(Point::new(3, 4)).unwrap(),
        Color::rgba(255, 0, 0, 128)
    );
    assert_eq!(exec.last_call().unwrap()[3], "%[hex:p{3,4}]\n");
}
