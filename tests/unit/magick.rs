use std::io::Cursor;

use super::*;
use crate::exec::driver::Toolchain;
use crate::exec::executor::{RecordingExecutor, ToolOutput};
use crate::foundation::error::UnsupportedKind;

const BANNER: &str = "Version: ImageMagick 6.9.11-60 Q16 x86_64 2021-01-25 https://imagemagick.org\n";

fn scripted(banner: &'static str, colorspace: &'static str) -> Arc<RecordingExecutor> {
    Arc::new(RecordingExecutor::new(move |argv| {
        let out = if argv.iter().any(|a| a == "-version") {
            banner
        } else if argv.iter().any(|a| a == "%[colorspace]\n") {
            colorspace
        } else if argv.iter().any(|a| a == "%n\n") {
            "3\n"
        } else {
            ""
        };
        Ok(ToolOutput::ok(out))
    }))
}

fn unchecked() -> ToolSettings {
    ToolSettings::default().with_version_check(false)
}

#[test]
fn version_is_checked_at_construction() {
    let exec = scripted(BANNER, "sRGB\n");
    let magick = Magick::with_executor(&ToolSettings::default(), exec.clone()).unwrap();
    assert_eq!(magick.driver_name(), "imagemagick6");
    assert_eq!(exec.calls(), vec![vec!["convert", "-version"]]);
}

#[test]
fn old_tool_is_rejected() {
    let exec = scripted("Version: ImageMagick 6.2.8 Q16\n", "sRGB\n");
    let err = Magick::with_executor(&ToolSettings::default(), exec).unwrap_err();
    assert!(matches!(
        err,
        MagickError::Unsupported {
            kind: UnsupportedKind::Toolchain,
            ..
        }
    ));
}

#[test]
fn missing_banner_means_not_installed() {
    let exec = scripted("", "sRGB\n");
    let err = Magick::with_executor(&ToolSettings::default(), exec).unwrap_err();
    assert!(matches!(err, MagickError::Precondition(_)));
}

#[test]
fn version_check_can_be_disabled() {
    let exec = scripted("", "sRGB\n");
    Magick::with_executor(&unchecked(), exec.clone()).unwrap();
    assert_eq!(exec.call_count(), 0);
}

#[test]
fn open_probes_palette_and_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.gif");
    std::fs::write(&path, b"GIF89a").unwrap();
    let path_arg = path.to_string_lossy().into_owned();

    let exec = scripted(BANNER, "sRGB\n");
    let magick = Magick::with_executor(&unchecked(), exec.clone()).unwrap();
    let img = magick.open(&path).unwrap();

    assert_eq!(img.palette(), Palette::Rgb);
    assert_eq!(img.layers().len(), 3);
    assert_eq!(img.input(), [path_arg.as_str()]);
    assert_eq!(img.source_path(), Some(path.as_path()));
    assert_eq!(img.metadata().get("filepath"), Some(path_arg.as_str()));
    assert!(img.arguments().is_empty());
    assert_eq!(
        exec.calls()[0],
        vec!["identify", "-format", "%[colorspace]\n", path_arg.as_str()]
    );
}

#[test]
fn open_uses_the_magick_binary_for_version_7() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    std::fs::write(&path, b"png").unwrap();

    let exec = scripted(
        "Version: ImageMagick 7.1.1-15 Q16-HDRI aarch64\n",
        "Gray\n",
    );
    let settings = ToolSettings::default().with_toolchain(Toolchain::ImageMagick7);
    let magick = Magick::with_executor(&settings, exec.clone()).unwrap();
    let img = magick.open(&path).unwrap();

    assert_eq!(img.palette(), Palette::Grayscale);
    let calls = exec.calls();
    assert_eq!(calls[0], vec!["magick", "-version"]);
    assert_eq!(calls[1][..2], ["magick", "identify"]);
}

#[test]
fn open_rejects_missing_files_without_probing() {
    let exec = scripted(BANNER, "sRGB\n");
    let magick = Magick::with_executor(&unchecked(), exec.clone()).unwrap();
    let err = magick.open("/definitely/not/here.png").unwrap_err();
    assert!(matches!(err, MagickError::InvalidArgument(_)));
    assert_eq!(exec.call_count(), 0);
}

#[test]
fn open_rejects_unknown_colorspaces() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.tif");
    std::fs::write(&path, b"tiff").unwrap();

    let exec = scripted(BANNER, "Lab\n");
    let magick = Magick::with_executor(&unchecked(), exec).unwrap();
    let err = magick.open(&path).unwrap_err();
    assert!(matches!(
        err,
        MagickError::Unsupported {
            kind: UnsupportedKind::Colorspace,
            ..
        }
    ));
}

#[test]
fn loaded_bytes_live_as_long_as_the_image() {
    let exec = scripted(BANNER, "CMYK\n");
    let magick = Magick::with_executor(&unchecked(), exec).unwrap();
    let img = magick.load(b"raw image bytes").unwrap();

    assert_eq!(img.palette(), Palette::Cmyk);
    assert_eq!(img.source_path(), None);
    let path = PathBuf::from(&img.input()[0]);
    assert_eq!(std::fs::read(&path).unwrap(), b"raw image bytes");

    drop(img);
    assert!(!path.exists());
}

#[test]
fn read_drains_the_stream() {
    let exec = scripted(BANNER, "sRGB\n");
    let magick = Magick::with_executor(&unchecked(), exec).unwrap();
    let img = magick.read(Cursor::new(b"streamed".to_vec())).unwrap();
    let path = PathBuf::from(&img.input()[0]);
    assert_eq!(std::fs::read(&path).unwrap(), b"streamed");
}

#[test]
fn create_builds_a_canvas_with_a_known_size() {
    let exec = scripted(BANNER, "sRGB\n");
    let magick = Magick::with_executor(&unchecked(), exec.clone()).unwrap();

    let mut white = magick.create(Size::new(20, 10), None).unwrap();
    assert_eq!(white.input(), ["-size", "20x10", "xc:#ffffff"]);
    assert_eq!(white.size().unwrap(), Size::new(20, 10));
    assert_eq!(white.palette(), Palette::Rgb);

    let tinted = magick
        .create(Size::new(4, 4), Some(Color::rgba(255, 0, 0, 128)))
        .unwrap();
    assert_eq!(tinted.input()[2], "xc:#ff000080");
    assert_eq!(exec.call_count(), 0);

    assert!(matches!(
        magick.create(Size::new(0, 4), None),
        Err(MagickError::InvalidArgument(_))
    ));
}
