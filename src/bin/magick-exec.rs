use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use magick_exec::{
    Color, Fill, Filter, Interlace, LogicalImage, Magick, MagickResult, Palette, Point,
    SaveOptions, Size, ToolSettings, Toolchain,
};

#[derive(Parser, Debug)]
#[command(name = "magick-exec", version)]
struct Cli {
    /// Log every tool invocation to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON list of edits to an image and save the result with one tool invocation.
    Edit(EditArgs),
}

#[derive(Parser, Debug)]
struct EditArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// JSON array of edit operations.
    #[arg(long)]
    ops: PathBuf,

    /// Output image; the extension picks the format unless the options name one.
    #[arg(long)]
    out: PathBuf,

    /// JSON save options.
    #[arg(long)]
    options: Option<PathBuf>,

    /// JSON tool settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the toolchain from the settings.
    #[arg(long, value_enum)]
    toolchain: Option<ToolchainChoice>,

    /// Print the planned command line instead of running it.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ToolchainChoice {
    #[value(name = "imagemagick6")]
    ImageMagick6,
    #[value(name = "imagemagick7")]
    ImageMagick7,
}

impl From<ToolchainChoice> for Toolchain {
    fn from(value: ToolchainChoice) -> Self {
        match value {
            ToolchainChoice::ImageMagick6 => Toolchain::ImageMagick6,
            ToolchainChoice::ImageMagick7 => Toolchain::ImageMagick7,
        }
    }
}

/// One edit, as written in the ops file (`{"op": "resize", "width": 100, "height": 50}`).
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Op {
    Crop {
        #[serde(default)]
        x: u32,
        #[serde(default)]
        y: u32,
        width: u32,
        height: u32,
    },
    Resize {
        width: u32,
        height: u32,
        #[serde(default)]
        filter: Option<Filter>,
    },
    Rotate {
        angle: f64,
        #[serde(default)]
        background: Option<Color>,
    },
    FlipHorizontally,
    FlipVertically,
    Strip,
    Interlace {
        scheme: Interlace,
    },
    UsePalette {
        palette: Palette,
    },
    Fill {
        fill: Fill,
    },
    Gamma {
        correction: f64,
    },
    Negative,
    Grayscale,
    Sharpen,
    Blur {
        sigma: f64,
    },
    Brightness {
        value: f64,
    },
    Coalesce,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Edit(args) => cmd_edit(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_edit(args: EditArgs) -> anyhow::Result<()> {
    let mut settings: ToolSettings = match &args.config {
        Some(path) => read_json(path)?,
        None => ToolSettings::default(),
    };
    if let Some(choice) = args.toolchain {
        settings.toolchain = choice.into();
    }
    if args.dry_run {
        settings.check_version = false;
    }

    let ops: Vec<Op> = read_json(&args.ops)?;
    let options: SaveOptions = match &args.options {
        Some(path) => read_json(path)?,
        None => SaveOptions::default(),
    };

    let magick = Magick::new(&settings)?;
    let mut image = magick.open(&args.in_path)?;
    for (i, op) in ops.iter().enumerate() {
        apply(&mut image, op).with_context(|| format!("op #{i} ({op:?}) failed"))?;
    }

    if args.dry_run {
        let plan = image.plan(Some(&args.out), &options)?;
        let line = shlex::try_join(plan.argv().iter().map(String::as_str))
            .context("cannot quote the planned command line")?;
        println!("{line}");
        return Ok(());
    }

    image.save(Some(&args.out), &options)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn apply(image: &mut LogicalImage, op: &Op) -> MagickResult<()> {
    match op {
        Op::Crop {
            x,
            y,
            width,
            height,
        } => {
            image.crop(Point::new(*x, *y), Size::new(*width, *height))?;
        }
        Op::Resize {
            width,
            height,
            filter,
        } => {
            image.resize(
                Size::new(*width, *height),
                filter.unwrap_or(Filter::Undefined),
            )?;
        }
        Op::Rotate { angle, background } => {
            image.rotate(*angle, *background)?;
        }
        Op::FlipHorizontally => {
            image.flip_horizontally();
        }
        Op::FlipVertically => {
            image.flip_vertically();
        }
        Op::Strip => {
            image.strip();
        }
        Op::Interlace { scheme } => {
            image.interlace(*scheme);
        }
        Op::UsePalette { palette } => {
            image.use_palette(*palette);
        }
        Op::Fill { fill } => {
            image.fill(fill)?;
        }
        Op::Gamma { correction } => {
            image.effects().gamma(*correction)?;
        }
        Op::Negative => {
            image.effects().negative();
        }
        Op::Grayscale => {
            image.effects().grayscale();
        }
        Op::Sharpen => {
            image.effects().sharpen();
        }
        Op::Blur { sigma } => {
            image.effects().blur(*sigma)?;
        }
        Op::Brightness { value } => {
            image.effects().brightness(*value)?;
        }
        Op::Coalesce => {
            image.coalesce_layers();
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse json '{}'", path.display()))
}
