use atlasgen::config::{AtlasConfig, RawOptions};
use atlasgen::pipeline::{self, Mode};
use atlasgen::output;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Atlas options. Values are kept as typed; numbers are parsed leniently.
#[derive(clap::Args, Clone)]
struct AtlasArgs {
    /// Width and height of the atlas in pixels, at most 16384 [default: 1024]
    #[arg(long)]
    width: Option<String>,

    /// Encode quality, 1-100 [default: 80]
    #[arg(long)]
    quality: Option<String>,

    /// Glob selecting source images, relative to --root [default: **/*.jpg]
    #[arg(long)]
    pattern: Option<String>,

    /// Output file, relative to --root; the extension picks the format [default: atlas.jpg]
    #[arg(long = "file-name", alias = "fileName")]
    file_name: Option<String>,

    /// Warn about sources larger than this many bytes [default: 3145728]
    #[arg(long = "max-file-size", alias = "maxFileSize")]
    max_file_size: Option<String>,

    /// Warn about sources smaller than this many bytes [default: 3072]
    #[arg(long = "min-file-size", alias = "minFileSize")]
    min_file_size: Option<String>,
}

impl AtlasArgs {
    fn into_raw(self) -> RawOptions {
        RawOptions {
            width: self.width,
            quality: self.quality,
            pattern: self.pattern,
            file_name: self.file_name,
            max_file_size: self.max_file_size,
            min_file_size: self.min_file_size,
        }
    }
}

#[derive(Parser)]
#[command(name = "atlasgen")]
#[command(about = "Tile a folder tree of images into one square atlas")]
#[command(long_about = "\
Tile a folder tree of images into one square atlas

Every file under --root matching --pattern is shuffled and packed into the
largest perfect-square grid that fits, then resized to exactly --width
pixels on each side. Images that don't fit the square are listed as left
out; files that can't be read or decoded are listed as unprocessed.

  music/
  ├── Artist - 1999 - Album/
  │   └── cover.jpg          ← picked up by **/*.jpg
  ├── Other - 2004 - Live/
  │   └── front.jpg
  └── atlas.jpg              ← the output, never used as a source

The output format follows the --file-name extension: jpg, png, webp, tif,
avif. JPEG has no alpha, so letterboxed cells come out black.")]
#[command(version)]
struct Cli {
    /// Directory the pattern and output file are resolved against
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log pipeline internals to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also print the run report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Seed the shuffle for a reproducible layout
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover, composite, and write the atlas
    #[command(alias = "img")]
    Build(AtlasArgs),
    /// Discover and plan the grid without decoding or writing anything
    Check(AtlasArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut rng = cli
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

    let (args, mode) = match cli.command {
        Command::Build(args) => (args, Mode::Build),
        Command::Check(args) => (args, Mode::Check),
    };
    let config = AtlasConfig::from_raw(&cli.root, &args.into_raw());

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = match mode {
        Mode::Build => pipeline::run(&config, &mut rng, Some(tx)),
        Mode::Check => pipeline::check(&config, &mut rng, Some(tx)),
    };
    printer
        .join()
        .map_err(|_| "diagnostic printer panicked")?;
    let report = result?;

    println!();
    output::print_summary(&report);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Send tracing output to stderr so it never mixes with the report on stdout.
fn init_logging(verbose: bool) {
    let default = if verbose { "atlasgen=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
