use clap::{Parser, Subcommand, ValueEnum};
use imgtool::config::{self, ToolConfig};
use imgtool::process::ProcessEvent;
use imgtool::{batch, naming, output, process, scan};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "imgtool")]
#[command(about = "Convert, resize and watermark images")]
#[command(long_about = "\
Convert, resize and watermark images

One file at a time, or a whole directory across a pool of workers.

Pipeline, per file:

  decode → resize (optional) → watermark (optional) → encode

Formats: png, jpg/jpeg, gif, webp (read and write).
JPEG output is always named *.jpg, even with --to jpeg.

Resize specs:
  800x600   exact size
  0x600     height 600, width keeps the aspect ratio
  800x0     width 800, height keeps the aspect ratio
  50%       scale both sides

A malformed resize spec is a warning; the image is converted unresized.
In directory mode a failing file is reported and the rest carry on.

Settings are read from ./imgtool.toml (or --config) and overridden by flags.
Run 'imgtool gen-config' to generate a documented imgtool.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one image, or every image in a directory
    Convert(ConvertArgs),
    /// Print a stock imgtool.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// INPUT is one image file
    Single,
    /// INPUT is a directory; OUTPUT is the output directory
    Dir,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Input image (single mode) or directory (dir mode)
    input: PathBuf,

    /// Output file (single mode, defaults to INPUT with the new extension)
    /// or output directory (dir mode, required)
    output: Option<PathBuf>,

    /// Target format: png, jpg, jpeg, gif, webp. JPEG output is always
    /// written with a .jpg extension
    #[arg(long)]
    to: Option<String>,

    /// Quality for lossy formats (1-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Resize spec: WxH, 0xH, Wx0 or P%
    #[arg(long)]
    resize: Option<String>,

    /// Watermark image composited into the bottom-right corner
    #[arg(long)]
    watermark: Option<PathBuf>,

    /// Watermark opacity (0-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    watermark_opacity: Option<u32>,

    /// Process a single file or a directory
    #[arg(long, value_enum, default_value_t = Mode::Single)]
    mode: Mode,

    /// Include subdirectories (dir mode)
    #[arg(long)]
    recursive: bool,

    /// Number of parallel workers (dir mode)
    #[arg(long)]
    workers: Option<usize>,

    /// Config file (defaults to ./imgtool.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Encode WebP losslessly regardless of quality
    #[arg(long)]
    webp_lossless: bool,

    /// Write a JSON report of every output to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert(args) => {
            let mut config = match &args.config {
                Some(path) => config::load_config(path)?,
                None => config::discover_config(Path::new("."))?,
            };
            apply_args(&mut config, &args);
            config.validate()?;
            let options = config.processing_options()?;

            match args.mode {
                Mode::Single => {
                    let output_path = args
                        .output
                        .clone()
                        .unwrap_or_else(|| naming::sibling_output_path(&args.input, options.format));
                    output::print_process_event(&ProcessEvent::Started {
                        input: args.input.clone(),
                        output: output_path.clone(),
                    });
                    let report = process::process_image(&args.input, &output_path, &options)?;
                    for warning in &report.warnings {
                        output::print_process_event(&ProcessEvent::Warning {
                            input: args.input.clone(),
                            warning: warning.clone(),
                        });
                    }
                    write_report(args.report.as_deref(), &report)?;
                }
                Mode::Dir => {
                    let output_dir = args
                        .output
                        .clone()
                        .ok_or("dir mode needs an OUTPUT directory")?;
                    let inputs = scan::find_image_files(&args.input, config.processing.recursive)?;
                    let (tx, rx) = std::sync::mpsc::channel();
                    let printer = std::thread::spawn(move || {
                        for event in rx {
                            output::print_process_event(&event);
                        }
                    });
                    let result = batch::process_batch(
                        &inputs,
                        &output_dir,
                        &options,
                        config.processing.workers,
                        Some(tx),
                    );
                    printer
                        .join()
                        .map_err(|_| "output printer thread panicked")?;
                    let report = result?;
                    output::print_batch_summary(&report);
                    write_report(args.report.as_deref(), &report)?;
                }
            }
            println!("{}", output::COMPLETION_MESSAGE);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Layer command-line flags over the loaded config.
fn apply_args(config: &mut ToolConfig, args: &ConvertArgs) {
    if let Some(to) = &args.to {
        config.convert.format = to.clone();
    }
    if let Some(quality) = args.quality {
        config.convert.quality = quality;
    }
    if let Some(resize) = &args.resize {
        config.convert.resize = resize.clone();
    }
    if let Some(watermark) = &args.watermark {
        config.convert.watermark = watermark.to_string_lossy().into_owned();
    }
    if let Some(opacity) = args.watermark_opacity {
        config.convert.watermark_opacity = opacity;
    }
    if let Some(workers) = args.workers {
        config.processing.workers = workers;
    }
    config.processing.recursive |= args.recursive;
    config.convert.webp_lossless |= args.webp_lossless;
}

fn write_report(path: Option<&Path>, report: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = path {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json)?;
    }
    Ok(())
}
