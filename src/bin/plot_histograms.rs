use std::{path::PathBuf, process::ExitCode};
use clap::Parser;
use tracing::Level;

use benchplot::{
    histogram::{self, ImageFormat},
    logging, StyleRegistry, Theme,
};

/// Draw the first series of a cache usage histogram file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Input file, one line of space separated counts per series.
    input_filename: PathBuf,
    /// Type: 'ft', 'ft_holes', 'ft_blocked_64', 'ft_blocked_64_holes',
    /// 'st_td', 'st_bu'.
    #[arg(value_name = "TYPE")]
    kind: String,
    /// Image format of `<type>.<format>`.
    #[arg(long, value_enum, default_value_t)]
    format: ImageFormat,
    /// Directory the image is written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Set filter level for console logs.
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.log_level);

    match histogram::plot(&args.input_filename, &args.kind,
                          &StyleRegistry::cache_layouts(), &Theme::default(),
                          args.format, &args.output_dir) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("plot-histograms: {e}");
            ExitCode::FAILURE
        }
    }
}
