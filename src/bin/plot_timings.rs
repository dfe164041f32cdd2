use std::{path::PathBuf, process::ExitCode};
use clap::Parser;
use tracing::Level;

use benchplot::{
    logging,
    timing::{self, PointRange, TimingOptions, DEFAULT_X_STEP},
    StyleRegistry, Theme,
};

/// Draw the median timings of some types over a range of measurement
/// points.
#[derive(Parser, Debug)]
#[command(version, about, allow_negative_numbers = true)]
struct Args {
    /// Input json filename.
    input_filename: PathBuf,
    /// Output filename, without the ".pdf" extension.
    output_filename: String,
    /// Operation shown in the y label, e.g. "find" or "insert".
    operation: String,
    /// From point of index 'from_point'.
    from_point: i64,
    /// To point of index 'to_point' (excluded).
    to_point: i64,
    /// Types to plot.
    #[arg(required = true)]
    types: Vec<String>,
    /// X distance between two consecutive points.
    #[arg(long, default_value_t = DEFAULT_X_STEP)]
    x_step: f64,
    /// Shade the low..high range of each series.
    #[arg(long)]
    band: bool,
    /// Place this many y-tick intervals from 0 to the largest timing.
    #[arg(long, value_name = "N")]
    y_ticks: Option<usize>,
    /// Set filter level for console logs.
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.log_level);

    let options = TimingOptions {
        x_step: args.x_step,
        band: args.band,
        y_ticks: args.y_ticks,
    };
    match timing::plot(&args.input_filename, &args.output_filename,
                       &args.operation,
                       PointRange::new(args.from_point, args.to_point),
                       &args.types, &StyleRegistry::containers(),
                       &Theme::default(), &options) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("plot-timings: {e}");
            ExitCode::FAILURE
        }
    }
}
