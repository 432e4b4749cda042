use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use magcal::{CalibrationError, DEFAULT_TARGET_RADIUS, LinalgError, fit, read_samples};

/// Compute a magnetometer calibration from raw samples.
///
/// Prints the hard-iron bias (three lines) followed by the soft-iron
/// correction matrix (three rows).
#[derive(Parser)]
#[command(name = "magcal", version, about)]
struct Args {
    /// Sample file: one "x<TAB>y<TAB>z" reading per line.
    input: PathBuf,

    /// Sphere radius corrected readings are scaled onto, in gauss.
    #[arg(long, default_value_t = DEFAULT_TARGET_RADIUS)]
    radius: f64,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(args: &Args) -> Result<(), CalibrationError> {
    let samples = read_samples(&args.input)?;
    log::info!("read {} samples from {}", samples.len(), args.input.display());

    let cal = fit(&samples, args.radius)?;

    for b in cal.bias {
        println!("{:.6}", b);
    }
    for i in 0..3 {
        println!(
            "{:.6} {:.6} {:.6}",
            cal.correction[(i, 0)],
            cal.correction[(i, 1)],
            cal.correction[(i, 2)],
        );
    }
    Ok(())
}

fn exit_code(err: &CalibrationError) -> u8 {
    match err {
        CalibrationError::Io(_) | CalibrationError::Parse { .. } => 2,
        CalibrationError::InsufficientSamples { .. } => 3,
        CalibrationError::Numeric(LinalgError::NotPositiveDefinite) => 4,
        CalibrationError::Numeric(LinalgError::NonConvergence { .. }) => 5,
        CalibrationError::Numeric(_) => 6,
    }
}
