mod args;

use args::{Args, Command, MatchArgs};
use clap::Parser;
use region_match::batch::{Report, run_match};
use region_match::video::{FrameSource, ImageFrameSource};
use region_match::MatchResult;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let source = ImageFrameSource::new();
    let result = match &args.command {
        Command::Match(match_args) => run(match_args, &source),
        Command::Info { video } => info(video, &source).map(|_| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) if e.is_input_error() => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Run aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

/// True when no target ended without a match
fn run(match_args: &MatchArgs, source: &dyn FrameSource) -> MatchResult<bool> {
    let stdout = std::io::stdout();
    let mut report = Report::new(stdout.lock());
    let summary = run_match(&match_args.options(), &match_args.config(), source, &mut report)?;
    Ok(summary.is_success())
}

fn info(video: &Path, source: &dyn FrameSource) -> MatchResult<()> {
    let capture = source.open(video)?;
    let (width, height) = capture.frame_size();
    println!("{}", video.display());
    println!("  frames: {}", capture.frame_count());
    println!("  fps:    {:.2}", capture.fps());
    println!("  size:   {width}x{height}");
    Ok(())
}
