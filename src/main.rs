//! Physio Coach console driver
//!
//! Streams simulated angle frames through a session and renders phase,
//! feedback and safety warnings per frame, then the session summary.

use clap::Parser;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use physio_coach::cli::{Args, Display, InputHandler};
use physio_coach::pose::{AngleSource, SimulatedSource};
use physio_coach::session::{SafetyConfig, Session, WarningLevel};
use physio_coach::{ExerciseCatalog, Result};

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.debug);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("physio_coach=debug")
    } else {
        EnvFilter::new("physio_coach=info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn run(args: Args) -> Result<()> {
    let catalog = match &args.profiles {
        Some(path) => ExerciseCatalog::load(path)?,
        None => ExerciseCatalog::builtin(),
    };

    let display = Display::new(!args.quiet).raw_mode(args.interactive);
    if args.list {
        return display.show_exercises(&catalog);
    }

    let profile = catalog.get(&args.exercise)?;
    let config = SafetyConfig {
        reset_streaks_on_safe_frame: args.reset_on_safe,
        ..SafetyConfig::default()
    };
    let mut session = Session::new(profile.clone(), config);
    let mut source = SimulatedSource::new(profile.clone(), args.seed, args.noise)
        .with_limit(args.frames);

    if !args.json {
        display.show_header(&profile, args.interactive)?;
    }

    let delay = Duration::from_millis(args.delay_ms);
    let input = InputHandler::new(delay);
    if args.interactive {
        InputHandler::enable_raw_mode()?;
    }

    let outcome = stream_frames(&mut session, &mut source, &display, &input, &args, delay);

    if args.interactive {
        InputHandler::disable_raw_mode()?;
    }
    outcome?;

    let summary = session.summary();
    if args.json {
        display.show_summary_json(&summary)
    } else {
        display.show_summary(&summary)
    }
}

fn stream_frames(
    session: &mut Session,
    source: &mut impl AngleSource,
    display: &Display,
    input: &InputHandler,
    args: &Args,
    delay: Duration,
) -> Result<()> {
    while let Some(angles) = source.next_angles() {
        let report = session.process_with_alerts(angles, source.critical_events());
        if !args.json {
            display.show_frame(&report)?;
        }

        if report.warning_level == WarningLevel::CRITICAL {
            tracing::warn!(frame = report.frame_number, "Critical warning, ending session");
            break;
        }

        if args.interactive {
            if input.should_quit()? {
                break;
            }
        } else if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    Ok(())
}
