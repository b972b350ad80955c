//! Run subcommand handler

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use humansize::{format_size, DECIMAL};
use tracing::{debug, warn};

use termreel::cli::{RunArgs, OUTPUT_ENV};
use termreel::pace::Pace;
use termreel::preview::{NullPreview, TuiPreview};
use termreel::{CancelFlag, Config, Recorder, RunStatus, Script};

/// Record a script and report where the artifact went.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: RunArgs) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    args.apply(&mut config);
    config.validate()?;

    let script = Script::load(&args.script)
        .with_context(|| format!("Failed to load script {}", args.script.display()))?;
    let output = args.output_path(&config, std::env::var(OUTPUT_ENV).ok());
    debug!(steps = script.len(), output = %output.display(), "script loaded");

    let headless = args.headless || !atty::is(atty::Stream::Stdout);
    let pace = if headless || args.no_pace {
        Pace::Instant
    } else {
        Pace::Realtime
    };

    // Raw mode swallows SIGINT, so this only fires in headless runs
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.cancel()) {
        warn!(error = %e, "could not install Ctrl+C handler");
    }

    let title = config.render.title.clone();
    let recorder = Recorder::new(config)
        .with_pace(pace)
        .with_cancel_flag(cancel);

    let recording = if headless {
        recorder.record(&script.steps, &output, &mut NullPreview::new())
    } else {
        match TuiPreview::new(title) {
            Ok(mut preview) => {
                let result = recorder.record(&script.steps, &output, &mut preview);
                drop(preview);
                result
            }
            Err(e) => {
                warn!(error = %e, "live preview unavailable, running headless");
                recorder.record(&script.steps, &output, &mut NullPreview::new())
            }
        }
    }?;

    match &recording.status {
        RunStatus::Completed => {}
        RunStatus::Interrupted => eprintln!(
            "Recording interrupted, keeping {} frame(s)",
            recording.frame_count
        ),
        RunStatus::Aborted(message) => eprintln!("Error: {}", message),
    }

    let size = fs::metadata(&recording.path)
        .map(|meta| format_size(meta.len(), DECIMAL))
        .unwrap_or_else(|_| "size unknown".to_string());
    println!(
        "Recording saved as '{}' ({})",
        recording.path.display(),
        size
    );

    Ok(ExitCode::from(recording.status.exit_code()))
}
