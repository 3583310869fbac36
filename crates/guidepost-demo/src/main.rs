#![forbid(unsafe_code)]

//! Guidepost demo binary entry point.

use guidepost_demo::cli;
use guidepost_demo::script;

fn main() {
    let opts = cli::Opts::parse();

    if let Err(e) = guidepost_core::logging::init_subscriber(opts.json_logs) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match script::run(&opts, &mut out) {
        Ok(summary) => {
            tracing::info!(
                steps_shown = summary.steps_shown,
                outcome = summary.outcome.map(|o| o.as_str()),
                "demo finished"
            );
        }
        Err(e) => {
            eprintln!("Demo error: {e}");
            std::process::exit(1);
        }
    }
}
