#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually to keep the binary lean. Environment variables with
//! the `GUIDEPOST_DEMO_*` prefix provide defaults; flags override them.

use std::env;
use std::path::PathBuf;
use std::process;

use guidepost_core::geometry::Size;
use guidepost_tour::config::parse_size;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Guidepost Demo - scripted product walkthrough over an in-memory dashboard

USAGE:
    guidepost-demo [OPTIONS]

OPTIONS:
    --catalog=PATH        Load steps from a JSON catalog (default: built-in dashboard tour)
    --state=PATH          Persist walkthrough flags to PATH (default: in memory)
    --viewport=WxH        Viewport size (default: 1280x800)
    --reset               Clear stored flags before running
    --decline             Decline the welcome screen instead of accepting it
    --progress-url=URL    POST progress notices to URL (remote-progress feature)
    --json-logs           Emit logs as JSON on stderr
    --help, -h            Show this help message
    --version, -V         Show version

ENVIRONMENT VARIABLES:
    GUIDEPOST_DEMO_CATALOG    Override --catalog
    GUIDEPOST_DEMO_STATE      Override --state
    GUIDEPOST_DEMO_VIEWPORT   Override --viewport
    GUIDEPOST_LOG             Log filter (falls back to RUST_LOG, default: info)
    GUIDEPOST_MARGIN, GUIDEPOST_GAP, GUIDEPOST_TOOLTIP,
    GUIDEPOST_NAV_SETTLE_MS, GUIDEPOST_SCROLL_SETTLE_MS, GUIDEPOST_WELCOME
                              Engine configuration";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Step catalog file; `None` uses the built-in dashboard tour.
    pub catalog: Option<PathBuf>,
    /// Flag store file; `None` keeps flags in memory.
    pub state: Option<PathBuf>,
    pub viewport: Size,
    pub reset: bool,
    pub decline: bool,
    pub progress_url: Option<String>,
    pub json_logs: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            catalog: None,
            state: None,
            viewport: Size::new(1280.0, 800.0),
            reset: false,
            decline: false,
            progress_url: None,
            json_logs: false,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse the process arguments and environment, exiting on `--help`,
    /// `--version` or a bad argument.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("guidepost-demo {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with `env` as the environment.
    pub fn parse_from(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Parsed, String> {
        let mut opts = Self::default();

        // Environment first
        if let Some(val) = env("GUIDEPOST_DEMO_CATALOG") {
            opts.catalog = Some(PathBuf::from(val));
        }
        if let Some(val) = env("GUIDEPOST_DEMO_STATE") {
            opts.state = Some(PathBuf::from(val));
        }
        if let Some(val) = env("GUIDEPOST_DEMO_VIEWPORT")
            && let Some(size) = parse_size(&val)
        {
            opts.viewport = size;
        }

        // Flags override env
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--reset" => opts.reset = true,
                "--decline" => opts.decline = true,
                "--json-logs" => opts.json_logs = true,
                other => {
                    if let Some(val) = other.strip_prefix("--catalog=") {
                        opts.catalog = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--state=") {
                        opts.state = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--viewport=") {
                        match parse_size(val) {
                            Some(size) => opts.viewport = size,
                            None => return Err(format!("Invalid --viewport value: {val}")),
                        }
                    } else if let Some(val) = other.strip_prefix("--progress-url=") {
                        opts.progress_url = Some(val.to_string());
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        Ok(Parsed::Run(opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert_eq!(opts.viewport, Size::new(1280.0, 800.0));
        assert!(opts.catalog.is_none());
        assert!(!opts.reset);
    }

    #[test]
    fn flags_parse() {
        let parsed = Opts::parse_from(
            args(&["--catalog=steps.json", "--viewport=800x600", "--reset", "--json-logs"]),
            no_env,
        )
        .unwrap();
        let Parsed::Run(opts) = parsed else {
            panic!("expected run");
        };
        assert_eq!(opts.catalog, Some(PathBuf::from("steps.json")));
        assert_eq!(opts.viewport, Size::new(800.0, 600.0));
        assert!(opts.reset);
        assert!(opts.json_logs);
    }

    #[test]
    fn flags_override_env() {
        let env = |key: &str| match key {
            "GUIDEPOST_DEMO_STATE" => Some("env.json".to_string()),
            "GUIDEPOST_DEMO_VIEWPORT" => Some("1024x768".to_string()),
            _ => None,
        };
        let Ok(Parsed::Run(opts)) = Opts::parse_from(args(&["--state=flag.json"]), env) else {
            panic!("expected run");
        };
        assert_eq!(opts.state, Some(PathBuf::from("flag.json")));
        assert_eq!(opts.viewport, Size::new(1024.0, 768.0));
    }

    #[test]
    fn help_version_and_errors() {
        assert_eq!(Opts::parse_from(args(&["-h"]), no_env), Ok(Parsed::Help));
        assert_eq!(Opts::parse_from(args(&["--version"]), no_env), Ok(Parsed::Version));
        assert!(Opts::parse_from(args(&["--viewport=big"]), no_env).is_err());
        assert!(Opts::parse_from(args(&["--frobnicate"]), no_env).is_err());
    }

    #[test]
    fn help_text_lists_flags_and_env() {
        assert!(HELP_TEXT.contains("--catalog=PATH"));
        assert!(HELP_TEXT.contains("GUIDEPOST_DEMO_VIEWPORT"));
        assert!(!VERSION.is_empty());
    }
}
