mod config;
mod pretty;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use colored::control::set_override;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};
use whence_core::{
    Flow, NeverCancel, Ranking, Selection, Settings, Suggestion, SuggestionSink, TIME_TAG,
    ZONE_TAG,
};

use crate::config::Config;
use crate::pretty::{print_suggestions, PrettyConfig};

const LONG_ABOUT: &str = r#"
Whence turns free text into a date/time value and shows it in many
renderings: unix timestamps, ISO 8601, configured formats under configured
locales, and timezone conversions.

CHAIN:
  The positional arguments replay a launcher-style drill-down. The first
  one picks the entry point ("time" or "zone"), the rest are previous
  selections: rendered labels and IANA timezone identifiers, alternating.
  The -i/--input flag is the text currently being typed.

EXAMPLES:
  whence time -i 1703456789           Interpret a unix timestamp
  whence time -i "next friday 8pm"    Natural-language input
  whence time -i tomorrow --copy 3    Copy the third rendering
  whence zone -i berlin               Resolve a place to timezones
  whence zone "Asia/Tokyo" -i 15:00   Time in Tokyo at 15:00
  whence --zones                      Dump the offline zone listing

CONFIGURATION:
  Config file location: whence --config-path
  Generate default config: whence --config-init
"#;

#[derive(Parser)]
#[command(name = "whence")]
#[command(version)]
#[command(about = "Turn free text into date/time suggestions")]
#[command(long_about = LONG_ABOUT)]
struct Cli {
    /// Selection chain: entry point first, previous selections after
    #[arg(value_name = "CHAIN")]
    chain: Vec<String>,

    /// Text currently being typed (defaults to empty)
    #[arg(long, short = 'i', default_value = "")]
    input: String,

    /// Output suggestions as JSON (for scripting/piping)
    #[arg(long, short = 'j')]
    json: bool,

    /// Copy suggestion N (1-based) to the clipboard and exit
    #[arg(long, value_name = "N")]
    copy: Option<usize>,

    /// Skip online place-name lookups for this run
    #[arg(long)]
    offline: bool,

    /// Dump the offline timezone listing
    #[arg(long)]
    zones: bool,

    /// Show strategy tags next to each suggestion
    #[arg(long, short = 't')]
    tags: bool,

    /// Disable colored output
    #[arg(long, short = 'C')]
    no_color: bool,

    /// Increase log verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the config file path and exit
    #[arg(long)]
    config_path: bool,

    /// Write a default config file and exit
    #[arg(long)]
    config_init: bool,
}

/// Keeps the most recently published candidate set.
#[derive(Default)]
struct LatestSink {
    suggestions: Vec<Suggestion>,
}

impl SuggestionSink for LatestSink {
    fn publish(&mut self, suggestions: Vec<Suggestion>, _ranking: Ranking) {
        self.suggestions = suggestions;
    }
}

/// Map the CLI tokens onto a selection chain.
///
/// Later tokens double as both label and tag: a timezone pick is its IANA
/// identifier either way, and a re-derived rendering only needs its label.
fn build_chain(tokens: &[String], settings: &Settings) -> Option<Vec<Selection>> {
    let first = tokens.first()?;
    // Both the short aliases and the configured entry labels are accepted.
    let entry = match first.as_str() {
        "time" => Selection::new(settings.item_label.clone(), TIME_TAG),
        "zone" | "timezone" => Selection::new(settings.item_label2.clone(), ZONE_TAG),
        other if other == settings.item_label => {
            Selection::new(settings.item_label.clone(), TIME_TAG)
        }
        other if other == settings.item_label2 => {
            Selection::new(settings.item_label2.clone(), ZONE_TAG)
        }
        other => {
            eprintln!("unknown entry point {:?} (expected \"time\" or \"zone\")", other);
            return None;
        }
    };

    let mut chain = vec![entry];
    chain.extend(
        tokens[1..]
            .iter()
            .map(|token| Selection::new(token.clone(), token.clone())),
    );
    Some(chain)
}

fn copy_to_clipboard(label: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(label.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.config_path {
        match Config::path() {
            Some(path) => println!("{}", path.display()),
            None => eprintln!("no config directory on this platform"),
        }
        return ExitCode::SUCCESS;
    }

    if cli.config_init {
        let Some(path) = Config::path() else {
            eprintln!("no config directory on this platform");
            return ExitCode::FAILURE;
        };
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                eprintln!("failed to create {}: {}", parent.display(), err);
                return ExitCode::FAILURE;
            }
        }
        if let Err(err) = fs::write(&path, config::DEFAULT_CONFIG) {
            eprintln!("failed to write {}: {}", path.display(), err);
            return ExitCode::FAILURE;
        }
        println!("wrote {}", path.display());
        return ExitCode::SUCCESS;
    }

    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        set_override(false);
    }

    let mut settings = Config::load().into_settings();
    if cli.offline {
        settings.online = false;
    }
    tracing::debug!(
        formats = ?settings.formats,
        locales = ?settings.locales,
        online = settings.online,
        "effective settings"
    );
    let flow = Flow::new(settings);

    if cli.zones {
        return output(&cli, whence_core::list_zones());
    }

    let Some(chain) = build_chain(&cli.chain, flow.settings()) else {
        eprintln!("usage: whence <time|zone> [CHAIN]... [-i INPUT]");
        return ExitCode::FAILURE;
    };

    let mut sink = LatestSink::default();
    flow.suggest(&cli.input, &chain, &mut sink, &NeverCancel);

    output(&cli, sink.suggestions)
}

fn output(cli: &Cli, suggestions: Vec<Suggestion>) -> ExitCode {
    if suggestions.is_empty() {
        eprintln!("no suggestions");
        return ExitCode::FAILURE;
    }

    if let Some(pick) = cli.copy {
        let Some(suggestion) = pick.checked_sub(1).and_then(|i| suggestions.get(i)) else {
            eprintln!("--copy {}: only {} suggestions", pick, suggestions.len());
            return ExitCode::FAILURE;
        };
        if let Err(err) = copy_to_clipboard(&suggestion.label) {
            eprintln!("clipboard unavailable: {}", err);
            return ExitCode::FAILURE;
        }
        println!("{}", suggestion.label);
        return ExitCode::SUCCESS;
    }

    if cli.json {
        match serde_json::to_string_pretty(&suggestions) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("failed to serialize: {}", err);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    let config = PrettyConfig {
        color: !cli.no_color,
        show_tags: cli.tags,
    };
    print_suggestions(&suggestions, &config);
    ExitCode::SUCCESS
}
