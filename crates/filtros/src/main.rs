use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::{Duration, Instant};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use filtros::controls::{Control, ControlRole, ControlSet};
use filtros::error::FilterError;
use filtros::{query, sync, Config, Field, FilterController, Navigation};

#[derive(Parser, Debug)]
#[command(name = "filtros")]
#[command(about = "Compute dashboard filter navigations from page URLs")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the filter state of a URL as JSON
    Parse {
        /// Page URL or query string
        url: String,
    },

    /// Change one filter and print the resulting navigation URL
    Change {
        url: String,
        /// Field name (mes, turma, tipo, estudante, status, page)
        field: Field,
        /// New value; empty clears the filter
        #[arg(default_value = "")]
        value: String,
    },

    /// Print the target of a "remove filter" link
    Remove { url: String, field: Field },

    /// Rewrite pagination links so they keep the filters of URL
    Paginate {
        url: String,
        #[arg(required = true)]
        hrefs: Vec<String>,
    },

    /// Replay keystrokes into the student search box
    Type {
        url: String,
        /// Comma-separated <ms>:<value> pairs, e.g. "0:a,100:ab,200:abc"
        script: String,
    },
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let config = Config::from_env().context("Failed to load configuration")?;

    match args.command {
        Commands::Parse { url } => {
            let state = query::parse_location(&url);
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Commands::Change { url, field, value } => {
            let (state, base_path) = load(&url, &config);
            let next = sync::apply_field_change(&state, field, &value);
            println!("{}", query::serialize(&next, &base_path));
        }
        Commands::Remove { url, field } => {
            let (state, base_path) = load(&url, &config);
            println!("{}", sync::remove_filter_href(&state, field, &base_path));
        }
        Commands::Paginate { url, hrefs } => {
            let state = query::parse_location(&url);
            for href in sync::rewrite_pagination_links(&hrefs, &state) {
                println!("{}", href);
            }
        }
        Commands::Type { url, script } => {
            let keystrokes = parse_keystrokes(&script).context("Invalid keystroke script")?;
            let navigations = replay(&url, &keystrokes, &config);
            info!(
                keystrokes = keystrokes.len(),
                navigations = navigations.len(),
                "Replay finished"
            );
            for nav in navigations {
                println!("{}", nav.url);
            }
        }
    }

    Ok(())
}

fn load(url: &str, config: &Config) -> (filtros::FilterState, String) {
    let href = query::Href::split(url);
    let base_path = if config.base_path.is_empty() {
        href.path.to_string()
    } else {
        config.base_path.clone()
    };
    (query::parse(href.query), base_path)
}

/// Parse "<ms>:<value>,..." into offsets and values
fn parse_keystrokes(script: &str) -> filtros::Result<Vec<(u64, String)>> {
    script
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|item| {
            let (ms, value) = item
                .split_once(':')
                .ok_or_else(|| FilterError::InvalidKeystroke(item.to_string()))?;
            let ms = ms
                .trim()
                .parse::<u64>()
                .map_err(|_| FilterError::InvalidKeystroke(item.to_string()))?;
            Ok((ms, value.to_string()))
        })
        .collect()
}

/// Feed keystrokes at their offsets. A navigation reloads the page, so the
/// replay continues on a fresh controller built from the new URL.
fn replay(url: &str, keystrokes: &[(u64, String)], config: &Config) -> Vec<Navigation> {
    let start = Instant::now();
    let page = || ControlSet::new().with(ControlRole::StudentSearch, Control::text());
    let mut controller = FilterController::new(url, page(), config);
    let mut navigations = Vec::new();

    for (offset, value) in keystrokes {
        let now = start + Duration::from_millis(*offset);
        if let Some(nav) = controller.poll(now) {
            controller.dispose();
            controller = FilterController::new(&nav.url, page(), config);
            navigations.push(nav);
        }
        if let Some(nav) = controller.on_input(ControlRole::StudentSearch, value, now) {
            navigations.push(nav);
        }
    }

    if let Some(deadline) = controller.next_deadline() {
        navigations.extend(controller.poll(deadline));
    }
    controller.dispose();

    navigations
}
