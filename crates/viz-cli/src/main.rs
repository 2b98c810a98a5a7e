use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use viz_core::actions::{DashboardAction, RuntimeAction};
use viz_core::config::{CollaboratorMode, Config, ConfigError};
use viz_core::reducer::reduce;
use viz_core::state::{DashboardState, SessionState};
use viz_exec::{build_interpreter, submit, Interpreter};

mod ui;

/// Environment variable holding the tracing filter, e.g. `vizboard=debug`.
const LOG_ENV: &str = "VIZBOARD_LOG";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "vizboard", version)]
#[command(about = "Build a dashboard of charts from natural-language requests", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir, e.g. ~/.config/vizboard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Collaborator base URL; overrides the config file and VIZBOARD_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Use the offline rule-based collaborator instead of HTTP
    #[arg(long, global = true)]
    simulated: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive terminal dashboard (default)
    Dashboard,
    /// Run each query in order through a fresh session and print the resulting charts as JSON
    Ask {
        #[arg(required = true, value_name = "QUERY")]
        queries: Vec<String>,
    },
    /// Check the collaborator and describe its dataset
    Health,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli, |key| env::var(key).ok())?;

    match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => {
            let _guard = init_file_logging()?;
            run_dashboard(&config)
        }
        Commands::Ask { queries } => {
            init_stderr_logging();
            run_ask(&config, &queries)
        }
        Commands::Health => {
            init_stderr_logging();
            run_health(&config)
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vizboard").join("config.toml"))
}

/// File, then environment, then flags; later layers win.
fn resolve_config<F>(cli: &Cli, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match (&cli.config, default_config_path()) {
        (Some(path), _) => Config::load(path)?,
        (None, Some(path)) => Config::load_or_default(&path)?,
        (None, None) => Config::default(),
    };
    config.apply_env_overrides(lookup);
    if let Some(url) = &cli.api_url {
        config.collaborator.base_url = url.clone();
    }
    if cli.simulated {
        config.collaborator.mode = CollaboratorMode::Simulated;
    }
    Ok(config)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// The dashboard owns the terminal, so its logs go to a file.
fn init_file_logging() -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("vizboard");
    fs::create_dir_all(&dir)?;
    let appender = tracing_appender::rolling::never(&dir, "vizboard.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Ok(guard)
}

fn run_dashboard(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let interpreter = build_interpreter(&config.collaborator)?;
    tracing::info!(
        collaborator = interpreter.name(),
        base_url = %config.collaborator.base_url,
        "starting dashboard"
    );
    let session = SessionState::with_activity_capacity(config.session.activity_capacity);
    let mut state = DashboardState::new(session);
    reduce(
        &mut state,
        DashboardAction::Runtime(RuntimeAction::SetCollaboratorLabel(
            interpreter.name().to_string(),
        )),
    );
    ui::run(state, interpreter)
}

fn run_ask(config: &Config, queries: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let interpreter = build_interpreter(&config.collaborator)?;
    let mut session = SessionState::with_activity_capacity(config.session.activity_capacity);
    for query in queries {
        let applied = submit(&mut session, interpreter.as_ref(), query)?;
        eprintln!(
            "{} ({}) {} at position {}",
            applied.id,
            applied.disposition.label(),
            applied.outcome.label(),
            applied.position + 1
        );
    }
    println!("{}", serde_json::to_string_pretty(session.visualizations())?);
    Ok(())
}

fn run_health(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let interpreter: Arc<dyn Interpreter> = build_interpreter(&config.collaborator)?;
    let health = interpreter.health()?;
    println!(
        "collaborator: {} ({})",
        interpreter.name(),
        config.collaborator.base_url
    );
    println!("status: {}", health.status);
    println!("dataset loaded: {}", health.dataset_loaded);
    println!("rows: {}", health.rows);

    if health.dataset_loaded {
        let info = interpreter.dataset_info()?;
        println!(
            "shape: {} rows x {} columns",
            info.shape.rows, info.shape.columns
        );
        println!("columns: {}", info.columns.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;
    use viz_core::config::DEFAULT_API_URL;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vizboard").chain(args.iter().copied()))
            .expect("parse")
    }

    fn config_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(text.as_bytes()).expect("write");
        file
    }

    #[test]
    fn no_subcommand_means_dashboard() {
        assert!(parse(&[]).command.is_none());
        assert!(matches!(parse(&["dashboard"]).command, Some(Commands::Dashboard)));
    }

    #[test]
    fn ask_collects_every_query_in_order() {
        let cli = parse(&["ask", "pie chart of industry", "make it red"]);
        let Some(Commands::Ask { queries }) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(queries, vec!["pie chart of industry", "make it red"]);
    }

    #[test]
    fn ask_requires_a_query() {
        assert!(Cli::try_parse_from(["vizboard", "ask"]).is_err());
    }

    #[test]
    fn flags_override_environment_and_file() {
        let file = config_file(
            "[collaborator]\nbase_url = \"http://file:5000\"\ntimeout_ms = 2500\n",
        );
        let path = file.path().to_string_lossy().into_owned();
        let cli = parse(&["--config", &path, "--api-url", "http://flag:9000", "--simulated", "health"]);

        let config = resolve_config(&cli, |_| Some("http://env:7000".to_string())).expect("config");

        assert_eq!(config.collaborator.base_url, "http://flag:9000");
        assert_eq!(config.collaborator.timeout_ms, 2500);
        assert_eq!(config.collaborator.mode, CollaboratorMode::Simulated);
    }

    #[test]
    fn environment_overrides_file() {
        let file = config_file("[collaborator]\nbase_url = \"http://file:5000\"\n");
        let path = file.path().to_string_lossy().into_owned();
        let cli = parse(&["--config", &path]);

        let config = resolve_config(&cli, |key| {
            (key == viz_core::config::API_URL_ENV).then(|| "http://env:7000".to_string())
        })
        .expect("config");

        assert_eq!(config.collaborator.base_url, "http://env:7000");
        assert_eq!(config.collaborator.mode, CollaboratorMode::Http);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");
        let path = missing.to_string_lossy().into_owned();
        let cli = parse(&["--config", &path]);

        let err = resolve_config(&cli, |_| None).expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let file = config_file("");
        let path = file.path().to_string_lossy().into_owned();
        let cli = parse(&["--config", &path]);

        let config = resolve_config(&cli, |_| None).expect("config");
        assert_eq!(config.collaborator.base_url, DEFAULT_API_URL);
    }
}
