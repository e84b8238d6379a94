mod shell;
mod terminal;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use inference::{BackendRegistry, GatewayError, InferenceGateway, LLMStatus};
use weaver_engine::constants::{files, storage::CONFIG_FILE};
use weaver_engine::{
    default_data_dir, export, write_preview, AppConfig, ConfigError, FileStorage, FlowError,
    GatewayCodeModel, ModelConfig, NotificationSink, ProjectStore, Result, Session, Variant,
    Viewport, WeaverError,
};

use shell::Shell;
use terminal::{LinePrompt, TerminalSink};

/// Environment variable that overrides the configured API key
const API_KEY_ENV: &str = "WEB_WEAVER_API_KEY";

#[derive(Debug, Parser)]
#[command(name = "web-weaver", version, about = "Turn prompts into runnable web pages")]
struct Cli {
    /// Directory holding config.json and saved projects
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Inference backend (OpenAI, Ollama)
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Model name passed to the backend
    #[arg(long, global = true)]
    model: Option<String>,

    /// Server base URL override
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Code shape: multi_file or component
    #[arg(long, global = true)]
    variant: Option<Variant>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive session (default)
    Shell,
    /// List saved projects, newest first
    List,
    /// Write a saved project as a ZIP archive
    Export {
        id: String,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a saved project's preview page
    Preview {
        id: String,
        /// Output file
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value = "fill")]
        viewport: Viewport,
    },
    /// Print the effective configuration
    Config {
        /// Write a default config.json if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Apply command-line and environment overrides on top of the loaded file
fn apply_overrides(config: &mut AppConfig, cli: &Cli, api_key: Option<String>) {
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    if let Some(backend) = &cli.backend {
        config.model.backend = backend.clone();
    }
    if let Some(model) = &cli.model {
        config.model.model = model.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.model.base_url = Some(base_url.clone());
    }
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        config.model.api_key = Some(key);
    }
}

/// Create and start the configured backend.
///
/// A backend that fails to start is logged and left not ready so the
/// session can still browse and export saved projects.
async fn connect(config: &ModelConfig) -> Result<(GatewayCodeModel, LLMStatus)> {
    let backend = BackendRegistry::new()
        .create(&config.backend)
        .map_err(|e| FlowError::from(GatewayError::from(e)))?;
    let gateway = InferenceGateway::with_backend(backend, &config.backend);

    match gateway.start(&config.backend_config()).await {
        Ok(()) => log::info!("Connected to {} with model {}", config.backend, config.model),
        Err(e) => log::warn!("Backend '{}' did not start: {}", config.backend, e),
    }
    let status = gateway.status().await;

    let model = GatewayCodeModel::new(Arc::new(gateway), config.model.clone())
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens);
    Ok((model, status))
}

fn open_store(data_dir: &Path) -> Result<ProjectStore> {
    let mut store = ProjectStore::new(Box::new(FileStorage::new(data_dir)));
    store.load()?;
    Ok(store)
}

async fn run_shell(config: &AppConfig, data_dir: &Path) -> Result<()> {
    let (model, status) = connect(&config.model).await?;

    let sink: Arc<dyn NotificationSink> = Arc::new(TerminalSink);
    let store = ProjectStore::new(Box::new(FileStorage::new(data_dir)));
    let mut session = Session::new(config.variant, store, sink);
    // A failed load is reported through the sink; the session starts empty
    let _ = session.load_projects();

    let export_dir = config.export_dir_or(&std::env::current_dir()?);
    Shell::new(&mut session, &model, LinePrompt::stdin(), export_dir, status)
        .run()
        .await?;
    Ok(())
}

fn list_projects(data_dir: &Path) -> Result<()> {
    let store = open_store(data_dir)?;
    if store.is_empty() {
        println!("No saved projects.");
    }
    for project in store.list() {
        println!("{}  {}  ({})", project.id, project.name, project.code.variant());
    }
    Ok(())
}

fn export_project(config: &AppConfig, data_dir: &Path, id: &str, out: Option<PathBuf>) -> Result<()> {
    let store = open_store(data_dir)?;
    let project = store
        .get(id)
        .ok_or_else(|| WeaverError::NotFound(id.to_string()))?;

    let dir = match out {
        Some(dir) => dir,
        None => config.export_dir_or(&std::env::current_dir()?),
    };
    let path = export::write_archive(&dir, &project.name, &project.code)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn preview_project(
    config: &AppConfig,
    data_dir: &Path,
    id: &str,
    out: Option<PathBuf>,
    viewport: Viewport,
) -> Result<()> {
    let store = open_store(data_dir)?;
    let project = store
        .get(id)
        .ok_or_else(|| WeaverError::NotFound(id.to_string()))?;

    let path = match out {
        Some(path) => path,
        None => config
            .export_dir_or(&std::env::current_dir()?)
            .join(files::PREVIEW),
    };
    write_preview(&path, &project.code, viewport)?;
    println!("Wrote {} at {}", path.display(), viewport);
    Ok(())
}

async fn show_config(config: &AppConfig, data_dir: &Path, init: bool) -> Result<()> {
    if init {
        if data_dir.join(CONFIG_FILE).exists() {
            println!("Config already exists in {}", data_dir.display());
        } else {
            let path = AppConfig::default().save(data_dir).await?;
            println!("Wrote {}", path.display());
        }
    }

    let mut shown = config.clone();
    if shown.model.api_key.is_some() {
        shown.model.api_key = Some("********".to_string());
    }
    let json = serde_json::to_string_pretty(&shown).map_err(ConfigError::Serialize)?;
    println!("Data directory: {}", data_dir.display());
    println!("{}", json);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    let mut config = AppConfig::load(&data_dir).await?;
    apply_overrides(&mut config, &cli, std::env::var(API_KEY_ENV).ok());
    log::debug!("Using data directory {:?}", data_dir);

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => run_shell(&config, &data_dir).await,
        Command::List => list_projects(&data_dir),
        Command::Export { id, out } => export_project(&config, &data_dir, &id, out),
        Command::Preview { id, out, viewport } => {
            preview_project(&config, &data_dir, &id, out, viewport)
        }
        Command::Config { init } => show_config(&config, &data_dir, init).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply_over_file() {
        let cli = Cli::parse_from([
            "web-weaver",
            "--backend",
            "Ollama",
            "--variant",
            "component",
            "list",
        ]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &cli, Some("sk-test".to_string()));

        assert_eq!(config.model.backend, "Ollama");
        assert_eq!(config.variant, Variant::Component);
        assert_eq!(config.model.api_key.as_deref(), Some("sk-test"));
        // Untouched fields keep their file values
        assert_eq!(config.model.model, ModelConfig::default().model);
        assert!(matches!(cli.command, Some(Command::List)));
    }

    #[test]
    fn test_empty_api_key_is_ignored() {
        let cli = Cli::parse_from(["web-weaver"]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &cli, Some(String::new()));
        assert!(config.model.api_key.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_preview_viewport_flag() {
        let cli = Cli::parse_from(["web-weaver", "preview", "42", "--viewport", "mobile"]);
        match cli.command {
            Some(Command::Preview { id, viewport, out }) => {
                assert_eq!(id, "42");
                assert_eq!(viewport, Viewport::Mobile);
                assert!(out.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_backend_is_rejected() {
        let config = ModelConfig {
            backend: "Nope".to_string(),
            ..ModelConfig::default()
        };
        assert!(matches!(connect(&config).await, Err(WeaverError::Model(_))));
    }
}
