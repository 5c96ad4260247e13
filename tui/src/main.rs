//! Zoo Exhibit TUI Entry Point
//!
//! Launches the terminal signboard creator.
//!
//! # Usage
//!
//! ```bash
//! # Local Ollama with defaults
//! zoo-exhibit
//!
//! # Gemini
//! GEMINI_API_KEY=... zoo-exhibit --backend gemini
//!
//! # Save images somewhere specific, with a debug log
//! RUST_LOG=debug zoo-exhibit --export-dir ~/Pictures --log-file /tmp/zoo.log
//! ```

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use exhibit_core::backend::{GeminiBackend, OllamaBackend};
use exhibit_core::{
    load_config, load_config_from_path, BackendConfig, BackendKind, ConfigOverrides,
    GenerationClient, LlmGenerationClient, OrchestratorConfig,
};
use zoo_exhibit_tui::{App, ExhibitClient, ImageExporter};

/// Log filter when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "zoo_exhibit_tui=info,exhibit_core=info";

/// Zoo Exhibit - turn yourself into a zoo exhibit signboard
#[derive(Parser, Debug)]
#[command(name = "zoo-exhibit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generation backend (ollama, gemini)
    #[arg(short = 'b', long, value_name = "KIND")]
    backend: Option<BackendKind>,

    /// Model name
    #[arg(short = 'm', long, value_name = "MODEL")]
    model: Option<String>,

    /// Directory exported images are saved to
    #[arg(short = 'o', long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Generation timeout in seconds
    #[arg(long, value_name = "SECS")]
    generation_timeout: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "ZOO_EXHIBIT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file (the terminal is busy with the UI)
    #[arg(long, env = "ZOO_EXHIBIT_LOG_FILE", value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(kind) = self.backend {
            overrides = overrides.with_backend_kind(kind);
        }
        if let Some(model) = &self.model {
            overrides = overrides.with_model(model.clone());
        }
        if let Some(dir) = &self.export_dir {
            overrides = overrides.with_export_directory(dir.clone());
        }
        if let Some(secs) = self.generation_timeout {
            overrides = overrides.with_generation_timeout_secs(secs);
        }
        overrides
    }
}

/// `zoo-exhibit/zoo-exhibit.log` under the state (or data) directory
fn default_log_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_dir)
        .map(|dir| dir.join("zoo-exhibit").join("zoo-exhibit.log"))
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_file = args.log_file.clone().or_else(default_log_path);
    init_logging(log_file.as_deref())?;

    let mut config = match &args.config {
        Some(path) => load_config_from_path(Some(path.clone())),
        None => load_config(),
    }
    .context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;
    let backend_config = config.backend_config().context("Invalid backend configuration")?;

    tracing::info!(
        backend = backend_config.kind(),
        model = config.model_name(),
        source = %config.source(),
        "Configuration loaded"
    );

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("❌ Error: zoo-exhibit requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  • Running in a non-interactive environment (CI, container)");
        eprintln!("  • SSH without -t flag");
        eprintln!("  • Piped stdin/stdout");
        std::process::exit(1);
    }

    let exporter = ImageExporter::from_config(&config);
    let orchestrator_config = OrchestratorConfig::from(&config);
    let model = config.model_name().to_string();
    let temperature = config.temperature;

    let farewell = match backend_config {
        BackendConfig::Ollama { host, port } => {
            let generator = LlmGenerationClient::new(OllamaBackend::new(host, port), model)
                .with_temperature(temperature);
            run_terminal(generator, exporter, orchestrator_config).await?
        }
        BackendConfig::Gemini { api_key, base_url } => {
            let generator = LlmGenerationClient::new(GeminiBackend::new(api_key, base_url), model)
                .with_temperature(temperature);
            run_terminal(generator, exporter, orchestrator_config).await?
        }
    };

    // Show the farewell after the TUI closes
    if let Some(farewell) = farewell {
        println!("\n\x1b[33m🦁\x1b[0m {farewell}\n");
    }

    Ok(())
}

/// Set up the terminal, run the app, restore the terminal
async fn run_terminal<G>(
    generator: G,
    exporter: ImageExporter,
    config: OrchestratorConfig,
) -> anyhow::Result<Option<String>>
where
    G: GenerationClient + 'static,
{
    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let (width, height) = crossterm::terminal::size()?;
    let client = ExhibitClient::new(generator, exporter, config);
    let mut app = App::new(client, Rect::new(0, 0, width, height));
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map(|()| app.farewell().map(str::to_string))
}
