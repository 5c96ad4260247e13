//! Exhibit Core - Headless Orchestration for the Zoo Exhibit Creator
//!
//! Turns three short answers about a person into a zoo "exhibit signboard"
//! describing them as an animal, and sequences exporting that signboard as
//! an image. Nothing in this crate knows about terminals; a surface drives it
//! and renders what it reports.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      UI Surface (TUI)                    │
//! │   form · loading view · error banner · signboard · alert │
//! └───────────────┬──────────────────────────▲───────────────┘
//!                 │ transitions              │ ExhibitMessage
//!                 ▼                          │
//! ┌──────────────────────────────────────────┴───────────────┐
//! │                      Orchestrator                        │
//! │  InteractionState · UserInput draft · ExportControl      │
//! │        │                                   │             │
//! │  ┌─────▼────────────┐              ┌───────▼──────────┐  │
//! │  │ GenerationClient │              │     Exporter     │  │
//! │  │  (LlmBackend)    │              │  (surface-owned) │  │
//! │  └──────────────────┘              └──────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Orchestrator`]: the interaction state machine
//! - [`ExhibitMessage`]: messages sent from the Orchestrator to the surface
//! - [`GenerationClient`]: produces [`ExhibitData`] from [`UserInput`]
//! - [`Exporter`]: rasterizes whatever the surface has on screen
//! - [`StatAnimation`]: timing for the signboard's stat bars
//!
//! # Quick Start
//!
//! ```ignore
//! use exhibit_core::{
//!     backend::OllamaBackend, InputField, LlmGenerationClient, Orchestrator,
//!     OrchestratorConfig,
//! };
//! use tokio::sync::mpsc;
//!
//! let (tx, mut rx) = mpsc::channel(100);
//! let client = LlmGenerationClient::new(OllamaBackend::new("localhost", 11434), "llama3.2");
//! let mut orchestrator = Orchestrator::new(client, my_exporter, OrchestratorConfig::default(), tx);
//!
//! orchestrator.set_field(InputField::Name, "タロウ".into()).await?;
//! // ... fill the other fields, then
//! orchestrator.submit().await?;
//!
//! loop {
//!     orchestrator.poll(tokio::time::Instant::now()).await;
//!     while let Ok(msg) = rx.try_recv() {
//!         // Render message
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod animation;
pub mod backend;
pub mod config;
pub mod export;
pub mod generation;
pub mod labels;
pub mod messages;
pub mod model;
pub mod orchestrator;
pub mod rotation;

pub use animation::{EasingFunction, StatAnimation, STAT_FILL_DELAY, STAT_FILL_DURATION};
pub use backend::{BackendConfig, LlmBackend};
pub use config::{
    load_config, load_config_from_path, BackendKind, ConfigError, ConfigOverrides, ConfigSource,
    ExhibitConfig,
};
pub use export::{suggested_file_name, ExportControl, Exporter};
pub use generation::{GenerationClient, GenerationError, LlmGenerationClient};
pub use messages::{ExhibitMessage, NotifyLevel};
pub use model::{ContractViolation, ExhibitData, ExhibitStats, InputField, StatKind, UserInput};
pub use orchestrator::{InteractionState, Orchestrator, OrchestratorConfig, TransitionError};
pub use rotation::{StatusRotation, STATUS_ROTATION_INTERVAL};
