//! Orchestrator - The Interaction Core
//!
//! The Orchestrator owns everything that changes while the user works on a
//! signboard:
//! - the [`InteractionState`] (Idle, Loading, Result, Failed)
//! - the [`UserInput`] draft, cleared independently of the result
//! - the export control's label state
//!
//! It is UI-agnostic. Surfaces call the transition operations below and build
//! their display from the [`ExhibitMessage`]s it sends back. Nothing else may
//! mutate the state; operations that make no sense in the current state are
//! rejected with a [`TransitionError`] and change nothing.
//!
//! Generation and export run as spawned tokio tasks. The surface's frame loop
//! calls [`Orchestrator::poll`] to settle them and to advance the loading
//! status; `poll` never blocks.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::ExhibitConfig;
use crate::export::{suggested_file_name, ExportControl, Exporter};
use crate::generation::{GenerationClient, GenerationError};
use crate::labels;
use crate::messages::{ExhibitMessage, NotifyLevel};
use crate::model::{ExhibitData, InputField, UserInput};
use crate::rotation::StatusRotation;

/// Where the interaction currently is
#[derive(Debug)]
pub enum InteractionState {
    /// Form visible and editable
    Idle,
    /// Waiting for the generation client; owns the status rotation
    Loading(StatusRotation),
    /// Signboard visible
    Result(ExhibitData),
    /// Generation failed; the form is editable again beneath the banner
    Failed(String),
}

impl InteractionState {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading(_) => "loading",
            Self::Result(_) => "result",
            Self::Failed(_) => "failed",
        }
    }

    /// Whether a generation is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    /// Whether the form accepts edits and submission
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed(_))
    }

    /// The displayed signboard, if any
    #[must_use]
    pub fn exhibit(&self) -> Option<&ExhibitData> {
        match self {
            Self::Result(data) => Some(data),
            _ => None,
        }
    }

    /// The failure banner text, if any
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Why a transition was refused
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// A generation is already in flight
    #[error("a signboard is already being generated")]
    Busy,

    /// A required field is empty after trimming
    #[error("{0:?} is required")]
    MissingField(InputField),

    /// A field exceeds the configured length
    #[error("{field:?} exceeds {max} characters")]
    FieldTooLong {
        /// Offending field
        field: InputField,
        /// Configured limit
        max: usize,
    },

    /// No signboard is displayed
    #[error("no signboard is displayed")]
    NoResult,

    /// An export is already in flight
    #[error("an export is already in progress")]
    ExportInProgress,

    /// The form is hidden behind a displayed signboard
    #[error("the form is not editable while a signboard is displayed")]
    NotEditable,
}

/// Orchestrator tuning
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Upper bound on one generation request
    pub generation_timeout: Duration,
    /// Upper bound on one export
    pub export_timeout: Duration,
    /// Maximum characters per input field
    pub max_field_chars: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(60),
            export_timeout: Duration::from_secs(30),
            max_field_chars: 200,
        }
    }
}

impl From<&ExhibitConfig> for OrchestratorConfig {
    fn from(config: &ExhibitConfig) -> Self {
        Self {
            generation_timeout: config.generation_timeout,
            export_timeout: config.export_timeout,
            max_field_chars: config.max_field_chars,
        }
    }
}

/// Outcome of checking a spawned task
enum Settle<T> {
    Pending,
    Done(T),
    /// The task ended without reporting (panicked or aborted)
    Lost,
}

/// A spawned task whose result is collected by polling
///
/// Dropping it aborts the task.
struct InFlight<T> {
    rx: oneshot::Receiver<T>,
    handle: JoinHandle<()>,
}

impl<T: Send + 'static> InFlight<T> {
    fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            // Receiver gone means nobody cares about the result
            let _ = tx.send(fut.await);
        });
        Self { rx, handle }
    }

    fn try_settle(&mut self) -> Settle<T> {
        match self.rx.try_recv() {
            Ok(value) => Settle::Done(value),
            Err(oneshot::error::TryRecvError::Empty) => Settle::Pending,
            Err(oneshot::error::TryRecvError::Closed) => Settle::Lost,
        }
    }
}

impl<T> Drop for InFlight<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct PendingGeneration {
    task: InFlight<Result<ExhibitData, GenerationError>>,
    display_name: String,
}

/// The interaction state machine
pub struct Orchestrator<G: GenerationClient, E: Exporter> {
    generator: Arc<G>,
    exporter: Arc<E>,
    config: OrchestratorConfig,
    state: InteractionState,
    draft: UserInput,
    display_name: Option<String>,
    generation: Option<PendingGeneration>,
    export_control: ExportControl,
    export: Option<InFlight<bool>>,
    tx: mpsc::Sender<ExhibitMessage>,
}

impl<G, E> Orchestrator<G, E>
where
    G: GenerationClient + 'static,
    E: Exporter + 'static,
{
    /// Create an Orchestrator in the Idle state with an empty draft
    pub fn new(
        generator: G,
        exporter: E,
        config: OrchestratorConfig,
        tx: mpsc::Sender<ExhibitMessage>,
    ) -> Self {
        Self {
            generator: Arc::new(generator),
            exporter: Arc::new(exporter),
            config,
            state: InteractionState::Idle,
            draft: UserInput::default(),
            display_name: None,
            generation: None,
            export_control: ExportControl::default(),
            export: None,
            tx,
        }
    }

    /// Current interaction state
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Current input draft
    pub fn draft(&self) -> &UserInput {
        &self.draft
    }

    /// Name shown on the displayed signboard
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Export control label state
    pub fn export_control(&self) -> ExportControl {
        self.export_control
    }

    /// Generation client in use
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Check the generation service and tell the surface if it looks down
    pub async fn start(&mut self) {
        tracing::info!("Orchestrator starting");
        if self.generator.health_check().await {
            tracing::info!("Generation service reachable");
        } else {
            tracing::warn!("Generation service health check failed");
            self.send(ExhibitMessage::Notify {
                level: NotifyLevel::Warning,
                message: labels::BACKEND_UNREACHABLE.to_string(),
            })
            .await;
        }
        self.send_export_label().await;
    }

    /// Replace one field of the draft
    ///
    /// # Errors
    ///
    /// Rejected while loading, while a signboard is displayed, or when the
    /// value is longer than the configured limit.
    pub async fn set_field(
        &mut self,
        field: InputField,
        value: String,
    ) -> Result<(), TransitionError> {
        match self.state {
            InteractionState::Loading(_) => return Err(TransitionError::Busy),
            InteractionState::Result(_) => return Err(TransitionError::NotEditable),
            InteractionState::Idle | InteractionState::Failed(_) => {}
        }
        if value.chars().count() > self.config.max_field_chars {
            return Err(TransitionError::FieldTooLong {
                field,
                max: self.config.max_field_chars,
            });
        }

        self.draft.set(field, value);
        self.send(ExhibitMessage::DraftChanged {
            draft: self.draft.clone(),
        })
        .await;
        Ok(())
    }

    /// Submit the draft for generation
    ///
    /// On success the state is Loading, any previous failure message is
    /// gone and the generation client has been invoked in the background.
    ///
    /// # Errors
    ///
    /// Rejected while loading, while a signboard is displayed, and when a
    /// field is empty after trimming or too long. Rejection never reaches the
    /// generation client.
    pub async fn submit(&mut self) -> Result<(), TransitionError> {
        match self.state {
            InteractionState::Loading(_) => return Err(TransitionError::Busy),
            InteractionState::Result(_) => return Err(TransitionError::NotEditable),
            InteractionState::Idle | InteractionState::Failed(_) => {}
        }

        let input = self.draft.trimmed();
        if let Some(field) = input.first_missing() {
            return Err(TransitionError::MissingField(field));
        }
        let max = self.config.max_field_chars;
        if let Some(field) = InputField::ALL
            .into_iter()
            .find(|f| input.field(*f).chars().count() > max)
        {
            return Err(TransitionError::FieldTooLong { field, max });
        }

        let display_name = input.name.clone();
        let generator = Arc::clone(&self.generator);
        let timeout = self.config.generation_timeout;
        let task = InFlight::spawn(async move {
            match tokio::time::timeout(timeout, generator.generate(input)).await {
                Ok(result) => result,
                Err(_) => Err(GenerationError::Timeout(timeout)),
            }
        });

        let rotation = StatusRotation::start(Instant::now());
        let status = rotation.message().to_string();
        self.display_name = None;
        self.generation = Some(PendingGeneration { task, display_name });
        self.state = InteractionState::Loading(rotation);

        tracing::info!(timeout_secs = timeout.as_secs(), "Generation started");
        self.send(ExhibitMessage::LoadingStarted { status }).await;
        Ok(())
    }

    /// Settle finished background work and advance the loading status
    ///
    /// Returns `true` if anything changed.
    pub async fn poll(&mut self, now: Instant) -> bool {
        let mut changed = self.settle_generation().await;

        if let InteractionState::Loading(rotation) = &mut self.state {
            if rotation.poll(now) {
                let index = rotation.index();
                let status = rotation.message().to_string();
                tracing::debug!(index, "Status rotated");
                self.send(ExhibitMessage::StatusRotated { index, status })
                    .await;
                changed = true;
            }
        }

        changed |= self.settle_export().await;
        changed
    }

    /// Discard the displayed signboard and return to the form
    ///
    /// The draft is kept so the user can tweak it and resubmit.
    ///
    /// # Errors
    ///
    /// Rejected when no signboard is displayed or an export of it is still
    /// running.
    pub async fn make_another(&mut self) -> Result<(), TransitionError> {
        if !matches!(self.state, InteractionState::Result(_)) {
            return Err(TransitionError::NoResult);
        }
        if self.export_control.is_busy() {
            return Err(TransitionError::ExportInProgress);
        }

        self.state = InteractionState::Idle;
        self.display_name = None;
        tracing::info!("Result cleared");
        self.send(ExhibitMessage::ResultCleared).await;
        Ok(())
    }

    /// Export the signboard the surface is currently showing
    ///
    /// `subtree` is the rendered output itself, not something rebuilt from
    /// state. The control's label switches to the busy label until the
    /// export settles in [`poll`](Self::poll).
    ///
    /// # Errors
    ///
    /// Rejected when no signboard is displayed or an export is running.
    pub async fn request_export(&mut self, subtree: E::Subtree) -> Result<(), TransitionError> {
        if !matches!(self.state, InteractionState::Result(_)) {
            return Err(TransitionError::NoResult);
        }
        if self.export_control.is_busy() {
            return Err(TransitionError::ExportInProgress);
        }

        let file_name = suggested_file_name(Utc::now());
        let exporter = Arc::clone(&self.exporter);
        let timeout = self.config.export_timeout;
        tracing::info!(file_name = %file_name, "Export started");

        self.export = Some(InFlight::spawn(async move {
            tokio::time::timeout(timeout, exporter.export_as_image(subtree, file_name))
                .await
                .unwrap_or_else(|_| {
                    tracing::warn!(timeout_secs = timeout.as_secs(), "Export timed out");
                    false
                })
        }));
        self.export_control = ExportControl::Exporting;
        self.send_export_label().await;
        Ok(())
    }

    /// Abandon background work and tell the surface to quit
    pub async fn shutdown(&mut self) {
        tracing::info!(state = self.state.name(), "Orchestrator shutting down");
        self.generation = None;
        self.export = None;
        self.send(ExhibitMessage::Quit).await;
    }

    async fn settle_generation(&mut self) -> bool {
        let Some(pending) = self.generation.as_mut() else {
            return false;
        };
        let outcome = match pending.task.try_settle() {
            Settle::Pending => return false,
            Settle::Done(result) => result,
            Settle::Lost => Err(GenerationError::Transport(
                "generation task ended without a result".to_string(),
            )),
        };
        let display_name = std::mem::take(&mut pending.display_name);
        self.generation = None;

        match outcome {
            Ok(exhibit) => {
                tracing::info!(
                    classification = %exhibit.classification,
                    "Generation succeeded"
                );
                self.display_name = Some(display_name.clone());
                self.state = InteractionState::Result(exhibit.clone());
                self.send(ExhibitMessage::ExhibitReady {
                    exhibit,
                    display_name,
                })
                .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Generation failed");
                self.state = InteractionState::Failed(labels::GENERATION_FAILED.to_string());
                self.send(ExhibitMessage::GenerationFailed {
                    message: labels::GENERATION_FAILED.to_string(),
                })
                .await;
            }
        }
        true
    }

    async fn settle_export(&mut self) -> bool {
        let Some(task) = self.export.as_mut() else {
            return false;
        };
        let saved = match task.try_settle() {
            Settle::Pending => return false,
            Settle::Done(saved) => saved,
            Settle::Lost => false,
        };
        self.export = None;
        self.export_control = ExportControl::Idle;
        self.send_export_label().await;

        if saved {
            tracing::info!("Export finished");
        } else {
            tracing::warn!("Export failed");
            self.send(ExhibitMessage::Alert {
                message: labels::EXPORT_FAILED.to_string(),
            })
            .await;
        }
        true
    }

    async fn send_export_label(&self) {
        self.send(ExhibitMessage::ExportLabel {
            label: self.export_control.label().to_string(),
            in_progress: self.export_control.is_busy(),
        })
        .await;
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: ExhibitMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}
