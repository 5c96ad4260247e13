//! Exhibit Client
//!
//! Thin wrapper around the [`Orchestrator`] for TUI integration. The
//! orchestrator is embedded directly; this client owns the receiving end of
//! its message channel and forwards user intents to it.

use tokio::sync::mpsc;
use tokio::time::Instant;

use exhibit_core::{
    ExhibitMessage, Exporter, GenerationClient, InputField, InteractionState, Orchestrator,
    OrchestratorConfig, TransitionError, UserInput,
};

/// Channel depth between orchestrator and display
const CHANNEL_CAPACITY: usize = 100;

/// Client for communicating with the embedded orchestrator
pub struct ExhibitClient<G: GenerationClient, E: Exporter> {
    orchestrator: Orchestrator<G, E>,
    rx: mpsc::Receiver<ExhibitMessage>,
}

impl<G, E> ExhibitClient<G, E>
where
    G: GenerationClient + 'static,
    E: Exporter + 'static,
{
    /// Create a client around a fresh orchestrator
    pub fn new(generator: G, exporter: E, config: OrchestratorConfig) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let orchestrator = Orchestrator::new(generator, exporter, config, tx);
        Self { orchestrator, rx }
    }

    /// Run the startup health check
    pub async fn start(&mut self) {
        self.orchestrator.start().await;
    }

    /// Replace one field of the draft
    pub async fn set_field(
        &mut self,
        field: InputField,
        value: String,
    ) -> Result<(), TransitionError> {
        self.orchestrator.set_field(field, value).await
    }

    /// Submit the draft for generation
    pub async fn submit(&mut self) -> Result<(), TransitionError> {
        self.orchestrator.submit().await
    }

    /// Discard the signboard and return to the form
    pub async fn make_another(&mut self) -> Result<(), TransitionError> {
        self.orchestrator.make_another().await
    }

    /// Export the rendered signboard
    pub async fn request_export(&mut self, subtree: E::Subtree) -> Result<(), TransitionError> {
        self.orchestrator.request_export(subtree).await
    }

    /// Abandon background work and announce the quit
    pub async fn shutdown(&mut self) {
        self.orchestrator.shutdown().await;
    }

    /// Settle background work (must be called every frame)
    pub async fn poll(&mut self, now: Instant) -> bool {
        self.orchestrator.poll(now).await
    }

    /// Receive all pending messages (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ExhibitMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Current interaction state
    pub fn state(&self) -> &InteractionState {
        self.orchestrator.state()
    }

    /// Authoritative draft, ahead of any unread `DraftChanged`
    pub fn draft(&self) -> &UserInput {
        self.orchestrator.draft()
    }
}
