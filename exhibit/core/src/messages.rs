//! Orchestrator Messages
//!
//! Messages sent from the [`Orchestrator`](crate::Orchestrator) to the UI
//! surface. Surfaces build their display state from these alone; they never
//! read or write orchestration state directly.

use serde::{Deserialize, Serialize};

use crate::model::{ExhibitData, UserInput};

/// Messages from Orchestrator to UI surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExhibitMessage {
    /// The input draft changed
    DraftChanged {
        /// Full draft after the edit
        draft: UserInput,
    },

    /// A generation request is in flight
    LoadingStarted {
        /// First status message to show
        status: String,
    },

    /// The loading status advanced
    StatusRotated {
        /// Position in the fixed message list
        index: usize,
        /// Message to show
        status: String,
    },

    /// Generation succeeded
    ExhibitReady {
        /// Validated signboard content
        exhibit: ExhibitData,
        /// Name shown as the signboard headline
        display_name: String,
    },

    /// Generation failed; the form is editable again
    GenerationFailed {
        /// Fixed user-facing message
        message: String,
    },

    /// "Make another": the result was discarded, back to the form
    ResultCleared,

    /// The export control's label changed
    ExportLabel {
        /// Label to render
        label: String,
        /// Whether an export is in flight
        in_progress: bool,
    },

    /// One-shot alert the user must acknowledge
    Alert {
        /// Alert text
        message: String,
    },

    /// Non-blocking notification (status line)
    Notify {
        /// Severity
        level: NotifyLevel,
        /// Notification text
        message: String,
    },

    /// The orchestrator is shutting down
    Quit,
}

/// Notification severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Something degraded but usable
    Warning,
    /// Something failed
    Error,
}
