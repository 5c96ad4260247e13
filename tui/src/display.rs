//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from [`ExhibitMessage`]s and used for rendering.
//!
//! The TUI is a thin client: it renders what the orchestrator tells it to
//! and never decides a transition on its own.

use std::time::{Duration, Instant};

use exhibit_core::labels;
use exhibit_core::{ExhibitMessage, NotifyLevel, UserInput};

use crate::signboard::SignboardView;

/// How long a status line notification stays up
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Loading spinner frames
pub const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Time each spinner frame is shown
const SPINNER_FRAME_TIME: Duration = Duration::from_millis(150);

/// Which screen is showing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The input form (idle or after a failure)
    Form,
    /// Waiting for the generator
    Loading,
    /// The signboard is mounted
    Signboard,
}

/// A notification on the status line
#[derive(Clone, Debug)]
pub struct DisplayNotification {
    /// Notification level
    pub level: NotifyLevel,
    /// Message content
    pub message: String,
    /// Time left before it is cleared
    pub remaining: Duration,
}

/// The full display state for the TUI
#[derive(Debug)]
pub struct DisplayState {
    /// Current screen
    pub phase: Phase,
    /// Form contents as last reported
    pub draft: UserInput,
    /// Rotating loading message
    pub status: Option<String>,
    /// Failure banner shown above the form
    pub error: Option<String>,
    /// Mounted signboard, present only in [`Phase::Signboard`]
    pub signboard: Option<SignboardView>,
    /// Export control label
    pub export_label: String,
    /// Whether an export is in flight
    pub export_in_progress: bool,
    /// Modal alert waiting for acknowledgement
    pub alert: Option<String>,
    /// Pending notification (if any)
    pub notification: Option<DisplayNotification>,
    /// The orchestrator has shut down
    pub quitting: bool,
    /// Time spent loading, drives the spinner
    spinner_elapsed: Duration,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            phase: Phase::Form,
            draft: UserInput::default(),
            status: None,
            error: None,
            signboard: None,
            export_label: labels::EXPORT_IDLE_LABEL.to_string(),
            export_in_progress: false,
            alert: None,
            notification: None,
            quitting: false,
            spinner_elapsed: Duration::ZERO,
        }
    }
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a message received now
    pub fn apply_message(&mut self, msg: ExhibitMessage) {
        self.apply_message_at(msg, Instant::now());
    }

    /// Apply a message; `now` is the mount instant for a new signboard
    pub fn apply_message_at(&mut self, msg: ExhibitMessage, now: Instant) {
        match msg {
            ExhibitMessage::DraftChanged { draft } => {
                self.draft = draft;
            }
            ExhibitMessage::LoadingStarted { status } => {
                self.phase = Phase::Loading;
                self.status = Some(status);
                self.error = None;
                self.spinner_elapsed = Duration::ZERO;
            }
            ExhibitMessage::StatusRotated { status, .. } => {
                if self.phase == Phase::Loading {
                    self.status = Some(status);
                }
            }
            ExhibitMessage::ExhibitReady {
                exhibit,
                display_name,
            } => {
                self.phase = Phase::Signboard;
                self.status = None;
                self.error = None;
                self.signboard = Some(SignboardView::mount(exhibit, display_name, now));
            }
            ExhibitMessage::GenerationFailed { message } => {
                self.phase = Phase::Form;
                self.status = None;
                self.error = Some(message);
            }
            ExhibitMessage::ResultCleared => {
                self.phase = Phase::Form;
                // Unmounting drops the gauges with it
                self.signboard = None;
            }
            ExhibitMessage::ExportLabel { label, in_progress } => {
                self.export_label = label;
                self.export_in_progress = in_progress;
            }
            ExhibitMessage::Alert { message } => {
                self.alert = Some(message);
            }
            ExhibitMessage::Notify { level, message } => {
                self.notification = Some(DisplayNotification {
                    level,
                    message,
                    remaining: NOTIFICATION_TTL,
                });
            }
            ExhibitMessage::Quit => {
                self.quitting = true;
            }
        }
    }

    /// Update timers
    pub fn update(&mut self, delta: Duration) {
        if self.phase == Phase::Loading {
            self.spinner_elapsed += delta;
        }
        if let Some(n) = &mut self.notification {
            n.remaining = n.remaining.saturating_sub(delta);
            if n.remaining.is_zero() {
                self.notification = None;
            }
        }
    }

    /// Current spinner frame
    pub fn spinner(&self) -> &'static str {
        let step = self.spinner_elapsed.as_millis() / SPINNER_FRAME_TIME.as_millis();
        let idx = usize::try_from(step).unwrap_or(0) % SPINNER_FRAMES.len();
        SPINNER_FRAMES[idx]
    }

    /// Acknowledge the alert
    pub fn dismiss_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }

    /// Clear the notification
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }

    /// Whether something on screen is moving and needs frames
    pub fn is_animating(&self, now: Instant) -> bool {
        self.phase == Phase::Loading
            || self.export_in_progress
            || self.notification.is_some()
            || self
                .signboard
                .as_ref()
                .is_some_and(|view| view.is_animating(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exhibit_core::{ExhibitData, ExhibitStats};
    use pretty_assertions::assert_eq;

    fn exhibit() -> ExhibitData {
        ExhibitData {
            classification: "夜行性哺乳類".to_string(),
            danger_level: "★☆☆☆☆".to_string(),
            scientific_name: "Homo ludens".to_string(),
            description: "よく遊ぶ。".to_string(),
            stats: ExhibitStats {
                stamina: 10,
                intelligence: 20,
                laziness: 90,
                charm: 70,
            },
            fun_fact: "ゲームが得意。".to_string(),
        }
    }

    fn ready() -> ExhibitMessage {
        ExhibitMessage::ExhibitReady {
            exhibit: exhibit(),
            display_name: "ハナコ".to_string(),
        }
    }

    #[test]
    fn test_default_is_form_with_idle_label() {
        let state = DisplayState::new();
        assert_eq!(state.phase, Phase::Form);
        assert_eq!(state.export_label, labels::EXPORT_IDLE_LABEL);
        assert!(state.signboard.is_none());
        assert!(!state.quitting);
    }

    #[test]
    fn test_loading_then_rotation() {
        let mut state = DisplayState::new();
        state.apply_message(ExhibitMessage::LoadingStarted {
            status: labels::LOADING_MESSAGES[0].to_string(),
        });
        assert_eq!(state.phase, Phase::Loading);

        state.apply_message(ExhibitMessage::StatusRotated {
            index: 1,
            status: labels::LOADING_MESSAGES[1].to_string(),
        });
        assert_eq!(state.status.as_deref(), Some(labels::LOADING_MESSAGES[1]));
    }

    #[test]
    fn test_late_rotation_after_result_ignored() {
        let mut state = DisplayState::new();
        state.apply_message(ExhibitMessage::LoadingStarted {
            status: "a".to_string(),
        });
        state.apply_message(ready());
        state.apply_message(ExhibitMessage::StatusRotated {
            index: 1,
            status: "b".to_string(),
        });

        assert_eq!(state.phase, Phase::Signboard);
        assert_eq!(state.status, None);
    }

    #[test]
    fn test_failure_returns_to_form_with_error() {
        let mut state = DisplayState::new();
        state.apply_message(ExhibitMessage::LoadingStarted {
            status: "a".to_string(),
        });
        state.apply_message(ExhibitMessage::GenerationFailed {
            message: labels::GENERATION_FAILED.to_string(),
        });

        assert_eq!(state.phase, Phase::Form);
        assert_eq!(state.error.as_deref(), Some(labels::GENERATION_FAILED));
        assert_eq!(state.status, None);

        // A new attempt clears the old error
        state.apply_message(ExhibitMessage::LoadingStarted {
            status: "a".to_string(),
        });
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_ready_mounts_and_clear_unmounts() {
        let t0 = Instant::now();
        let mut state = DisplayState::new();
        state.apply_message_at(ready(), t0);

        let view = state.signboard.as_ref().unwrap();
        assert_eq!(view.display_name(), "ハナコ");
        assert_eq!(view.gauges()[0].value_at(t0), 0.0);
        assert!(state.is_animating(t0));

        state.apply_message(ExhibitMessage::ResultCleared);
        assert_eq!(state.phase, Phase::Form);
        assert!(state.signboard.is_none());
        assert!(!state.is_animating(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn test_export_label_and_alert() {
        let mut state = DisplayState::new();
        state.apply_message(ExhibitMessage::ExportLabel {
            label: labels::EXPORT_BUSY_LABEL.to_string(),
            in_progress: true,
        });
        assert!(state.export_in_progress);
        assert_eq!(state.export_label, labels::EXPORT_BUSY_LABEL);

        state.apply_message(ExhibitMessage::ExportLabel {
            label: labels::EXPORT_IDLE_LABEL.to_string(),
            in_progress: false,
        });
        state.apply_message(ExhibitMessage::Alert {
            message: labels::EXPORT_FAILED.to_string(),
        });
        assert_eq!(state.export_label, labels::EXPORT_IDLE_LABEL);
        assert_eq!(state.alert.as_deref(), Some(labels::EXPORT_FAILED));

        assert!(state.dismiss_alert());
        assert!(!state.dismiss_alert());
    }

    #[test]
    fn test_notification_expires() {
        let mut state = DisplayState::new();
        state.apply_message(ExhibitMessage::Notify {
            level: NotifyLevel::Warning,
            message: labels::BACKEND_UNREACHABLE.to_string(),
        });

        state.update(Duration::from_secs(2));
        assert!(state.notification.is_some());
        state.update(NOTIFICATION_TTL);
        assert!(state.notification.is_none());
    }

    #[test]
    fn test_spinner_advances_only_while_loading() {
        let mut state = DisplayState::new();
        state.update(Duration::from_secs(1));
        assert_eq!(state.spinner(), SPINNER_FRAMES[0]);

        state.apply_message(ExhibitMessage::LoadingStarted {
            status: "a".to_string(),
        });
        state.update(SPINNER_FRAME_TIME);
        assert_eq!(state.spinner(), SPINNER_FRAMES[1]);
        state.update(SPINNER_FRAME_TIME * 3);
        assert_eq!(state.spinner(), SPINNER_FRAMES[0]);
    }

    #[test]
    fn test_draft_and_quit() {
        let mut state = DisplayState::new();
        let draft = UserInput::new("a", "b", "c");
        state.apply_message(ExhibitMessage::DraftChanged {
            draft: draft.clone(),
        });
        state.apply_message(ExhibitMessage::Quit);

        assert_eq!(state.draft, draft);
        assert!(state.quitting);
    }
}
