//! Export boundary
//!
//! The core never rasterizes anything itself. Surfaces provide an
//! [`Exporter`] whose `Subtree` is whatever they have on screen (a terminal
//! buffer, a DOM node, ...). The orchestrator only sequences the call and
//! drives the export control's label through [`ExportControl`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::labels;

/// Serializes a rendered subtree into an image file
#[async_trait]
pub trait Exporter: Send + Sync {
    /// The rendered output handed over by the surface
    type Subtree: Send + 'static;

    /// Rasterize `root` and save it as `file_name`
    ///
    /// Returns `false` when the image could not be produced or saved.
    /// Implementations report failure through the return value, not panics.
    async fn export_as_image(&self, root: Self::Subtree, file_name: String) -> bool;
}

/// Label state of the export control
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportControl {
    /// Ready to export
    #[default]
    Idle,
    /// An export is in flight
    Exporting,
}

impl ExportControl {
    /// Label to render for this state
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => labels::EXPORT_IDLE_LABEL,
            Self::Exporting => labels::EXPORT_BUSY_LABEL,
        }
    }

    /// Whether an export is in flight
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Exporting)
    }
}

/// File name offered for a new export: `zoo_exhibit_<unix millis>.png`
#[must_use]
pub fn suggested_file_name(now: DateTime<Utc>) -> String {
    format!("zoo_exhibit_{}.png", now.timestamp_millis())
}
