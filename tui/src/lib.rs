//! Zoo Exhibit TUI - Terminal interface for the signboard creator
//!
//! A full-screen form that turns a visitor's name, hobby and worry into a
//! zoo exhibit signboard, then saves the signboard as a PNG.
//!
//! # Architecture
//!
//! - **App**: event loop and layer rendering
//! - **ExhibitClient**: the embedded orchestrator and its message channel
//! - **Display**: display state derived from orchestrator messages
//! - **Compositor**: layered rendering with z-ordering for the alert popup
//! - **Signboard**: the signboard view and its animated stat gauges
//! - **Export**: signboard buffer to SVG to PNG

pub mod app;
pub mod compositor;
pub mod display;
pub mod exhibit_client;
pub mod export;
pub mod form;
pub mod signboard;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use exhibit_client::ExhibitClient;
pub use export::ImageExporter;
