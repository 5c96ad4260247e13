//! Custom Widgets

pub mod text_block;

pub use text_block::{wrap_preserving_breaks, TextBlock};
