//! Theme and Colors
//!
//! The zoo signboard palette: a varnished wooden frame, a leafy green header
//! band and cream-colored panels with dark ink.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Signboard Palette
// ============================================================================

/// Frame wood
pub const WOOD: Color = Color::Rgb(139, 94, 52);

/// Darker grain for frame corners and edges
pub const WOOD_DARK: Color = Color::Rgb(94, 60, 30);

/// Header band
pub const LEAF_GREEN: Color = Color::Rgb(46, 125, 50);

/// Highlight on the header band
pub const LEAF_LIGHT: Color = Color::Rgb(200, 230, 201);

/// Signboard panel
pub const SIGN_CREAM: Color = Color::Rgb(255, 248, 225);

/// Commentary box
pub const PAPER: Color = Color::Rgb(255, 253, 245);

/// Main text on panels
pub const INK: Color = Color::Rgb(62, 39, 35);

/// Secondary text on panels
pub const INK_SOFT: Color = Color::Rgb(121, 85, 72);

/// Danger level badge
pub const DANGER_RED: Color = Color::Rgb(198, 40, 40);

/// Fun fact box
pub const FACT_YELLOW: Color = Color::Rgb(255, 236, 179);

/// Empty part of a stat bar
pub const BAR_TRACK: Color = Color::Rgb(215, 204, 200);

/// Fill colors for the four stats, in display order
pub const STAT_FILLS: [Color; 4] = [
    Color::Rgb(239, 83, 80),  // stamina
    Color::Rgb(66, 165, 245), // intelligence
    Color::Rgb(171, 71, 188), // laziness
    Color::Rgb(255, 167, 38), // charm
];

// ============================================================================
// UI Colors
// ============================================================================

/// Title and accents
pub const ACCENT: Color = Color::Rgb(255, 183, 77);

/// Focused input border
pub const FOCUS: Color = Color::Rgb(129, 199, 132);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(110, 110, 110);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 90, 90);

/// Warning amber
pub const WARNING_AMBER: Color = Color::Rgb(255, 193, 7);

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Text on the signboard panel
pub fn panel(fg: Color) -> Style {
    Style::default().fg(fg).bg(SIGN_CREAM)
}

/// Bold variant of [`panel`]
pub fn panel_bold(fg: Color) -> Style {
    panel(fg).add_modifier(Modifier::BOLD)
}
