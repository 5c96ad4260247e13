//! Signboard View
//!
//! Draws the exhibit signboard: wooden frame, green header band with the
//! classification and danger level, the exhibit's name and scientific name,
//! the keeper's commentary, four animated stat bars and the fun fact.
//!
//! A [`SignboardView`] is mounted when a result arrives and dropped when it
//! is cleared. Its [`StatGauge`]s carry their own mount instant, so a gauge
//! that no longer exists can never be advanced.

use std::time::Instant;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use unicode_width::UnicodeWidthStr;

use exhibit_core::labels;
use exhibit_core::{ExhibitData, StatAnimation, StatKind};

use crate::theme;
use crate::widgets::wrap_preserving_breaks;

/// Narrowest width the signboard is laid out for
pub const MIN_WIDTH: u16 = 32;

/// Preferred width on wide terminals
pub const MAX_WIDTH: u16 = 76;

/// Frame thickness (columns on each side)
const FRAME_X: u16 = 2;

/// Partial block glyphs for sub-cell bar precision, by eighths
const EIGHTHS: [&str; 8] = ["", "▏", "▎", "▍", "▌", "▋", "▊", "▉"];

// ============================================================================
// Stat Gauge
// ============================================================================

/// One animated percentage bar
#[derive(Clone, Debug)]
pub struct StatGauge {
    kind: StatKind,
    animation: StatAnimation,
    mounted_at: Instant,
}

impl StatGauge {
    /// Mount a gauge for `target` percent at `now`; it shows 0 until the
    /// fill delay has passed
    pub fn mount(kind: StatKind, target: u8, now: Instant) -> Self {
        Self {
            kind,
            animation: StatAnimation::new(target),
            mounted_at: now,
        }
    }

    /// Which stat this gauge shows
    pub fn kind(&self) -> StatKind {
        self.kind
    }

    /// Target percentage
    pub fn target(&self) -> u8 {
        self.animation.target()
    }

    /// Displayed percentage at `now`
    pub fn value_at(&self, now: Instant) -> f32 {
        self.animation
            .value_at(now.saturating_duration_since(self.mounted_at))
    }

    /// Whether the fill has finished
    pub fn is_settled(&self, now: Instant) -> bool {
        self.animation
            .is_finished(now.saturating_duration_since(self.mounted_at))
    }
}

// ============================================================================
// Signboard View
// ============================================================================

/// The mounted signboard
#[derive(Clone, Debug)]
pub struct SignboardView {
    exhibit: ExhibitData,
    display_name: String,
    gauges: Vec<StatGauge>,
}

/// Row positions for one width
struct Layout {
    inner_x: u16,
    inner_w: u16,
    commentary: Vec<String>,
    fact: Vec<String>,
    commentary_y: u16,
    stats_y: u16,
    fact_y: u16,
    height: u16,
}

impl SignboardView {
    /// Mount a signboard for `exhibit` at `now`
    pub fn mount(exhibit: ExhibitData, display_name: String, now: Instant) -> Self {
        let gauges = exhibit
            .stats
            .iter()
            .map(|(kind, value)| StatGauge::mount(kind, value, now))
            .collect();
        Self {
            exhibit,
            display_name,
            gauges,
        }
    }

    /// Content being shown
    pub fn exhibit(&self) -> &ExhibitData {
        &self.exhibit
    }

    /// Headline name
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The four stat gauges in display order
    pub fn gauges(&self) -> &[StatGauge] {
        &self.gauges
    }

    /// Whether any bar is still filling
    pub fn is_animating(&self, now: Instant) -> bool {
        self.gauges.iter().any(|g| !g.is_settled(now))
    }

    /// Width to use on a terminal `available` columns wide
    pub fn width_for(available: u16) -> u16 {
        available.clamp(MIN_WIDTH, MAX_WIDTH)
    }

    /// Rows needed at `width`
    pub fn height(&self, width: u16) -> u16 {
        self.layout(width).height
    }

    fn layout(&self, width: u16) -> Layout {
        let inner_x = FRAME_X + 1;
        let inner_w = width.saturating_sub(2 * inner_x).max(1);
        let commentary = wrap_preserving_breaks(&self.exhibit.description, inner_w.saturating_sub(2));
        let fact = wrap_preserving_breaks(&self.exhibit.fun_fact, inner_w.saturating_sub(2));

        // frame(1) + header band(3) + blank + name + scientific + blank + caption
        let commentary_y = 9;
        let stats_y = commentary_y + rows(&commentary) + 2;
        // two grid rows of label + bar, one blank between
        let fact_y = stats_y + 5 + 1;
        // fact caption + fact lines + blank + frame(1)
        let height = fact_y + 1 + rows(&fact) + 2;

        Layout {
            inner_x,
            inner_w,
            commentary,
            fact,
            commentary_y,
            stats_y,
            fact_y,
            height,
        }
    }

    /// Draw into `buf`, whose area must start at the origin
    pub fn render(&self, buf: &mut Buffer, now: Instant) {
        let area = buf.area;
        if area.width < MIN_WIDTH || area.height == 0 {
            return;
        }
        let l = self.layout(area.width);
        let mut p = Painter { buf, area };

        // Frame and panel
        p.fill(area, Style::default().bg(theme::WOOD));
        p.fill(
            Rect::new(FRAME_X, 1, area.width - 2 * FRAME_X, area.height.saturating_sub(2)),
            Style::default().bg(theme::SIGN_CREAM),
        );
        for (x, y) in [
            (0, 0),
            (area.width - 1, 0),
            (0, area.height - 1),
            (area.width - 1, area.height - 1),
        ] {
            p.buf
                .set_string(x, y, "●", Style::default().fg(theme::WOOD_DARK).bg(theme::WOOD));
        }

        // Header band
        let band = Style::default().bg(theme::LEAF_GREEN);
        p.fill(Rect::new(FRAME_X, 1, area.width - 2 * FRAME_X, 3), band);
        p.text(
            l.inner_x,
            2,
            &self.exhibit.classification,
            band.fg(theme::LEAF_LIGHT).add_modifier(Modifier::BOLD),
        );
        let danger = format!(" {}{} ", labels::DANGER_PREFIX, self.exhibit.danger_level);
        let danger_w = width_u16(&danger);
        p.text(
            (l.inner_x + l.inner_w).saturating_sub(danger_w),
            2,
            &danger,
            Style::default()
                .fg(theme::SIGN_CREAM)
                .bg(theme::DANGER_RED)
                .add_modifier(Modifier::BOLD),
        );

        // Name block
        p.centered(l.inner_x, 5, l.inner_w, &self.display_name, theme::panel_bold(theme::INK));
        p.centered(
            l.inner_x,
            6,
            l.inner_w,
            &self.exhibit.scientific_name,
            theme::panel(theme::INK_SOFT).add_modifier(Modifier::ITALIC),
        );

        // Commentary
        p.text(
            l.inner_x,
            l.commentary_y - 1,
            labels::KEEPER_COMMENTARY,
            theme::panel_bold(theme::LEAF_GREEN),
        );
        let paper = Style::default().fg(theme::INK).bg(theme::PAPER);
        p.fill(
            Rect::new(l.inner_x, l.commentary_y, l.inner_w, rows(&l.commentary)),
            paper,
        );
        for (i, line) in l.commentary.iter().enumerate() {
            p.text(l.inner_x + 1, l.commentary_y + i as u16, line, paper);
        }

        // Stats, two per grid row
        let col_w = l.inner_w.saturating_sub(2) / 2;
        for (i, gauge) in self.gauges.iter().enumerate() {
            let i = i as u16;
            let x = l.inner_x + (i % 2) * (col_w + 2);
            let y = l.stats_y + (i / 2) * 3;
            let fill = theme::STAT_FILLS[usize::from(i) % theme::STAT_FILLS.len()];
            self.render_gauge(&mut p, gauge, x, y, col_w, fill, now);
        }

        // Fun fact
        let fact_style = Style::default().fg(theme::INK).bg(theme::FACT_YELLOW);
        p.fill(
            Rect::new(l.inner_x, l.fact_y, l.inner_w, rows(&l.fact) + 1),
            fact_style,
        );
        p.text(
            l.inner_x + 1,
            l.fact_y,
            labels::FUN_FACT,
            fact_style.add_modifier(Modifier::BOLD),
        );
        for (i, line) in l.fact.iter().enumerate() {
            p.text(l.inner_x + 1, l.fact_y + 1 + i as u16, line, fact_style);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_gauge(
        &self,
        p: &mut Painter<'_>,
        gauge: &StatGauge,
        x: u16,
        y: u16,
        width: u16,
        fill: ratatui::style::Color,
        now: Instant,
    ) {
        let value = format!("{}%", gauge.target());
        p.text(x, y, gauge.kind().label(), theme::panel_bold(theme::INK));
        p.text(
            (x + width).saturating_sub(width_u16(&value)),
            y,
            &value,
            theme::panel_bold(fill),
        );

        let track = Style::default().fg(fill).bg(theme::BAR_TRACK);
        p.fill(Rect::new(x, y + 1, width, 1), track);
        p.text(x, y + 1, &bar_glyphs(gauge.value_at(now), width), track);
    }
}

/// Bar glyphs for `percent` of `width` cells, at eighth-cell precision
pub fn bar_glyphs(percent: f32, width: u16) -> String {
    let eighths = (percent.clamp(0.0, 100.0) / 100.0 * f32::from(width) * 8.0).floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let eighths = eighths as usize;
    let mut bar = "█".repeat(eighths / 8);
    bar.push_str(EIGHTHS[eighths % 8]);
    bar
}

fn rows(lines: &[String]) -> u16 {
    u16::try_from(lines.len()).unwrap_or(u16::MAX)
}

fn width_u16(s: &str) -> u16 {
    u16::try_from(s.width()).unwrap_or(u16::MAX)
}

/// Bounds-checked drawing onto a buffer at the origin
struct Painter<'a> {
    buf: &'a mut Buffer,
    area: Rect,
}

impl Painter<'_> {
    fn fill(&mut self, rect: Rect, style: Style) {
        let rect = rect.intersection(self.area);
        if !rect.is_empty() {
            self.buf.set_style(rect, style);
        }
    }

    /// Text clipped at the inner edge of the right frame
    fn text(&mut self, x: u16, y: u16, s: &str, style: Style) {
        let max = self.area.width.saturating_sub(FRAME_X).saturating_sub(x);
        if y >= self.area.height || max == 0 {
            return;
        }
        self.buf.set_stringn(x, y, s, usize::from(max), style);
    }

    fn centered(&mut self, x: u16, y: u16, width: u16, s: &str, style: Style) {
        let offset = width.saturating_sub(width_u16(s)) / 2;
        self.text(x + offset, y, s, style);
    }
}
