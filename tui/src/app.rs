//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize)
//! - ExhibitClient for orchestration
//! - DisplayState for rendering
//!
//! The App:
//! 1. Turns key presses into orchestrator operations
//! 2. Polls the orchestrator every frame
//! 3. Applies its messages to DisplayState
//! 4. Renders DisplayState through the compositor

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Widget};
use ratatui::Terminal;
use tokio::time::MissedTickBehavior;
use unicode_width::UnicodeWidthStr;

use exhibit_core::labels;
use exhibit_core::{ExhibitMessage, Exporter, GenerationClient, NotifyLevel};

use crate::compositor::{Compositor, LayerId};
use crate::display::{DisplayState, Phase};
use crate::exhibit_client::ExhibitClient;
use crate::form::{render_form, FieldEdit, FormState};
use crate::signboard::SignboardView;
use crate::theme;
use crate::widgets::TextBlock;

/// Frame pacing for the loading status and stat bar animation
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Title block rows
const HEADER_HEIGHT: u16 = 3;

/// Widest the alert popup grows
const ALERT_MAX_WIDTH: u16 = 48;

const FORM_HINTS: &str = " Tab/↑↓ 項目移動 │ Enter 送信 │ Alt+Enter 改行 │ Esc 終了";
const LOADING_HINTS: &str = " 生成中… │ Esc 終了";
const SIGNBOARD_HINTS: &str = " s 保存 │ n 別の看板 │ Esc 終了";
const ALERT_DISMISS: &str = "何かキーを押して閉じる";

/// Main application state
pub struct App<G, E>
where
    G: GenerationClient,
    E: Exporter<Subtree = Buffer>,
{
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// Farewell to print after the terminal is restored
    farewell: Option<String>,

    // === Orchestrator Integration ===
    client: ExhibitClient<G, E>,
    display: DisplayState,
    form: FormState,

    // === UI Components ===
    compositor: Compositor,
    layers: AppLayers,

    /// Last frame time (for timers)
    last_frame: Instant,
}

/// Layer IDs for UI regions
struct AppLayers {
    header: LayerId,
    body: LayerId,
    signboard: LayerId,
    controls: LayerId,
    status: LayerId,
    alert: LayerId,
}

impl<G, E> App<G, E>
where
    G: GenerationClient + 'static,
    E: Exporter<Subtree = Buffer> + 'static,
{
    /// Create an App drawing into `area`
    pub fn new(client: ExhibitClient<G, E>, area: Rect) -> Self {
        let mut compositor = Compositor::new(area);

        let header = compositor.create_layer(Rect::new(0, 0, area.width, HEADER_HEIGHT), 0);
        let body = compositor.create_layer(Self::body_bounds(area), 0);
        let signboard = compositor.create_layer(Rect::new(0, 0, 1, 1), 10);
        let controls = compositor.create_layer(Rect::new(0, 0, area.width, 1), 10);
        let status = compositor.create_layer(
            Rect::new(0, area.height.saturating_sub(1), area.width, 1),
            20,
        );
        let alert = compositor.create_layer(Rect::new(0, 0, 1, 1), 100);

        compositor.set_visible(signboard, false);
        compositor.set_visible(controls, false);
        compositor.set_visible(alert, false);

        Self {
            running: true,
            farewell: None,
            client,
            display: DisplayState::new(),
            form: FormState::new(),
            compositor,
            layers: AppLayers {
                header,
                body,
                signboard,
                controls,
                status,
                alert,
            },
            last_frame: Instant::now(),
        }
    }

    fn body_bounds(area: Rect) -> Rect {
        Rect::new(
            0,
            HEADER_HEIGHT.min(area.height),
            area.width,
            area.height.saturating_sub(HEADER_HEIGHT + 1),
        )
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Render initial frame immediately so user sees UI
        self.render(terminal)?;
        self.client.start().await;

        while self.running {
            tokio::select! {
                biased;

                maybe_event = event_stream.next() => match maybe_event {
                    // Only handle Press events (not Release or Repeat)
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await;
                    }
                    Some(Ok(Event::Resize(w, h))) => self.handle_resize(w, h),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => {
                        tracing::info!("Terminal event stream closed");
                        self.quit().await;
                    }
                },

                _ = frames.tick() => {}
            }

            self.tick().await;
            self.render(terminal)?;
        }

        Ok(())
    }

    /// Settle background work, apply messages and advance timers
    pub async fn tick(&mut self) {
        self.client.poll(tokio::time::Instant::now()).await;
        self.process_messages();

        let now = Instant::now();
        self.display.update(now.saturating_duration_since(self.last_frame));
        self.last_frame = now;
    }

    /// Process all pending messages from the orchestrator
    fn process_messages(&mut self) {
        for msg in self.client.recv_all() {
            if matches!(msg, ExhibitMessage::Quit) {
                self.running = false;
            }
            self.display.apply_message(msg);
        }
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyEvent) {
        // An open alert swallows the key that closes it
        if self.display.dismiss_alert() {
            return;
        }

        match key.code {
            KeyCode::Esc => return self.quit().await,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.quit().await;
            }
            _ => {}
        }

        match self.display.phase {
            Phase::Form => self.handle_form_key(key).await,
            Phase::Loading => {}
            Phase::Signboard => self.handle_signboard_key(key).await,
        }
    }

    async fn handle_form_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(),
            KeyCode::Enter if alt => self.edit(FieldEdit::Newline).await,
            KeyCode::Char('j') if ctrl => self.edit(FieldEdit::Newline).await,
            KeyCode::Enter => match self.client.submit().await {
                Ok(()) => self.form.clear_hint(),
                Err(e) => {
                    tracing::debug!(error = %e, "Submit refused");
                    self.form.reject(&e);
                }
            },
            KeyCode::Backspace => self.edit(FieldEdit::Backspace).await,
            KeyCode::Char(c) if !ctrl && !alt => self.edit(FieldEdit::Insert(c)).await,
            _ => {}
        }
    }

    async fn edit(&mut self, edit: FieldEdit) {
        let field = self.form.focus();
        let Some(value) = self.form.apply_edit(self.client.draft(), edit) else {
            return;
        };
        match self.client.set_field(field, value).await {
            Ok(()) => self.form.clear_hint(),
            Err(e) => self.form.reject(&e),
        }
    }

    async fn handle_signboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('s') | KeyCode::Enter => self.export().await,
            KeyCode::Char('n') => match self.client.make_another().await {
                Ok(()) => self.form.clear_hint(),
                Err(e) => tracing::debug!(error = %e, "Make another refused"),
            },
            _ => {}
        }
    }

    /// Hand the signboard exactly as last rendered to the exporter
    async fn export(&mut self) {
        self.render_layers();
        let Some(buffer) = self
            .compositor
            .layer_buffer(self.layers.signboard)
            .filter(|_| self.compositor.is_visible(self.layers.signboard))
            .cloned()
        else {
            return;
        };
        if let Err(e) = self.client.request_export(buffer).await {
            tracing::debug!(error = %e, "Export refused");
        }
    }

    async fn quit(&mut self) {
        self.generate_farewell();
        self.client.shutdown().await;
        self.running = false;
    }

    /// Handle terminal resize
    fn handle_resize(&mut self, width: u16, height: u16) {
        self.compositor.resize(Rect::new(0, 0, width, height));
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render the UI
    fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        self.render_layers();

        terminal.draw(|frame| {
            let output = self.compositor.composite();
            let area = frame.area();
            let buf = frame.buffer_mut();

            for y in 0..area.height.min(output.area.height) {
                for x in 0..area.width.min(output.area.width) {
                    let idx = output.index_of(x, y);
                    if idx < output.content.len() {
                        buf[(x, y)] = output.content[idx].clone();
                    }
                }
            }
        })?;

        Ok(())
    }

    /// Redraw every layer from the display state
    pub fn render_layers(&mut self) {
        let area = self.compositor.area();
        let form_visible = self.display.phase != Phase::Signboard;

        self.compositor
            .set_bounds(self.layers.header, Rect::new(0, 0, area.width, HEADER_HEIGHT));
        self.compositor
            .set_bounds(self.layers.body, Self::body_bounds(area));
        self.compositor.set_bounds(
            self.layers.status,
            Rect::new(0, area.height.saturating_sub(1), area.width, 1),
        );
        self.compositor.set_visible(self.layers.header, form_visible);
        self.compositor.set_visible(self.layers.body, form_visible);

        self.render_header();
        self.render_body();
        self.render_signboard();
        self.render_status();
        self.render_alert();
    }

    fn render_header(&mut self) {
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.header) {
            buf.reset();
            let width = buf.area.width;
            for (y, text, style) in [
                (
                    0,
                    labels::TITLE,
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                ),
                (1, labels::SUBTITLE, Style::default().fg(theme::DIM_GRAY)),
            ] {
                if y < buf.area.height {
                    let x = width.saturating_sub(text_width(text)) / 2;
                    buf.set_stringn(x, y, text, usize::from(width - x), style);
                }
            }
        }
    }

    fn render_body(&mut self) {
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.body) {
            buf.reset();
            render_form(buf, &self.display, &self.form);
        }
    }

    fn render_signboard(&mut self) {
        let area = self.compositor.area();
        let Some(view) = &self.display.signboard else {
            self.compositor.set_visible(self.layers.signboard, false);
            self.compositor.set_visible(self.layers.controls, false);
            return;
        };

        let width = SignboardView::width_for(area.width);
        let height = view.height(width);
        let x = area.width.saturating_sub(width) / 2;
        self.compositor
            .set_bounds(self.layers.signboard, Rect::new(x, 0, width, height));
        self.compositor.set_visible(self.layers.signboard, true);
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.signboard) {
            buf.reset();
            view.render(buf, Instant::now());
        }

        // Controls sit under the signboard, or on the last free row
        let y = height.min(area.height.saturating_sub(2));
        self.compositor
            .set_bounds(self.layers.controls, Rect::new(0, y, area.width, 1));
        self.compositor.set_visible(self.layers.controls, true);
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.controls) {
            buf.reset();
            let export_style = if self.display.export_in_progress {
                Style::default().fg(theme::DIM_GRAY)
            } else {
                Style::default()
                    .fg(theme::INK)
                    .bg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            };
            let export = format!(" [s] {} ", self.display.export_label);
            let another = format!(" [n] {} ", labels::MAKE_ANOTHER_LABEL);
            let total = text_width(&export) + 2 + text_width(&another);
            let start = area.width.saturating_sub(total) / 2;
            let (next, _) = buf.set_stringn(start, 0, &export, usize::from(area.width), export_style);
            buf.set_stringn(
                next + 2,
                0,
                &another,
                usize::from(area.width.saturating_sub(next + 2)),
                Style::default().fg(theme::SIGN_CREAM).bg(theme::LEAF_GREEN),
            );
        }
    }

    fn render_status(&mut self) {
        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.status) {
            buf.reset();
            let width = usize::from(buf.area.width);

            let (text, style) = match &self.display.notification {
                Some(n) => {
                    let color = match n.level {
                        NotifyLevel::Info => theme::SUCCESS_GREEN,
                        NotifyLevel::Warning => theme::WARNING_AMBER,
                        NotifyLevel::Error => theme::ERROR_RED,
                    };
                    (format!(" {}", n.message), Style::default().fg(color))
                }
                None => {
                    let hints = match self.display.phase {
                        Phase::Form => FORM_HINTS,
                        Phase::Loading => LOADING_HINTS,
                        Phase::Signboard => SIGNBOARD_HINTS,
                    };
                    (hints.to_string(), Style::default().fg(theme::DIM_GRAY))
                }
            };
            buf.set_stringn(0, 0, &text, width, style);
        }
    }

    fn render_alert(&mut self) {
        let area = self.compositor.area();
        let Some(message) = &self.display.alert else {
            self.compositor.set_visible(self.layers.alert, false);
            return;
        };

        let width = area.width.saturating_sub(4).clamp(10, ALERT_MAX_WIDTH);
        let text = TextBlock::new(message);
        let height = text.height(width.saturating_sub(4)) + 4;
        let bounds = Rect::new(
            area.width.saturating_sub(width) / 2,
            area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        self.compositor.set_bounds(self.layers.alert, bounds);
        self.compositor.set_visible(self.layers.alert, true);

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.alert) {
            buf.reset();
            let local = buf.area;
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(theme::ERROR_RED))
                .style(Style::default().bg(theme::INK));
            let inner = block.inner(local);
            block.render(local, buf);

            let body = Rect::new(
                inner.x + 1,
                inner.y,
                inner.width.saturating_sub(2),
                inner.height.saturating_sub(1),
            );
            text.style(
                Style::default()
                    .fg(theme::SIGN_CREAM)
                    .bg(theme::INK)
                    .add_modifier(Modifier::BOLD),
            )
            .render(body, buf);

            if inner.height > 0 {
                buf.set_stringn(
                    inner.x + 1,
                    inner.y + inner.height - 1,
                    ALERT_DISMISS,
                    usize::from(inner.width.saturating_sub(2)),
                    Style::default().fg(theme::DIM_GRAY).bg(theme::INK),
                );
            }
        }
    }

    /// Composite the current frame
    pub fn frame(&mut self) -> &Buffer {
        self.render_layers();
        self.compositor.composite()
    }

    /// The signboard layer as last rendered, while a signboard is mounted
    pub fn signboard_buffer(&self) -> Option<&Buffer> {
        self.compositor
            .layer_buffer(self.layers.signboard)
            .filter(|_| self.display.signboard.is_some())
            .filter(|_| self.compositor.is_visible(self.layers.signboard))
    }

    /// Pick a farewell line
    fn generate_farewell(&mut self) {
        let idx = rand::random::<usize>() % labels::FAREWELLS.len();
        self.farewell = Some(labels::FAREWELLS[idx].to_string());
    }

    /// Farewell for display after the TUI closes
    pub fn farewell(&self) -> Option<&str> {
        self.farewell.as_deref()
    }

    /// Whether the loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Form focus and hint
    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// The embedded client
    pub fn client(&self) -> &ExhibitClient<G, E> {
        &self.client
    }
}

fn text_width(s: &str) -> u16 {
    u16::try_from(s.width()).unwrap_or(u16::MAX)
}
