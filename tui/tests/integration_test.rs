//! Integration Tests for TUI + Orchestrator
//!
//! Drive the App with key events against a mock generator and exporter and
//! check what ends up in the display state and on screen.
//!
//! # Test Coverage
//!
//! 1. **Form**: typing, focus, line breaks, required fields
//! 2. **Generation**: loading, signboard mount, failure, status rotation
//! 3. **Signboard**: export success and failure, make another
//! 4. **Lifecycle**: alerts swallow keys, Esc quits with a farewell

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use exhibit_core::labels;
use exhibit_core::{
    ExhibitData, ExhibitStats, Exporter, GenerationClient, GenerationError, InputField,
    OrchestratorConfig, UserInput,
};
use zoo_exhibit_tui::display::Phase;
use zoo_exhibit_tui::{App, ExhibitClient};

// ============================================================================
// Mocks
// ============================================================================

#[derive(Clone, Copy)]
enum Behavior {
    Succeed,
    Fail,
    Hang,
}

#[derive(Clone)]
struct MockGenerator {
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl MockGenerator {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

fn exhibit() -> ExhibitData {
    ExhibitData {
        classification: "偶蹄目ウシ科".to_string(),
        danger_level: "★★☆☆☆".to_string(),
        scientific_name: "Bos lentus".to_string(),
        description: "一日の大半を反芻に費やす。".to_string(),
        stats: ExhibitStats {
            stamina: 40,
            intelligence: 60,
            laziness: 95,
            charm: 75,
        },
        fun_fact: "好物は深夜のラーメン。".to_string(),
    }
}

#[async_trait]
impl GenerationClient for MockGenerator {
    async fn generate(&self, _input: UserInput) -> Result<ExhibitData, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(exhibit()),
            Behavior::Fail => Err(GenerationError::Transport("connection refused".to_string())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GenerationError::Transport("unreachable".to_string()))
            }
        }
    }
}

#[derive(Clone)]
struct MockExporter {
    succeed: bool,
    received: Arc<Mutex<Vec<(Buffer, String)>>>,
}

impl MockExporter {
    fn new(succeed: bool) -> Self {
        Self {
            succeed,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Exporter for MockExporter {
    type Subtree = Buffer;

    async fn export_as_image(&self, root: Buffer, file_name: String) -> bool {
        self.received.lock().unwrap().push((root, file_name));
        self.succeed
    }
}

// ============================================================================
// Helpers
// ============================================================================

type TestApp = App<MockGenerator, MockExporter>;

fn app(generator: &MockGenerator, exporter: &MockExporter) -> TestApp {
    let client = ExhibitClient::new(
        generator.clone(),
        exporter.clone(),
        OrchestratorConfig::default(),
    );
    App::new(client, Rect::new(0, 0, 80, 48))
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Let spawned work finish and apply everything it produced
async fn settle(app: &mut TestApp) {
    for _ in 0..20 {
        tokio::task::yield_now().await;
        app.tick().await;
    }
}

async fn type_text(app: &mut TestApp, text: &str) {
    for c in text.chars() {
        app.handle_key(key(KeyCode::Char(c))).await;
    }
    settle(app).await;
}

async fn fill_form(app: &mut TestApp) {
    type_text(app, "ウシオ").await;
    app.handle_key(key(KeyCode::Tab)).await;
    type_text(app, "昼寝").await;
    app.handle_key(key(KeyCode::Tab)).await;
    type_text(app, "朝起きられない").await;
}

fn screen_text(app: &mut TestApp) -> String {
    let frame = app.frame();
    let mut out = String::new();
    for y in 0..frame.area.height {
        for x in 0..frame.area.width {
            out.push_str(frame[(x, y)].symbol());
        }
    }
    out.chars().filter(|c| *c != ' ').collect()
}

async fn show_signboard(app: &mut TestApp) {
    fill_form(app).await;
    app.handle_key(key(KeyCode::Enter)).await;
    settle(app).await;
    assert_eq!(app.display().phase, Phase::Signboard);
    app.frame();
}

// ============================================================================
// Form
// ============================================================================

#[tokio::test]
async fn test_typing_fills_focused_field() {
    let generator = MockGenerator::new(Behavior::Succeed);
    let mut app = app(&generator, &MockExporter::new(true));

    type_text(&mut app, "ウシオ").await;
    app.handle_key(key(KeyCode::Backspace)).await;
    settle(&mut app).await;

    assert_eq!(app.display().draft.name, "ウシ");
    assert!(screen_text(&mut app).contains("ウシ_"));
}

#[tokio::test]
async fn test_alt_enter_breaks_lines_only_in_worry() {
    let generator = MockGenerator::new(Behavior::Succeed);
    let mut app = app(&generator, &MockExporter::new(true));
    let alt_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);

    type_text(&mut app, "a").await;
    app.handle_key(alt_enter).await;
    app.handle_key(key(KeyCode::BackTab)).await;
    assert_eq!(app.form().focus(), InputField::Worry);
    type_text(&mut app, "b").await;
    app.handle_key(alt_enter).await;
    app.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL))
        .await;
    type_text(&mut app, "c").await;

    assert_eq!(app.display().draft.name, "a");
    assert_eq!(app.display().draft.worry, "b\n\nc");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_submit_with_missing_field_focuses_it() {
    let generator = MockGenerator::new(Behavior::Succeed);
    let mut app = app(&generator, &MockExporter::new(true));

    type_text(&mut app, "ウシオ").await;
    app.handle_key(key(KeyCode::Down)).await;
    app.handle_key(key(KeyCode::Down)).await;
    type_text(&mut app, "   ").await;
    app.handle_key(key(KeyCode::Enter)).await;
    settle(&mut app).await;

    assert_eq!(app.display().phase, Phase::Form);
    assert_eq!(app.form().focus(), InputField::Hobby);
    let hint = format!("{}を入力してください", labels::HOBBY_LABEL);
    assert_eq!(app.form().hint(), Some(hint.as_str()));
    assert!(screen_text(&mut app).contains(&hint.replace(' ', "")));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Generation
// ============================================================================

#[tokio::test]
async fn test_successful_generation_shows_signboard() {
    let generator = MockGenerator::new(Behavior::Succeed);
    let mut app = app(&generator, &MockExporter::new(true));

    show_signboard(&mut app).await;

    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    let view = app.display().signboard.as_ref().unwrap();
    assert_eq!(view.display_name(), "ウシオ");

    let shown = screen_text(&mut app);
    assert!(shown.contains("ウシオ"));
    assert!(shown.contains("Boslentus"));
    assert!(shown.contains(labels::KEEPER_COMMENTARY));
    assert!(!shown.contains(labels::SUBMIT_LABEL));
    assert!(app.signboard_buffer().is_some());
}

#[tokio::test]
async fn test_failed_generation_returns_to_form() {
    let generator = MockGenerator::new(Behavior::Fail);
    let mut app = app(&generator, &MockExporter::new(true));

    fill_form(&mut app).await;
    app.handle_key(key(KeyCode::Enter)).await;
    settle(&mut app).await;

    assert_eq!(app.display().phase, Phase::Form);
    assert_eq!(app.display().error.as_deref(), Some(labels::GENERATION_FAILED));
    assert_eq!(app.display().draft.hobby, "昼寝");
    assert!(screen_text(&mut app).contains("飼育データの解析に失敗しました"));
    assert!(app.signboard_buffer().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_loading_status_rotates_and_keys_are_ignored() {
    let generator = MockGenerator::new(Behavior::Hang);
    let mut app = app(&generator, &MockExporter::new(true));

    fill_form(&mut app).await;
    app.handle_key(key(KeyCode::Enter)).await;
    settle(&mut app).await;
    assert_eq!(app.display().phase, Phase::Loading);
    assert_eq!(app.display().status.as_deref(), Some(labels::LOADING_MESSAGES[0]));

    tokio::time::advance(Duration::from_millis(2500)).await;
    settle(&mut app).await;
    assert_eq!(app.display().status.as_deref(), Some(labels::LOADING_MESSAGES[1]));

    // Typing while loading changes nothing
    type_text(&mut app, "x").await;
    assert_eq!(app.display().draft.name, "ウシオ");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Signboard
// ============================================================================

#[tokio::test]
async fn test_export_hands_over_rendered_signboard() {
    let exporter = MockExporter::new(true);
    let mut app = app(&MockGenerator::new(Behavior::Succeed), &exporter);
    show_signboard(&mut app).await;
    let area = app.signboard_buffer().unwrap().area;

    app.handle_key(key(KeyCode::Char('s'))).await;
    settle(&mut app).await;

    let received = exporter.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let (buffer, file_name) = &received[0];
    assert_eq!(buffer.area, area);
    assert!(file_name.starts_with("zoo_exhibit_"));
    assert!(file_name.ends_with(".png"));
    drop(received);

    assert!(!app.display().export_in_progress);
    assert_eq!(app.display().export_label, labels::EXPORT_IDLE_LABEL);
    assert_eq!(app.display().alert, None);
}

#[tokio::test]
async fn test_export_failure_alerts_and_alert_swallows_next_key() {
    let exporter = MockExporter::new(false);
    let mut app = app(&MockGenerator::new(Behavior::Succeed), &exporter);
    show_signboard(&mut app).await;

    app.handle_key(key(KeyCode::Enter)).await;
    settle(&mut app).await;

    assert_eq!(app.display().alert.as_deref(), Some(labels::EXPORT_FAILED));
    assert_eq!(app.display().export_label, labels::EXPORT_IDLE_LABEL);
    assert!(screen_text(&mut app).contains(labels::EXPORT_FAILED));

    // The 'n' only closes the alert
    app.handle_key(key(KeyCode::Char('n'))).await;
    settle(&mut app).await;
    assert_eq!(app.display().alert, None);
    assert_eq!(app.display().phase, Phase::Signboard);
}

#[tokio::test]
async fn test_make_another_keeps_draft() {
    let mut app = app(
        &MockGenerator::new(Behavior::Succeed),
        &MockExporter::new(true),
    );
    show_signboard(&mut app).await;

    app.handle_key(key(KeyCode::Char('n'))).await;
    settle(&mut app).await;

    assert_eq!(app.display().phase, Phase::Form);
    assert!(app.display().signboard.is_none());
    assert!(app.signboard_buffer().is_none());
    assert_eq!(
        app.display().draft,
        UserInput::new("ウシオ", "昼寝", "朝起きられない")
    );
    assert!(screen_text(&mut app).contains(labels::SUBMIT_LABEL));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_esc_quits_with_farewell() {
    let mut app = app(
        &MockGenerator::new(Behavior::Succeed),
        &MockExporter::new(true),
    );

    app.handle_key(key(KeyCode::Esc)).await;
    settle(&mut app).await;

    assert!(!app.is_running());
    assert!(app.display().quitting);
    let farewell = app.farewell().unwrap();
    assert!(labels::FAREWELLS.contains(&farewell));
}

#[tokio::test]
async fn test_ctrl_c_quits() {
    let mut app = app(
        &MockGenerator::new(Behavior::Succeed),
        &MockExporter::new(true),
    );

    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
        .await;

    assert!(!app.is_running());
    assert_eq!(app.display().draft.name, "");
}
