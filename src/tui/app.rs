use std::{
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::api::{AskError, AskResponse, AskService};
use crate::chat::{
    Entry, InputAction, InputBuffer, RequestId, SubmissionController, Transcript,
};
use crate::tui::{scroll::ScrollState, ui::render_ui};

const SCROLL_STEP: u16 = 5;

/// Outcome of a spawned `/ask` call, delivered back to the event loop.
#[derive(Debug)]
pub struct Settlement {
    pub request: RequestId,
    pub outcome: Result<AskResponse, AskError>,
}

/// Input mode for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Chat screen state
pub struct ConsulApp {
    service: Arc<dyn AskService>,
    server_url: String,
    session_id: String,

    transcript: Transcript<ScrollState>,
    input: InputBuffer,
    controller: SubmissionController,

    settlements_tx: mpsc::UnboundedSender<Settlement>,
    settlements_rx: mpsc::UnboundedReceiver<Settlement>,

    input_mode: InputMode,
    ticks: usize,
    should_quit: bool,
}

impl ConsulApp {
    pub fn new(service: Arc<dyn AskService>, server_url: &str, session_id: &str) -> Self {
        let (settlements_tx, settlements_rx) = mpsc::unbounded_channel();

        Self {
            service,
            server_url: server_url.to_string(),
            session_id: session_id.to_string(),
            transcript: Transcript::new(ScrollState::default()),
            input: InputBuffer::new(),
            controller: SubmissionController::new(),
            settlements_tx,
            settlements_rx,
            input_mode: InputMode::Editing,
            ticks: 0,
            should_quit: false,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        self.transcript.entries()
    }

    pub fn scroll(&self) -> &ScrollState {
        self.transcript.surface()
    }

    pub(crate) fn transcript_mut(&mut self) -> &mut Transcript<ScrollState> {
        &mut self.transcript
    }

    pub fn input(&self) -> &str {
        self.input.text()
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn is_sending(&self) -> bool {
        self.controller.is_sending()
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.controller.pending_request()
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Submit the input field. The network call runs on its own task and
    /// reports back through the settlement channel.
    pub fn submit(&mut self) {
        let Some(dispatch) = self.controller.submit(&mut self.input, &mut self.transcript) else {
            return;
        };

        let service = Arc::clone(&self.service);
        let tx = self.settlements_tx.clone();
        tokio::spawn(async move {
            let outcome = service.ask(&dispatch.question).await;
            if tx
                .send(Settlement {
                    request: dispatch.request,
                    outcome,
                })
                .is_err()
            {
                tracing::debug!(request = %dispatch.request, "chat screen closed before settlement");
            }
        });
    }

    pub fn settle(&mut self, settlement: Settlement) {
        self.controller
            .settle(&mut self.transcript, settlement.request, settlement.outcome);
    }

    /// Apply every settlement that has arrived since the last frame.
    pub fn drain_settlements(&mut self) {
        while let Ok(settlement) = self.settlements_rx.try_recv() {
            self.settle(settlement);
        }
    }

    /// Wait for the next settlement.
    pub async fn next_settlement(&mut self) -> Option<Settlement> {
        self.settlements_rx.recv().await
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::PageUp => {
                self.transcript.surface_mut().scroll_up(SCROLL_STEP);
                return;
            }
            KeyCode::PageDown => {
                self.transcript.surface_mut().scroll_down(SCROLL_STEP);
                return;
            }
            _ => {}
        }

        match self.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('e') | KeyCode::Char('i') | KeyCode::Enter => {
                    self.input_mode = InputMode::Editing;
                }
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.transcript.surface_mut().scroll_up(1);
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.transcript.surface_mut().scroll_down(1);
                }
                KeyCode::Char('G') | KeyCode::End => {
                    self.transcript.surface_mut().jump_to_latest();
                }
                _ => {}
            },
            InputMode::Editing => {
                if key.code == KeyCode::Esc {
                    self.input_mode = InputMode::Normal;
                    return;
                }
                if self.input.handle_key(key) == InputAction::Submit {
                    self.submit();
                }
            }
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.transcript.surface_mut().scroll_up(1),
            MouseEventKind::ScrollDown => self.transcript.surface_mut().scroll_down(1),
            _ => {}
        }
    }
}

/// Run the chat screen until the user quits.
pub async fn run(service: Arc<dyn AskService>, server_url: &str, session_id: &str) -> Result<()> {
    let mut terminal = super::init()?;

    let mut app = ConsulApp::new(service, server_url, session_id);
    let tick_rate = Duration::from_millis(100);
    let result = run_app(&mut terminal, &mut app, tick_rate).await;

    super::restore()?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut ConsulApp,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| render_ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        app.drain_settlements();

        if app.should_quit() {
            return Ok(());
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{replies::PLACEHOLDER_TEXT, Role};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Holds every call open until released.
    struct GatedService {
        calls: AtomicUsize,
        gate: Notify,
    }

    #[async_trait]
    impl AskService for GatedService {
        async fn ask(&self, question: &str) -> Result<AskResponse, AskError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(AskResponse::answered(format!("respuesta a {question}")))
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut ConsulApp, text: &str) {
        for c in text.chars() {
            app.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn test_enter_sends_one_question_at_a_time() -> anyhow::Result<()> {
        let service = Arc::new(GatedService {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
        });
        let mut app = ConsulApp::new(service.clone(), "http://localhost:8001", "s");

        type_text(&mut app, "Q1");
        app.handle_key(press(KeyCode::Enter));
        for _ in 0..3 {
            type_text(&mut app, "x");
            app.handle_key(press(KeyCode::Enter));
        }

        tokio::task::yield_now().await;
        assert!(app.is_sending());
        assert_eq!(app.entries().len(), 2);
        assert_eq!(app.entries()[1].text, PLACEHOLDER_TEXT);

        service.gate.notify_one();
        let settlement = app
            .next_settlement()
            .await
            .ok_or_else(|| anyhow::anyhow!("settlement channel closed"))?;
        app.settle(settlement);

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert!(!app.is_sending());
        assert_eq!(app.entries()[0].role, Role::User);
        assert_eq!(app.entries()[0].text, "Q1");
        assert_eq!(app.entries()[1].text, "respuesta a Q1");
        Ok(())
    }

    #[tokio::test]
    async fn test_shift_enter_does_not_submit() {
        let service = Arc::new(GatedService {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
        });
        let mut app = ConsulApp::new(service, "http://localhost:8001", "s");

        type_text(&mut app, "hola");
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));

        assert_eq!(app.input(), "hola\n");
        assert!(app.entries().is_empty());
        assert!(!app.is_sending());
    }

    #[tokio::test]
    async fn test_modes_and_quit() {
        let service = Arc::new(GatedService {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
        });
        let mut app = ConsulApp::new(service, "http://localhost:8001", "s");

        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.input_mode(), InputMode::Normal);

        // Typing in normal mode does not reach the input field.
        app.handle_key(press(KeyCode::Char('x')));
        assert_eq!(app.input(), "");

        app.handle_key(press(KeyCode::Char('e')));
        assert_eq!(app.input_mode(), InputMode::Editing);

        // 'q' is an ordinary character while editing.
        app.handle_key(press(KeyCode::Char('q')));
        assert!(!app.should_quit());

        app.handle_key(press(KeyCode::Esc));
        app.handle_key(press(KeyCode::Char('q')));
        assert!(app.should_quit());
    }
}
