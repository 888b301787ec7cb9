use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEventKind};
use ojama_engine::{GameOver, GameSession, SessionState};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use ratatui_runtime::{App, RenderMode, Runtime};

use crate::ui::widgets::{KeyBinding, KeyBindingDisplay, SessionDisplay};

/// How long soft drop stays on after a Down press when the terminal cannot report
/// key releases. Auto-repeat presses extend it while the key is held.
const SOFT_DROP_HOLD: Duration = Duration::from_millis(600);

const FRAME_RATE: f64 = 60.0;

#[derive(Debug)]
pub(crate) struct PlayApp {
    session: GameSession,
    tick_interval: Duration,
    last_result: Option<GameOver>,
    soft_drop_hold: Option<Duration>,
    is_exiting: bool,
}

impl PlayApp {
    pub(crate) fn new(session: GameSession, tick_interval: Duration) -> Self {
        Self {
            session,
            tick_interval,
            last_result: None,
            soft_drop_hold: None,
            is_exiting: false,
        }
    }

    pub(crate) fn last_result(&self) -> Option<GameOver> {
        self.last_result
    }

    fn key_bindings(&self) -> &'static [KeyBinding<'static>] {
        match self.session.state() {
            SessionState::Idle => &[(&["Enter"], "Start"), (&["Q"], "Quit")],
            SessionState::Running => &[
                (&["←", "→"], "Move"),
                (&["↑"], "Rotate"),
                (&["↓"], "Soft Drop"),
                (&["Space"], "Hard Drop"),
                (&["P"], "Pause"),
                (&["Q"], "Quit"),
            ],
            SessionState::Paused => &[(&["P"], "Resume"), (&["Q"], "Quit")],
            SessionState::GameOver => &[(&["R"], "Restart"), (&["Q"], "Quit")],
        }
    }

    fn press_soft_drop(&mut self, key_release_events: bool) {
        self.session.set_soft_dropping(true);
        if !key_release_events {
            self.soft_drop_hold = Some(SOFT_DROP_HOLD);
        }
    }

    fn release_soft_drop(&mut self) {
        self.session.set_soft_dropping(false);
        self.soft_drop_hold = None;
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_interval(Some(self.tick_interval));
        runtime.set_render_mode(RenderMode::throttled_from_rate(FRAME_RATE));
        runtime.request_key_release_events();
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, runtime: &mut Runtime, event: &Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        if key.kind == KeyEventKind::Release {
            if key.code == KeyCode::Down {
                self.release_soft_drop();
            }
            return;
        }

        let state = self.session.state();
        match key.code {
            KeyCode::Char('q' | 'Q') => self.is_exiting = true,
            KeyCode::Enter if state.is_idle() => self.session.start(),
            KeyCode::Char('r' | 'R') if state.is_game_over() => {
                self.session.reset();
                self.last_result = None;
            }
            KeyCode::Char('p' | 'P') => {
                self.release_soft_drop();
                self.session.toggle_pause();
            }
            KeyCode::Left => _ = self.session.request_move(-1, 0),
            KeyCode::Right => _ = self.session.request_move(1, 0),
            KeyCode::Up => _ = self.session.request_rotate(),
            KeyCode::Down => self.press_soft_drop(runtime.key_release_events()),
            KeyCode::Char(' ') => _ = self.session.request_hard_drop(),
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let session_display = SessionDisplay::new(&self.session).result(self.last_result);
        let help = KeyBindingDisplay::new(self.key_bindings());

        let [main_area, help_area] = Layout::vertical([
            Constraint::Length(session_display.height()),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(help, help_area);
    }

    fn update(&mut self, _runtime: &mut Runtime, elapsed: Duration) {
        if let Some(remaining) = self.soft_drop_hold {
            self.soft_drop_hold = remaining.checked_sub(elapsed).filter(|d| !d.is_zero());
            if self.soft_drop_hold.is_none() {
                self.session.set_soft_dropping(false);
            }
        }
        if let Some(result) = self.session.tick(elapsed) {
            self.last_result = Some(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyEventState, KeyModifiers};
    use ojama_engine::{SessionConfig, SessionSeed};

    use super::*;

    fn app() -> PlayApp {
        let session = GameSession::new(SessionConfig::default(), SessionSeed::from_u128(3));
        PlayApp::new(session, Duration::from_millis(16))
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn press(app: &mut PlayApp, runtime: &mut Runtime, code: KeyCode) {
        app.handle_event(runtime, &key(code, KeyEventKind::Press));
    }

    fn started() -> (PlayApp, Runtime) {
        let mut app = app();
        let mut runtime = Runtime::new();
        press(&mut app, &mut runtime, KeyCode::Enter);
        (app, runtime)
    }

    fn piece_col(app: &PlayApp) -> i32 {
        app.session.active_piece().unwrap().position().col()
    }

    #[test]
    fn test_enter_starts_idle_session() {
        let mut app = app();
        let mut runtime = Runtime::new();
        press(&mut app, &mut runtime, KeyCode::Left);
        assert!(app.session.state().is_idle());
        press(&mut app, &mut runtime, KeyCode::Enter);
        assert!(app.session.state().is_running());
    }

    #[test]
    fn test_move_keys() {
        let (mut app, mut runtime) = started();
        let col = piece_col(&app);
        press(&mut app, &mut runtime, KeyCode::Left);
        assert_eq!(piece_col(&app), col - 1);
        app.handle_event(&mut runtime, &key(KeyCode::Right, KeyEventKind::Repeat));
        app.handle_event(&mut runtime, &key(KeyCode::Right, KeyEventKind::Release));
        assert_eq!(piece_col(&app), col);
    }

    #[test]
    fn test_soft_drop_press_and_release() {
        let (mut app, mut runtime) = started();
        press(&mut app, &mut runtime, KeyCode::Down);
        assert!(app.session.is_soft_dropping());
        app.handle_event(&mut runtime, &key(KeyCode::Down, KeyEventKind::Release));
        assert!(!app.session.is_soft_dropping());
    }

    #[test]
    fn test_soft_drop_hold_expires_without_release_events() {
        let (mut app, mut runtime) = started();
        assert!(!runtime.key_release_events());
        press(&mut app, &mut runtime, KeyCode::Down);

        app.update(&mut runtime, Duration::from_millis(300));
        assert!(app.session.is_soft_dropping());
        // A repeated press extends the hold.
        press(&mut app, &mut runtime, KeyCode::Down);
        app.update(&mut runtime, Duration::from_millis(300));
        assert!(app.session.is_soft_dropping());
        app.update(&mut runtime, Duration::from_millis(300));
        assert!(!app.session.is_soft_dropping());
    }

    #[test]
    fn test_pause_and_quit() {
        let (mut app, mut runtime) = started();
        press(&mut app, &mut runtime, KeyCode::Char('p'));
        assert!(app.session.state().is_paused());
        press(&mut app, &mut runtime, KeyCode::Char('p'));
        assert!(app.session.state().is_running());

        assert!(!app.should_exit());
        press(&mut app, &mut runtime, KeyCode::Char('q'));
        assert!(app.should_exit());
    }

    #[test]
    fn test_uppercase_keys() {
        let (mut app, mut runtime) = started();
        press(&mut app, &mut runtime, KeyCode::Char('P'));
        assert!(app.session.state().is_paused());
        press(&mut app, &mut runtime, KeyCode::Char('P'));
        assert!(app.session.state().is_running());
        press(&mut app, &mut runtime, KeyCode::Char('Q'));
        assert!(app.should_exit());
    }

    #[test]
    fn test_game_over_and_restart() {
        let (mut app, mut runtime) = started();
        for _ in 0..1000 {
            if app.last_result().is_some() {
                break;
            }
            press(&mut app, &mut runtime, KeyCode::Char(' '));
            app.update(&mut runtime, Duration::from_secs(1));
        }
        let result = app.last_result().unwrap();
        assert!(app.session.state().is_game_over());
        assert_eq!(result.score, app.session.stats().score());

        press(&mut app, &mut runtime, KeyCode::Char('R'));
        assert!(app.session.state().is_running());
        assert!(app.last_result().is_none());
        assert_eq!(app.session.stats().score(), 0);
    }
}
