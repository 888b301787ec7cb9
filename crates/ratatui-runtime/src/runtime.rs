use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, terminal,
};
use ratatui::DefaultTerminal;

use crate::{
    App,
    event::TuiEvent,
    event_loop::{EventLoop, RenderMode},
};

/// TUI application runtime.
///
/// Owns the event loop and runs an [`App`] until it asks to exit.
#[derive(Debug)]
pub struct Runtime {
    events: EventLoop,
    want_key_release: bool,
    key_release: bool,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: EventLoop::new(Instant::now()),
            want_key_release: false,
            key_release: false,
        }
    }

    /// Sets the time between ticks. `None` disables ticks.
    pub fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.events.set_tick_interval(interval, Instant::now());
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.events.set_render_mode(mode);
    }

    /// Asks the terminal to report key releases, when it supports doing so.
    ///
    /// Must be called from [`App::init`]. Whether the terminal accepted is available
    /// through [`Self::key_release_events`] once the application runs.
    pub fn request_key_release_events(&mut self) {
        self.want_key_release = true;
    }

    /// Returns whether key release events are being delivered.
    #[must_use]
    pub fn key_release_events(&self) -> bool {
        self.key_release
    }

    /// Runs the application.
    ///
    /// 1. Calls `app.init()`
    /// 2. Enters the terminal's alternate screen
    /// 3. Dispatches events until `app.should_exit()` returns true:
    ///    ticks to `app.update()`, renders to `app.draw()`, terminal events to
    ///    `app.handle_event()`
    /// 4. Restores the terminal, also when an error ends the loop
    pub fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            self.key_release =
                self.want_key_release && terminal::supports_keyboard_enhancement().unwrap_or(false);
            if self.key_release {
                execute!(
                    io::stdout(),
                    PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
                )?;
            }

            let result = self.dispatch(app, terminal);

            if self.key_release {
                execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
            }
            result
        })
    }

    fn dispatch<A>(&mut self, app: &mut A, terminal: &mut DefaultTerminal) -> io::Result<()>
    where
        A: App,
    {
        while !app.should_exit() {
            match self.events.next()? {
                TuiEvent::Tick(elapsed) => app.update(self, elapsed),
                TuiEvent::Render => {
                    terminal.draw(|frame| app.draw(frame))?;
                }
                TuiEvent::Crossterm(event) => app.handle_event(self, &event),
            }
        }
        Ok(())
    }
}
