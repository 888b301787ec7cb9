use std::time::Duration;

use crossterm::event::Event;
use ratatui::Frame;

use crate::Runtime;

/// Trait for TUI applications driven by [`Runtime::run`].
pub trait App {
    /// Called once before the terminal is set up.
    ///
    /// Configure the tick interval, render mode and key release reporting here.
    fn init(&mut self, runtime: &mut Runtime);

    fn should_exit(&self) -> bool;

    /// Handles terminal events (key presses and releases, resize, ...).
    fn handle_event(&mut self, runtime: &mut Runtime, event: &Event);

    fn draw(&self, frame: &mut Frame);

    /// Advances the application by the wall-clock time since the previous tick.
    fn update(&mut self, runtime: &mut Runtime, elapsed: Duration);
}
