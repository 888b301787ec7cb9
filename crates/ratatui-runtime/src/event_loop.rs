use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;
use derive_more::{Display, Error};

use crate::event::TuiEvent;

/// When the screen is redrawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Redraw after every tick or terminal event.
    #[default]
    OnDirty,
    /// Redraw after state changes, at most once per interval.
    ///
    /// Changes arriving faster than the interval are drawn together.
    Throttled(Duration),
}

impl RenderMode {
    /// Creates `Throttled` mode from a frame rate (FPS).
    ///
    /// Falls back to `OnDirty` when the rate has no usable interval.
    #[must_use]
    pub fn throttled_from_rate(rate: f64) -> Self {
        interval_from_rate(rate).map_or(Self::OnDirty, Self::Throttled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Display, Error)]
#[display("rate must be a positive number of events per second, got {rate}")]
pub struct InvalidRateError {
    rate: f64,
}

/// Converts a rate in Hz into the interval between two events.
///
/// The interval must be representable as a non-zero [`Duration`].
pub fn interval_from_rate(rate: f64) -> Result<Duration, InvalidRateError> {
    Duration::try_from_secs_f64(rate.recip())
        .ok()
        .filter(|interval| !interval.is_zero())
        .ok_or(InvalidRateError { rate })
}

/// Decides which event comes next.
///
/// Ticks are only generated while a tick interval is set.
#[derive(Debug)]
pub(crate) struct EventLoop {
    tick_interval: Option<Duration>,
    render_mode: RenderMode,
    last_tick: Instant,
    last_render: Option<Instant>,
    dirty: bool,
}

impl EventLoop {
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            tick_interval: None,
            render_mode: RenderMode::default(),
            last_tick: now,
            last_render: None,
            dirty: true,
        }
    }

    /// Sets the tick interval and restarts tick timing from `now`.
    pub(crate) fn set_tick_interval(&mut self, interval: Option<Duration>, now: Instant) {
        self.tick_interval = interval;
        self.last_tick = now;
    }

    pub(crate) fn set_render_mode(&mut self, render_mode: RenderMode) {
        self.render_mode = render_mode;
    }

    /// Blocks until a tick or render is due or a terminal event arrives.
    pub(crate) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(event) = self.due_event(now) {
                return Ok(event);
            }
            if let Some(timeout) = self.timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }
            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    /// Returns the tick or render event due at `now`, ticks first.
    fn due_event(&mut self, now: Instant) -> Option<TuiEvent> {
        if let Some(interval) = self.tick_interval {
            let elapsed = now.saturating_duration_since(self.last_tick);
            if elapsed >= interval {
                self.last_tick = now;
                self.dirty = true;
                return Some(TuiEvent::Tick(elapsed));
            }
        }

        let render = self.dirty
            && match (self.render_mode, self.last_render) {
                (RenderMode::OnDirty, _) | (RenderMode::Throttled(_), None) => true,
                (RenderMode::Throttled(interval), Some(last)) => {
                    now.saturating_duration_since(last) >= interval
                }
            };
        if render {
            self.last_render = Some(now);
            self.dirty = false;
            return Some(TuiEvent::Render);
        }
        None
    }

    /// Time to wait for terminal input before the next tick or render is due.
    ///
    /// `None` means nothing is scheduled and the loop can wait for input indefinitely.
    fn timeout(&self, now: Instant) -> Option<Duration> {
        let next_tick = self.tick_interval.map(|interval| self.last_tick + interval);
        let next_render = match (self.render_mode, self.last_render) {
            _ if !self.dirty => None,
            (RenderMode::OnDirty, _) | (RenderMode::Throttled(_), None) => Some(now),
            (RenderMode::Throttled(interval), Some(last)) => Some(last + interval),
        };
        let deadline = [next_tick, next_render].into_iter().flatten().min()?;
        Some(deadline.saturating_duration_since(now))
    }
}
