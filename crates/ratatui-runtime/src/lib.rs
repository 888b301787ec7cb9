//! A small tick/render/input loop for `ratatui` applications.
//!
//! [`Runtime::run`] owns the terminal and feeds an [`App`] one event at a time: a tick
//! carrying the time elapsed since the previous tick, a render request, or a terminal
//! event. Everything happens on the calling thread, so the application never sees two
//! events at once.

pub use self::{
    app::App,
    event_loop::{InvalidRateError, RenderMode, interval_from_rate},
    runtime::Runtime,
};

mod app;
mod event;
mod event_loop;
mod runtime;
