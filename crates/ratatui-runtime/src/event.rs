use std::time::Duration;

use crossterm::event::Event as CrosstermEvent;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant, derive_more::From)]
pub(crate) enum TuiEvent {
    /// The tick interval elapsed; carries the measured time since the previous tick.
    #[from(ignore)]
    Tick(Duration),
    Render,
    Crossterm(CrosstermEvent),
}
