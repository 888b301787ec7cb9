use ojama_engine::{GameOver, GameSession, SessionState};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use super::{BoardDisplay, SessionStatsDisplay, color, style};

/// Board and stats side by side, with a popup for non-running states.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    session: &'a GameSession,
    result: Option<GameOver>,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self {
            session,
            result: None,
        }
    }

    /// Result of the last finished game, shown in the game over popup.
    pub fn result(self, result: Option<GameOver>) -> Self {
        Self { result, ..self }
    }

    fn border_color(&self) -> Color {
        match self.session.state() {
            SessionState::Idle => color::GRAY,
            SessionState::Running => color::WHITE,
            SessionState::Paused => color::YELLOW,
            SessionState::GameOver => color::RED,
        }
    }

    fn board(&self) -> BoardDisplay<'a> {
        let ghost = self
            .session
            .state()
            .is_running()
            .then(|| self.session.drop_position())
            .flatten();
        BoardDisplay::new(self.session.grid())
            .garbage_units(self.session.garbage_units())
            .ghost(ghost)
            .active_piece(self.session.active_piece().copied())
            .block(
                Block::bordered()
                    .border_style(self.border_color())
                    .style(style::DEFAULT),
            )
    }

    fn stats(&self) -> SessionStatsDisplay<'a> {
        SessionStatsDisplay::new(self.session).block(
            Block::bordered()
                .title(Line::from("STATS").centered())
                .padding(Padding::horizontal(1))
                .border_style(self.border_color())
                .style(style::DEFAULT),
        )
    }

    fn popup(&self) -> Option<(Vec<Line<'static>>, Style)> {
        match self.session.state() {
            SessionState::Running => None,
            SessionState::Idle => Some((
                vec![Line::from("PRESS ENTER")],
                Style::new().fg(color::BLACK).bg(color::WHITE),
            )),
            SessionState::Paused => Some((
                vec![Line::from("PAUSED")],
                Style::new().fg(color::BLACK).bg(color::YELLOW),
            )),
            SessionState::GameOver => {
                let mut lines = vec![Line::from("GAME OVER!!")];
                if let Some(result) = self.result {
                    lines.push(Line::from(format!("SCORE {}", result.score)));
                    lines.push(Line::from(format!("LINES {}", result.lines)));
                }
                Some((lines, Style::new().fg(color::WHITE).bg(color::RED)))
            }
        }
    }

    pub fn height(&self) -> u16 {
        u16::max(self.board().height(), self.stats().height())
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let board = self.board();
        let stats = self.stats();

        let [stats_column, board_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(board.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);
        let [stats_area] =
            Layout::vertical([Constraint::Length(stats.height())]).areas(stats_column);
        let [board_area] =
            Layout::vertical([Constraint::Length(board.height())]).areas(board_column);

        let board_width = board.width();
        stats.render(stats_area, buf);
        board.render(board_area, buf);

        if let Some((lines, style)) = self.popup() {
            let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
            let block = Block::new().style(style).padding(Padding::vertical(1));
            let area = board_area.centered(
                Constraint::Length(board_width),
                Constraint::Length(height + 2),
            );
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            Text::from(lines).style(style).centered().render(inner, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use ojama_engine::{SessionConfig, SessionSeed};

    use super::*;

    fn render_text(display: &SessionDisplay) -> String {
        let area = Rect::new(0, 0, 60, display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_idle_popup() {
        let session = GameSession::new(SessionConfig::default(), SessionSeed::from_u128(1));
        let text = render_text(&SessionDisplay::new(&session));
        assert!(text.contains("PRESS ENTER"));
        assert!(text.contains("STATS"));
    }

    #[test]
    fn test_running_has_no_popup() {
        let session = GameSession::spawn(SessionConfig::default(), SessionSeed::from_u128(1));
        let display = SessionDisplay::new(&session);
        assert!(display.popup().is_none());
        assert!(!render_text(&display).contains("PAUSED"));
    }

    #[test]
    fn test_paused_popup() {
        let mut session = GameSession::spawn(SessionConfig::default(), SessionSeed::from_u128(1));
        session.toggle_pause();
        assert!(render_text(&SessionDisplay::new(&session)).contains("PAUSED"));
    }

    #[test]
    fn test_game_over_popup_shows_result() {
        let mut session = GameSession::spawn(SessionConfig::default(), SessionSeed::from_u128(1));
        let result = loop {
            session.request_hard_drop();
            if let Some(result) = session.tick(std::time::Duration::from_secs(1)) {
                break result;
            }
        };
        let text = render_text(&SessionDisplay::new(&session).result(Some(result)));
        assert!(text.contains("GAME OVER!!"));
        assert!(text.contains(&format!("SCORE {}", result.score)));
    }
}
