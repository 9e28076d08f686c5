use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Environment variable carrying the session name into the placeholder process
pub const SESSION_ENV: &str = "MARVEX_DUMMY_SESSION";

/// What the user decided in the placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Turn the placeholder into a shell
    Start,
    /// Close without a shell
    Dismiss,
}

struct Theme {
    fg: Color,
    accent: Color,
    dim: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::Rgb(220, 220, 220),
            accent: Color::Rgb(217, 119, 87),
            dim: Color::Rgb(100, 100, 100),
        }
    }
}

pub struct Placeholder {
    session: String,
    theme: Theme,
}

impl Placeholder {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            theme: Theme::default(),
        }
    }

    pub fn handle_key(&self, key: KeyEvent) -> Option<Choice> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::Enter => Some(Choice::Start),
            KeyCode::Esc => Some(Choice::Dismiss),
            KeyCode::Char('c') | KeyCode::Char('s')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                Some(Choice::Dismiss)
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = centered_rect(60, 30, frame.area());

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.dim));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text = vec![
            Line::from(Span::styled(
                self.session.as_str(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Enter: start shell",
                Style::default().fg(self.theme.fg),
            )),
            Line::from(Span::styled(
                "Esc / Ctrl-S: close",
                Style::default().fg(self.theme.dim),
            )),
        ];

        frame.render_widget(Paragraph::new(text), inner);
    }

    /// Draw until a key decides. Blocking.
    pub fn run(&self) -> Result<Choice> {
        let mut terminal = ratatui::init();

        let result = loop {
            if let Err(e) = terminal.draw(|f| self.render(f)) {
                break Err(e.into());
            }

            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(choice) = self.handle_key(key) {
                        break Ok(choice);
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            }
        };

        ratatui::restore();
        result
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(rows[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_keys() {
        let p = Placeholder::new("marvex-3-1");
        assert_eq!(p.handle_key(key(KeyCode::Enter, KeyModifiers::NONE)), Some(Choice::Start));
        assert_eq!(p.handle_key(key(KeyCode::Esc, KeyModifiers::NONE)), Some(Choice::Dismiss));
        assert_eq!(
            p.handle_key(key(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Some(Choice::Dismiss)
        );
        assert_eq!(
            p.handle_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Choice::Dismiss)
        );
        assert_eq!(p.handle_key(key(KeyCode::Char('s'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_render_shows_session() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let p = Placeholder::new("marvex-3-1");

        terminal.draw(|f| p.render(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("marvex-3-1"));
        assert!(screen.contains("Enter: start shell"));
    }
}
