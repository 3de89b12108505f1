pub mod mascot;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::{
    app::App, celebration::Celebration, notify::Notifier, session::SessionState,
    sound::AudioPlayer,
};

const ALERT_WIDTH: u16 = 48;
const ALERT_HEIGHT: u16 = 5;

impl<N: Notifier, A: AudioPlayer> Widget for &App<N, A> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

        let state = self.controller.state();
        let clock_style = match state {
            SessionState::Idle => bold_style,
            SessionState::Running => bold_style.fg(Color::Green),
            SessionState::Stopped => bold_style.fg(Color::Yellow),
            SessionState::Finished => bold_style.fg(Color::Magenta),
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Min(0),
                    Constraint::Length(mascot::height()),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Min(0),
                ]
                .as_ref(),
            )
            .split(area);

        let art = mascot::art(state, self.celebration.pose())
            .iter()
            .map(|l| Line::from(*l))
            .collect::<Vec<_>>();
        Paragraph::new(art)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(Span::styled(self.controller.surface().clock(), clock_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        let actions = Line::from(vec![
            Span::styled("[s] ", key_style),
            Span::raw(self.start_label()),
            Span::raw("   "),
            Span::styled("[p] ", key_style),
            Span::raw("Stop"),
            Span::raw("   "),
            Span::styled("[r] ", key_style),
            Span::raw("Reset"),
        ]);
        Paragraph::new(actions)
            .alignment(Alignment::Center)
            .render(chunks[5], buf);

        let input = Line::from(vec![
            Span::raw("Minutes: "),
            Span::styled(format!("{}_", self.duration_input), bold_style),
            Span::raw("   "),
            Span::styled("[enter] ", key_style),
            Span::raw("Set duration"),
        ]);
        Paragraph::new(input)
            .alignment(Alignment::Center)
            .render(chunks[6], buf);

        Paragraph::new(Span::styled("(esc) quit", dim_style))
            .alignment(Alignment::Center)
            .render(chunks[7], buf);

        if self.celebration.is_active() {
            render_paws(&self.celebration, area, buf);
        }

        if let Some(message) = self.current_alert() {
            render_alert(message, area, buf);
        }
    }
}

/// Draw celebration particles over whatever is already on screen
fn render_paws(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Red,
        Color::Yellow,
        Color::Green,
        Color::Cyan,
        Color::Blue,
        Color::Magenta,
        Color::White,
    ];

    for particle in &celebration.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let x = particle.x as u16;
        let y = particle.y as u16;
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = colors[particle.color_index % colors.len()];
        let fade = 1.0 - (particle.age / particle.max_age);
        let style = if particle.is_letter() || fade > 0.5 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }
}

fn render_alert(message: &str, area: Rect, buf: &mut Buffer) {
    let width = ALERT_WIDTH.min(area.width);
    let height = ALERT_HEIGHT.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from(Span::styled(
            message,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "press any key",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Catodoro ")
            .border_style(Style::default().fg(Color::Magenta)),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(popup, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerSettings, SessionController};
    use crate::engine::CountdownEngine;
    use crate::notify::DesktopNotifier;
    use crate::sound::CommandPlayer;
    use crate::surface::{Surface, TerminalSurface};
    use std::time::Duration;

    fn create_test_app() -> App {
        let controller = SessionController::new(
            CountdownEngine::spawn(Duration::from_millis(50)),
            TerminalSurface::headless(),
            DesktopNotifier::denied(),
            CommandPlayer::with_program("true"),
            ControllerSettings::default(),
        );
        App::new(controller)
    }

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_idle_screen_shows_clock_and_actions() {
        let app = create_test_app();
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);

        (&app).render(area, &mut buffer);

        let text = buffer_text(&buffer);
        assert!(text.contains("25:00"));
        assert!(text.contains("Start Meow"));
        assert!(text.contains("Minutes: 25_"));
    }

    #[test]
    fn test_alert_popup_is_drawn() {
        let mut app = create_test_app();
        app.controller.surface_mut().alert("Meow! Focus session complete!");
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);

        (&app).render(area, &mut buffer);

        let text = buffer_text(&buffer);
        assert!(text.contains("Meow! Focus session complete!"));
        assert!(text.contains("press any key"));
    }

    #[test]
    fn test_tiny_areas_do_not_panic() {
        let mut app = create_test_app();
        app.controller.surface_mut().alert("Please enter a valid number of minutes!");
        for (w, h) in [(1, 1), (10, 3), (20, 5), (200, 60)] {
            let area = Rect::new(0, 0, w, h);
            let mut buffer = Buffer::empty(area);
            (&app).render(area, &mut buffer);
        }
    }

    #[test]
    fn test_celebration_rendering() {
        let mut app = create_test_app();
        app.celebration.start(80, 24);
        assert!(app.celebration.is_active());

        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);

        assert!(!buffer.content().is_empty());
    }
}
