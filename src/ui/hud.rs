use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::config::Theme;
use crate::game::Snapshot;

/// Renders the one-line HUD below the board and returns the play area above it.
#[must_use]
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, snapshot: &Snapshot, theme: &Theme) -> Rect {
    let [play_area, score_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    frame.render_widget(
        Paragraph::new(info_line(snapshot, theme))
            .alignment(Alignment::Right)
            .style(Style::default().fg(theme.hud_muted)),
        score_area,
    );

    play_area
}

fn info_line(snapshot: &Snapshot, theme: &Theme) -> Line<'static> {
    let value = Style::default().fg(theme.hud_score);
    let record = snapshot.score > 0 && snapshot.score >= snapshot.high_score;
    let high_style = if record {
        value.add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.hud_muted)
    };

    let mut spans = vec![
        Span::raw("Length: "),
        Span::styled(snapshot.snake.len().to_string(), value),
        Span::raw(" | Score: "),
        Span::styled(snapshot.score.to_string(), value),
        Span::raw(" | Hi: "),
        Span::styled(snapshot.high_score.to_string(), high_style),
    ];

    if snapshot.bonus.is_some() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("BONUS", Style::default().fg(theme.bonus)));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use crate::config::THEME;
    use crate::game::{SessionState, Snapshot};
    use crate::grid::{Cell, GridSize};

    use super::info_line;

    fn snapshot(bonus: Option<Cell>) -> Snapshot {
        Snapshot {
            grid: GridSize::new(20, 20),
            snake: vec![Cell::new(5, 5), Cell::new(5, 4), Cell::new(5, 3)],
            food: Cell::new(10, 10),
            bonus,
            score: 4,
            high_score: 9,
            state: SessionState::Running,
            death_reason: None,
        }
    }

    fn text(line: &ratatui::text::Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn info_line_lists_length_score_and_high_score() {
        let line = info_line(&snapshot(None), &THEME);
        assert_eq!(text(&line), "Length: 3 | Score: 4 | Hi: 9");
    }

    #[test]
    fn info_line_flags_visible_bonus() {
        let line = info_line(&snapshot(Some(Cell::new(1, 1))), &THEME);
        assert!(text(&line).ends_with("| BONUS"));
    }
}
