use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Block;
use ratatui::Frame;

use crate::config::{Theme, CELL_WIDTH, GLYPH_BONUS, GLYPH_FOOD, GLYPH_SNAKE, THEME};
use crate::game::{SessionState, Snapshot};
use crate::grid::{Cell, GridSize};
use crate::ui::hud::render_hud;
use crate::ui::menu::{render_game_over_menu, render_pause_menu, render_start_menu};

/// Renders the full game frame from an immutable snapshot.
pub fn render(frame: &mut Frame<'_>, snapshot: &Snapshot, paused: bool) {
    let theme = &THEME;
    let area = board_area(frame.area(), snapshot.grid);
    let play_area = render_hud(frame, area, snapshot, theme);

    let block = Block::bordered()
        .border_style(Style::new().fg(theme.border_fg).bg(theme.play_bg))
        .style(Style::new().bg(theme.play_bg));

    let inner = block.inner(play_area);
    frame.render_widget(block, play_area);

    render_food(frame, inner, snapshot, theme);
    render_snake(frame, inner, snapshot, theme);

    match snapshot.state {
        SessionState::NotStarted => {
            render_start_menu(frame, play_area, snapshot.high_score, theme);
        }
        SessionState::Running if paused => render_pause_menu(frame, play_area),
        SessionState::Running => {}
        SessionState::Over => render_game_over_menu(
            frame,
            play_area,
            snapshot.score,
            snapshot.high_score,
            snapshot.death_reason,
        ),
    }
}

/// Board rectangle (border and HUD row included) anchored top-left in `area`.
fn board_area(area: Rect, grid: GridSize) -> Rect {
    let width = grid.cols.saturating_mul(CELL_WIDTH).saturating_add(2);
    let height = grid.rows.saturating_add(3);

    Rect {
        x: area.x,
        y: area.y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn render_food(frame: &mut Frame<'_>, inner: Rect, snapshot: &Snapshot, theme: &Theme) {
    let buffer = frame.buffer_mut();

    if let Some((x, y)) = logical_to_terminal(inner, snapshot.grid, snapshot.food) {
        buffer.set_string(x, y, GLYPH_FOOD, Style::new().fg(theme.food));
    }

    if let Some((x, y)) = snapshot
        .bonus
        .and_then(|bonus| logical_to_terminal(inner, snapshot.grid, bonus))
    {
        buffer.set_string(
            x,
            y,
            GLYPH_BONUS,
            Style::new().fg(theme.bonus).add_modifier(Modifier::BOLD),
        );
    }
}

fn render_snake(frame: &mut Frame<'_>, inner: Rect, snapshot: &Snapshot, theme: &Theme) {
    let buffer = frame.buffer_mut();

    for (index, segment) in snapshot.snake.iter().enumerate().rev() {
        let Some((x, y)) = logical_to_terminal(inner, snapshot.grid, *segment) else {
            continue;
        };

        let color = if index == 0 {
            theme.snake_head
        } else {
            theme.snake_body
        };
        buffer.set_string(x, y, GLYPH_SNAKE, Style::new().fg(color));
    }
}

fn logical_to_terminal(inner: Rect, grid: GridSize, cell: Cell) -> Option<(u16, u16)> {
    if !grid.contains(cell) {
        return None;
    }

    let x_offset = u16::try_from(cell.col).ok()?.checked_mul(CELL_WIDTH)?;
    let y_offset = u16::try_from(cell.row).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x.saturating_add(CELL_WIDTH) > inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}
