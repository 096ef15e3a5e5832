use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::engine::SimulationState;
use crate::geometry::{GridSize, Point};
use crate::snapshot::Snapshot;

const GLYPH_HEAD: &str = "█";
const GLYPH_BODY: &str = "▓";
const GLYPH_FOOD: &str = "●";

/// Everything drawn besides the board itself.
#[derive(Debug, Clone)]
pub struct HudInfo<'a> {
    pub state: SimulationState,
    pub high_score: u32,
    pub tick_interval: Duration,
    pub autopilot: bool,
    pub advice: &'a str,
}

/// Renders one frame from a snapshot; never sees the live engine.
pub fn render(frame: &mut Frame<'_>, snapshot: &Snapshot, hud: &HudInfo<'_>) {
    let [board_area, status_area, advice_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let block = Block::bordered()
        .title(" snake ")
        .border_style(Style::new().fg(Color::DarkGray));
    let inner = block.inner(board_area);
    frame.render_widget(block, board_area);

    render_board(frame, inner, snapshot);

    frame.render_widget(
        Paragraph::new(status_line(snapshot, hud)).style(Style::new().fg(Color::White)),
        status_area,
    );
    let advice = truncate_to_width(hud.advice, usize::from(advice_area.width));
    frame.render_widget(
        Paragraph::new(advice).style(Style::new().fg(Color::Cyan)),
        advice_area,
    );

    match hud.state {
        SimulationState::Ready => render_popup(
            frame,
            board_area,
            " ready ",
            vec![
                Line::from("SNAKE"),
                Line::from(""),
                Line::from(format!("High score: {}", hud.high_score)),
                Line::from("[Enter] Start  [Q] Quit"),
            ],
        ),
        SimulationState::Paused => render_popup(
            frame,
            board_area,
            " pause ",
            vec![
                Line::from("PAUSED"),
                Line::from(""),
                Line::from("[P]/[Space] Resume  [R] Restart"),
            ],
        ),
        SimulationState::GameOver => render_popup(
            frame,
            board_area,
            " game over ",
            vec![
                Line::from("GAME OVER"),
                Line::from(""),
                Line::from(format!("Score: {}", snapshot.score)),
                Line::from(format!("High score: {}", hud.high_score.max(snapshot.score))),
                Line::from("[R] Play again  [Q] Quit"),
            ],
        ),
        SimulationState::Playing => {}
    }
}

fn render_board(frame: &mut Frame<'_>, inner: Rect, snapshot: &Snapshot) {
    let bounds = snapshot.bounds();
    let buffer = frame.buffer_mut();

    if let Some((x, y)) = grid_to_terminal(inner, bounds, snapshot.food) {
        buffer.set_string(x, y, GLYPH_FOOD, Style::new().fg(Color::Red));
    }

    for (index, segment) in snapshot.body.iter().enumerate() {
        let Some((x, y)) = grid_to_terminal(inner, bounds, *segment) else {
            continue;
        };
        if index == 0 {
            buffer.set_string(
                x,
                y,
                GLYPH_HEAD,
                Style::new().fg(Color::LightGreen).add_modifier(Modifier::BOLD),
            );
        } else {
            buffer.set_string(x, y, GLYPH_BODY, Style::new().fg(Color::Green));
        }
    }
}

fn render_popup(frame: &mut Frame<'_>, area: Rect, title: &str, lines: Vec<Line<'_>>) {
    let popup = centered_popup(area, 60, 40);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(title)),
        popup,
    );
}

fn status_line(snapshot: &Snapshot, hud: &HudInfo<'_>) -> String {
    format!(
        " Score {}  Hi {}  Len {}  {}ms  {}{}",
        snapshot.score,
        hud.high_score,
        snapshot.len(),
        hud.tick_interval.as_millis(),
        state_label(hud.state),
        if hud.autopilot { "  [autopilot]" } else { "" },
    )
}

fn state_label(state: SimulationState) -> &'static str {
    match state {
        SimulationState::Ready => "ready",
        SimulationState::Playing => "playing",
        SimulationState::Paused => "paused",
        SimulationState::GameOver => "game over",
    }
}

/// Cuts `text` to at most `max_width` terminal columns.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width > max_width {
            break;
        }
        used += width;
        out.push(ch);
    }
    out
}

fn grid_to_terminal(inner: Rect, bounds: GridSize, point: Point) -> Option<(u16, u16)> {
    if !point.is_within_bounds(bounds) {
        return None;
    }

    let x = inner.x.saturating_add(u16::try_from(point.x).ok()?);
    let y = inner.y.saturating_add(u16::try_from(point.y).ok()?);
    if x >= inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}

fn centered_popup(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let [_, mid, _] = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .areas(mid);

    center
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use crate::geometry::{GridSize, Point};

    use super::{grid_to_terminal, truncate_to_width};

    #[test]
    fn truncation_counts_wide_characters() {
        assert_eq!(truncate_to_width("abcdef", 4), "abcd");
        assert_eq!(truncate_to_width("蛇蛇蛇", 5), "蛇蛇");
        assert_eq!(truncate_to_width("ok", 10), "ok");
    }

    #[test]
    fn grid_points_outside_board_or_area_are_skipped() {
        let inner = Rect::new(1, 1, 5, 3);
        let bounds = GridSize::new(10, 10);

        assert_eq!(grid_to_terminal(inner, bounds, Point::new(0, 0)), Some((1, 1)));
        assert_eq!(grid_to_terminal(inner, bounds, Point::new(4, 2)), Some((5, 3)));
        assert_eq!(grid_to_terminal(inner, bounds, Point::new(5, 0)), None);
        assert_eq!(grid_to_terminal(inner, bounds, Point::new(-1, 0)), None);
    }
}
