//! Layout and drawing: board, sliding tiles, sidebar (score, status, gesture feed), overlays.

use crate::board::{BOARD_SIZE, Pos};
use crate::game::GameState;
use crate::gesture::{GestureLink, LinkStatus};
use crate::rules::Phase;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget, Wrap};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Tile size in terminal cells; terminal cells are roughly twice as tall as wide.
const TILE_W: u16 = 8;
const TILE_H: u16 = 3;
const GAP_X: u16 = 2;
const GAP_Y: u16 = 1;

/// Board interior (tiles + gaps), without border.
const BOARD_INNER_W: u16 = BOARD_SIZE as u16 * (TILE_W + GAP_X) + GAP_X;
const BOARD_INNER_H: u16 = BOARD_SIZE as u16 * (TILE_H + GAP_Y) + GAP_Y;

const SIDEBAR_WIDTH: u16 = 28;

/// Smallest terminal that fits board, border and sidebar.
pub const MIN_WIDTH: u16 = BOARD_INNER_W + 2 + SIDEBAR_WIDTH;
pub const MIN_HEIGHT: u16 = BOARD_INNER_H + 2;

/// Fade-in of freshly spawned tiles.
const SPAWN_FADE_MS: u32 = 180;

/// Board (outer, with border) and sidebar rects, centred in `area`.
fn layout(area: Rect) -> (Rect, Rect) {
    let total_w = MIN_WIDTH;
    let x = area.x + area.width.saturating_sub(total_w) / 2;
    let y = area.y + area.height.saturating_sub(MIN_HEIGHT) / 2;
    let board = Rect {
        x,
        y,
        width: (BOARD_INNER_W + 2).min(area.width),
        height: MIN_HEIGHT.min(area.height),
    };
    let sidebar = Rect {
        x: x + board.width,
        y,
        width: SIDEBAR_WIDTH.min(area.width.saturating_sub(board.width)),
        height: board.height,
    };
    (board, sidebar)
}

fn board_inner(board_outer: Rect) -> Rect {
    Rect {
        x: board_outer.x + 1,
        y: board_outer.y + 1,
        width: BOARD_INNER_W.min(board_outer.width.saturating_sub(2)),
        height: BOARD_INNER_H.min(board_outer.height.saturating_sub(2)),
    }
}

/// Screen rect of a tile at a (possibly fractional) board coordinate.
fn tile_rect(inner: Rect, row: f32, col: f32) -> Rect {
    let x = f32::from(GAP_X) + col * f32::from(TILE_W + GAP_X);
    let y = f32::from(GAP_Y) + row * f32::from(TILE_H + GAP_Y);
    Rect {
        x: inner.x + x.round() as u16,
        y: inner.y + y.round() as u16,
        width: TILE_W,
        height: TILE_H,
    }
}

fn cell_rect(inner: Rect, pos: Pos) -> Rect {
    tile_rect(inner, pos.row as f32, pos.col as f32)
}

/// Ease-out so tiles decelerate into place.
fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t.clamp(0.0, 1.0)).powi(2)
}

/// Draw the whole screen. `slide_progress` is `Some(0.0..=1.0)` while a move
/// animates; the pending motions are drawn interpolated instead of the board.
pub fn draw(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    gesture: &GestureLink,
    slide_progress: Option<f32>,
    spawn_effect: &mut Option<Effect>,
    spawn_process_time: &mut Option<Instant>,
    now: Instant,
    animate: bool,
) {
    let area = frame.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        draw_too_small(frame, theme, area);
        return;
    }
    let (board_outer, sidebar) = layout(area);
    let inner = board_inner(board_outer);

    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
        .render(board_outer, frame.buffer_mut());
    draw_board(frame, state, theme, inner, slide_progress);

    if animate && slide_progress.is_none() && !state.spawned().is_empty() {
        apply_spawn_effect(frame, state, theme, inner, spawn_effect, spawn_process_time, now);
    }

    draw_sidebar(frame, state, theme, gesture, sidebar, now);

    if let Some(text) = state.overlay_text() {
        draw_overlay(frame, state, theme, board_outer, text);
    }
}

fn draw_too_small(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            " Terminal too small ",
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" need {}×{}, have {}×{} ", MIN_WIDTH, MIN_HEIGHT, area.width, area.height),
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, frame.buffer_mut());
}

fn draw_board(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    inner: Rect,
    slide_progress: Option<f32>,
) {
    let board = state.board();
    for pos in board.positions() {
        draw_tile(frame, theme, cell_rect(inner, pos), 0);
    }

    match (state.pending(), slide_progress) {
        (Some(pending), Some(t)) => {
            let t = ease_out(t);
            // Longest travellers last so they pass over tiles that stay put.
            let mut motions = pending.motions.clone();
            motions.sort_by_key(|m| m.distance());
            for m in motions {
                let row = m.from.row as f32 + (m.to.row as f32 - m.from.row as f32) * t;
                let col = m.from.col as f32 + (m.to.col as f32 - m.from.col as f32) * t;
                draw_tile(frame, theme, tile_rect(inner, row, col), pending.from.get(m.from));
            }
        }
        _ => {
            for pos in board.positions() {
                let value = board.get(pos);
                if value != 0 {
                    draw_tile(frame, theme, cell_rect(inner, pos), value);
                }
            }
        }
    }
}

fn draw_tile(frame: &mut Frame, theme: &Theme, rect: Rect, value: u32) {
    let bg = theme.tile_color(value);
    let label = if value == 0 {
        String::new()
    } else {
        value.to_string()
    };
    let style = Style::default()
        .fg(theme.tile_fg(value))
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let pad = usize::from(TILE_H / 2);
    let mut lines: Vec<Line> = (0..pad).map(|_| Line::from("")).collect();
    lines.push(Line::from(label));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(style)
        .render(rect.intersection(frame.area()), frame.buffer_mut());
}

/// Buffer positions covered by the given board cells.
fn tile_buffer_positions(inner: Rect, cells: &[Pos]) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for &pos in cells {
        let r = cell_rect(inner, pos);
        for x in r.x..r.x + r.width {
            for y in r.y..r.y + r.height {
                set.insert((x, y));
            }
        }
    }
    set
}

/// Create or advance the spawn fade (TachyonFX: new tiles fade in from the board background).
fn apply_spawn_effect(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    inner: Rect,
    spawn_effect: &mut Option<Effect>,
    spawn_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = spawn_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    *spawn_process_time = Some(now);

    if spawn_effect.is_none() {
        let cells = tile_buffer_positions(inner, state.spawned());
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            cells.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_from(theme.bg, theme.bg, (SPAWN_FADE_MS, Interpolation::QuadOut))
            .with_filter(filter)
            .with_area(inner);
        *spawn_effect = Some(effect);
    }

    if let Some(effect) = spawn_effect {
        frame.render_effect(effect, inner, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_sidebar(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    gesture: &GestureLink,
    area: Rect,
    now: Instant,
) {
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);
    let title_style = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);
    let fg_style = Style::default().fg(theme.main_fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(4),
            Constraint::Length(6),
            Constraint::Length(3),
        ])
        .split(area);

    // --- Score ---
    let score_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" 2048 ", title_style));
    let score_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best:  ", title_style),
            Span::styled(state.best.to_string(), fg_style),
        ]),
    ];
    Paragraph::new(score_lines)
        .block(score_block)
        .render(chunks[0], frame.buffer_mut());

    // --- Status ---
    Paragraph::new(Line::from(Span::styled(state.status_text(), fg_style)))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[1], frame.buffer_mut());

    // --- Gesture feed ---
    let gesture_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Gesture ", title_style));
    let gesture_inner = gesture_block.inner(chunks[2]);
    gesture_block.render(chunks[2], frame.buffer_mut());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(gesture_inner);

    let status = gesture.status();
    let status_color = match status {
        LinkStatus::Connected => Color::Green,
        LinkStatus::Connecting | LinkStatus::Reconnecting => Color::Yellow,
        LinkStatus::Disabled => theme.inactive_fg,
    };
    Paragraph::new(Line::from(Span::styled(status.label(), Style::default().fg(status_color))))
        .render(rows[0], frame.buffer_mut());

    if status != LinkStatus::Disabled {
        let shown = gesture.display_label(now);
        Paragraph::new(Line::from(Span::styled(
            shown.arrow(),
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(rows[1], frame.buffer_mut());

        Gauge::default()
            .ratio(gesture.proximity_ratio())
            .label(format!("Proximity: {:.1}", gesture.proximity()))
            .gauge_style(Style::default().fg(theme.tile_color(8)).bg(theme.div_line))
            .render(rows[3], frame.buffer_mut());
    }

    // --- Keys ---
    let hint_style = Style::default().fg(theme.inactive_fg);
    Paragraph::new(Line::from(vec![
        Span::styled("←↑↓→", Style::default().fg(theme.title)),
        Span::styled(" move  ", hint_style),
        Span::styled("R", Style::default().fg(theme.title)),
        Span::styled(" new  ", hint_style),
        Span::styled("Q", Style::default().fg(theme.title)),
        Span::styled(" quit", hint_style),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(border_style))
    .render(chunks[3], frame.buffer_mut());
}

fn draw_overlay(frame: &mut Frame, state: &GameState, theme: &Theme, board_outer: Rect, text: &str) {
    let popup_w = 30u16;
    let popup_h = 7u16;
    let popup = Rect {
        x: board_outer.x + board_outer.width.saturating_sub(popup_w) / 2,
        y: board_outer.y + board_outer.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(board_outer.width),
        height: popup_h.min(board_outer.height),
    };
    let winning = state.phase() == Phase::Won && !state.is_stuck();
    let (banner, hints) = if winning {
        (
            Style::default().fg(Color::Black).bg(theme.tile_color(2048)),
            " C — Keep going    R — Restart ",
        )
    } else {
        (
            Style::default().fg(Color::White).bg(Color::Red),
            " R — Restart    Q — Quit ",
        )
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {} ", text),
            banner.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", state.score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(hints, Style::default().fg(theme.main_fg))),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.title).bg(theme.bg))
                .style(Style::default().bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}
