use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::episode::{EpisodeEnd, EpisodeResult, Snapshot};
use crate::game::{CellKind, CollisionType};
use crate::metrics::EpisodeStats;

/// Everything the view needs to draw one frame
#[derive(Debug, Default)]
pub struct ViewState {
    pub dimensions: Option<(usize, usize)>,
    pub snapshot: Option<Snapshot>,
    pub last_result: Option<EpisodeResult>,
    pub stats: EpisodeStats,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, view: &ViewState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(view), chunks[0]);

        let board_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        match &view.snapshot {
            Some(snapshot) => frame.render_widget(self.render_grid(snapshot), board_area),
            None => frame.render_widget(self.render_waiting(view), board_area),
        }

        frame.render_widget(self.render_footer(view), chunks[2]);
    }

    fn render_grid(&self, snapshot: &Snapshot) -> Paragraph<'static> {
        let grid = &snapshot.grid;
        let mut lines = Vec::with_capacity(grid.rows());

        for row in 0..grid.rows() {
            let spans: Vec<Span> = grid.row(row).iter().map(|kind| cell_span(*kind)).collect();
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(format!(" Episode {} ", snapshot.episode + 1)),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, view: &ViewState) -> Paragraph<'static> {
        let (score, tick) = view
            .snapshot
            .as_ref()
            .map(|s| (s.score, s.tick))
            .unwrap_or((0, 0));

        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Tick: ", Style::default().fg(Color::Yellow)),
            Span::styled(tick.to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Best: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                view.stats.high_score().to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Mean: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{:.2}", view.stats.mean_score()),
                Style::default().fg(Color::White),
            ),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_waiting(&self, view: &ViewState) -> Paragraph<'static> {
        let message = match view.dimensions {
            Some((rows, columns)) => format!("Preparing {}x{} board...", rows, columns),
            None => "Waiting for the planner...".to_string(),
        };

        Paragraph::new(vec![Line::from(""), Line::from(message)])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
    }

    fn render_footer(&self, view: &ViewState) -> Paragraph<'static> {
        let mut spans = Vec::new();
        if let Some(result) = &view.last_result {
            spans.push(Span::styled(
                format!(
                    "Last episode: {} apples, {} ticks, {}",
                    result.score,
                    result.ticks,
                    end_label(result.end)
                ),
                Style::default().fg(Color::Gray),
            ));
            spans.push(Span::raw(" | "));
        }
        spans.push(Span::styled("Q", Style::default().fg(Color::Red)));
        spans.push(Span::raw(" to quit"));

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_span(kind: CellKind) -> Span<'static> {
    match kind {
        CellKind::Wall => Span::styled("██", Style::default().fg(Color::DarkGray)),
        CellKind::Head => Span::styled(
            "■ ",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        ),
        CellKind::Body | CellKind::Tail => {
            Span::styled("□ ", Style::default().fg(Color::White))
        }
        CellKind::Apple => Span::styled(
            "● ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        CellKind::Empty => Span::styled("  ", Style::default()),
    }
}

fn end_label(end: EpisodeEnd) -> &'static str {
    match end {
        EpisodeEnd::Collision(CollisionType::Wall) => "hit a wall",
        EpisodeEnd::Collision(CollisionType::Body) => "hit itself",
        EpisodeEnd::BoardFull => "filled the board",
        EpisodeEnd::TickLimit => "tick limit",
        EpisodeEnd::Interrupted => "interrupted",
    }
}
