//! ChartPanel component — the four page charts in a 2×2 grid.
//!
//! Reads the instances owned by `ChartSlots`; it never derives data itself.

use ratatui::crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    charts::{BarDatum, ChartData, ChartKind, ScatterData},
    component::Component,
    theme::{
        style_muted, style_secondary, C_CHART_ACOUSTIC, C_CHART_DURATION, C_CHART_SCATTER,
        C_CHART_TEMPO, C_MUTED, C_PRIMARY,
    },
    widgets::pane_chrome::pane_chrome,
};

pub struct ChartPanel;

impl ChartPanel {
    pub fn new() -> Self {
        Self
    }
}

fn chart_color(kind: ChartKind) -> Color {
    match kind {
        ChartKind::Scatter => C_CHART_SCATTER,
        ChartKind::DurationHistogram => C_CHART_DURATION,
        ChartKind::Acousticness => C_CHART_ACOUSTIC,
        ChartKind::Tempo => C_CHART_TEMPO,
    }
}

impl Component for ChartPanel {
    fn id(&self) -> ComponentId {
        ComponentId::Charts
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn handle_mouse(&mut self, _event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let rows = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let mut cells = Vec::with_capacity(4);
        for row in rows.iter() {
            let cols = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row);
            cells.extend(cols.iter().copied());
        }

        for (kind, cell) in ChartKind::ALL.into_iter().zip(cells) {
            let block = pane_chrome(kind.title(), focused, None);
            match state.charts.get(kind).map(|c| &c.data) {
                Some(ChartData::Scatter(data)) => draw_scatter(frame, cell, block, data),
                Some(ChartData::Bars(bars)) => draw_bars(frame, cell, block, bars, chart_color(kind)),
                None => {
                    let inner = block.inner(cell);
                    frame.render_widget(block, cell);
                    frame.render_widget(
                        Paragraph::new(Span::styled("  no data", style_muted())),
                        inner,
                    );
                }
            }
        }
    }
}

fn draw_scatter(frame: &mut Frame, area: Rect, block: Block, data: &ScatterData) {
    let dataset = Dataset::default()
        .name("danceability")
        .marker(Marker::Braille)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(C_CHART_SCATTER))
        .data(&data.points);

    let [x0, x1] = data.x_bounds;
    let x_axis = Axis::default()
        .title(Span::styled("song id", style_muted()))
        .style(Style::default().fg(C_MUTED))
        .bounds(data.x_bounds)
        .labels(vec![format!("{:.0}", x0), format!("{:.0}", x1)]);
    let y_axis = Axis::default()
        .style(Style::default().fg(C_MUTED))
        .bounds(ScatterData::Y_BOUNDS)
        .labels(vec!["0", "0.5", "1"]);

    frame.render_widget(
        Chart::new(vec![dataset])
            .block(block)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(None),
        area,
    );
}

fn draw_bars(frame: &mut Frame, area: Rect, block: Block, data: &[BarDatum], color: Color) {
    let inner_width = block.inner(area).width as usize;
    let n = data.len().max(1);
    let bar_width = (inner_width.saturating_sub(n) / n).clamp(1, 12) as u16;

    let bars: Vec<Bar> = data
        .iter()
        .map(|d| {
            Bar::default()
                .value(d.value)
                .text_value(d.text.clone())
                .label(Line::from(truncate_to_width(&d.label, bar_width as usize)))
        })
        .collect();

    frame.render_widget(
        BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1)
            .bar_style(Style::default().fg(color))
            .value_style(Style::default().fg(C_PRIMARY).bg(color))
            .label_style(style_secondary()),
        area,
    );
}

/// Cut `text` to at most `width` terminal columns.
fn truncate_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

impl Default for ChartPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::tests::song;
    use crate::view_state::ViewState;
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;

    #[test]
    fn test_truncate_respects_wide_chars() {
        assert_eq!(truncate_to_width("Hey Jude", 3), "Hey");
        assert_eq!(truncate_to_width("日本語", 4), "日本");
        assert_eq!(truncate_to_width("ok", 10), "ok");
    }

    #[test]
    fn test_draws_empty_and_loaded_slots() {
        let mut state = AppState::new(
            ViewState::new(10, false),
            "http://test".into(),
            PathBuf::from("."),
            PathBuf::from("x.log"),
        );
        let mut panel = ChartPanel::new();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal
            .draw(|f| panel.draw(f, f.area(), false, &state))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("no data"));

        state
            .charts
            .render(&[song(1, "alpha", 120.0), song(2, "beta", 90.0)]);
        terminal
            .draw(|f| panel.draw(f, f.area(), false, &state))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(!text.contains("no data"));
        assert!(text.contains("tempo"));
    }
}
