use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, LegendPosition, Widget};

use crate::ui::theme::Theme;

pub struct Series<'a> {
    pub name: &'a str,
    pub data: &'a [(f64, f64)],
    pub color: Color,
}

/// Braille line chart with fixed axis bounds.
pub struct LineChart<'a> {
    pub title: &'a str,
    pub series: Vec<Series<'a>>,
    pub x_label: &'a str,
    pub x_bounds: [f64; 2],
    pub y_label: &'a str,
    pub y_bounds: [f64; 2],
    pub theme: &'a Theme,
}

impl<'a> LineChart<'a> {
    pub fn new(title: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            series: Vec::new(),
            x_label: "",
            x_bounds: [0.0, 1.0],
            y_label: "",
            y_bounds: [0.0, 1.0],
            theme,
        }
    }

    pub fn series(mut self, name: &'a str, data: &'a [(f64, f64)], color: Color) -> Self {
        self.series.push(Series { name, data, color });
        self
    }

    pub fn x_axis(mut self, label: &'a str, bounds: [f64; 2]) -> Self {
        self.x_label = label;
        self.x_bounds = bounds;
        self
    }

    pub fn y_axis(mut self, label: &'a str, bounds: [f64; 2]) -> Self {
        self.y_label = label;
        self.y_bounds = bounds;
        self
    }
}

fn bound_labels(bounds: [f64; 2]) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| format!("{v:.0}"))
        .collect()
}

impl Widget for LineChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border()));

        if self.series.iter().all(|s| s.data.is_empty()) {
            block.render(area, buf);
            return;
        }

        let show_legend = self.series.len() > 1;
        let datasets: Vec<Dataset> = self
            .series
            .iter()
            .map(|s| {
                let dataset = Dataset::default()
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(s.color))
                    .data(s.data);
                if show_legend { dataset.name(s.name) } else { dataset }
            })
            .collect();

        let axis_style = Style::default().fg(colors.muted());
        let chart = Chart::new(datasets)
            .block(block)
            .legend_position(Some(LegendPosition::TopRight))
            .x_axis(
                Axis::default()
                    .title(self.x_label)
                    .style(axis_style)
                    .bounds(self.x_bounds)
                    .labels(bound_labels(self.x_bounds)),
            )
            .y_axis(
                Axis::default()
                    .title(self.y_label)
                    .style(axis_style)
                    .bounds(self.y_bounds)
                    .labels(bound_labels(self.y_bounds)),
            );

        chart.render(area, buf);
    }
}
