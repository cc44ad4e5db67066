//! Plotters-powered area-sensitivity chart widget for Ratatui.
//!
//! The chart answers one question for the property on screen: how would the
//! estimate move if only the area changed? The caller samples the pipeline
//! across the area domain (`PredictionPipeline::area_sweep`) and hands the
//! points over; this module only draws.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// Series and bounds are computed outside `render()`, so the widget holds no
/// state and can be rebuilt every frame.
pub struct SweepChart<'a> {
    /// `(area, value)` line across the area domain.
    pub curve: &'a [(f64, f64)],
    /// The estimate currently shown in the result panel.
    pub current: Option<(f64, f64)>,
    /// X bounds (square feet).
    pub x_bounds: [f64; 2],
    /// Y bounds (currency units, unscaled).
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Tick label formatting. The y axis is usually shown in millions.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for SweepChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        // Plotters requires a non-empty, finite coordinate range.
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        // The backend draws Plotters primitives through Ratatui's `Canvas`, so
        // the result lands directly in `buf`.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Values like "12.5M" need a slightly wider left gutter than
                // plain numbers.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes and tick labels only. Mesh lines at terminal resolution
            // turn into a wall of dots.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let curve_color = RGBColor(0, 255, 255); // cyan
            let current_color = RGBColor(255, 255, 0); // yellow

            // 1) Value across the whole area domain, other fields fixed.
            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;

            // 2) Marker for the estimate in the result panel. It always sits on
            //    the curve because both come from the same predictor.
            //
            // `Circle` radii are mis-scaled by the ratatui backend; a pixel is reliable.
            if let Some(point) = self.current {
                chart.draw_series(std::iter::once(Pixel::new(point, current_color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
