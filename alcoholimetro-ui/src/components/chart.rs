//! Chart Component
//!
//! Line chart of recorded readings drawn on an HTML5 canvas from the
//! Chart.js-shaped [`ChartConfig`].

use alcoholimetro::ChartConfig;
use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const BACKGROUND: &str = "#ffffff";
const GRID_COLOR: &str = "#e5e7eb";
const TEXT_COLOR: &str = "#6b7280";
const MAX_X_LABELS: usize = 6;

/// Reading chart; renders nothing when there are no samples
#[component]
pub fn AlcoholChart(config: Option<ChartConfig>) -> impl IntoView {
    let Some(config) = config else {
        return None;
    };
    let canvas_ref = create_node_ref::<html::Canvas>();

    // Draw once the canvas is mounted
    let chart = config.clone();
    create_effect(move |_| {
        if let Some(canvas) = canvas_ref.get() {
            draw_chart(&canvas, &chart);
        }
    });

    let legend = config
        .series()
        .map(|s| s.label.clone())
        .unwrap_or_default();

    Some(view! {
        <div>
            <canvas
                id="alcoholChart"
                node_ref=canvas_ref
                width="800"
                height="400"
                class="w-100"
                aria-label=legend.clone()
            />
            <p class="text-center text-muted small mt-2">{legend}</p>
        </div>
    })
}

/// Draw the chart on canvas
fn draw_chart(canvas: &HtmlCanvasElement, config: &ChartConfig) {
    let Some(series) = config.series() else {
        return;
    };

    let ctx = match canvas.get_context("2d") {
        Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
            Ok(ctx) => ctx,
            Err(_) => return,
        },
        _ => return,
    };

    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    // Margins
    let margin_left = 60.0;
    let margin_right = 20.0;
    let margin_top = 20.0;
    let margin_bottom = 40.0;

    let chart_width = width - margin_left - margin_right;
    let chart_height = height - margin_top - margin_bottom;

    ctx.set_fill_style(&BACKGROUND.into());
    ctx.fill_rect(0.0, 0.0, width, height);

    let y_min = config.y_min();
    let y_max = config.y_max();
    let y_span = if y_max > y_min { y_max - y_min } else { 1.0 };

    // Horizontal grid lines with y-axis labels
    ctx.set_stroke_style(&GRID_COLOR.into());
    ctx.set_line_width(1.0);
    ctx.set_font("12px sans-serif");
    for i in 0..=5 {
        let y = margin_top + (i as f64 / 5.0) * chart_height;
        ctx.begin_path();
        ctx.move_to(margin_left, y);
        ctx.line_to(width - margin_right, y);
        ctx.stroke();

        let value = y_max - (i as f64 / 5.0) * y_span;
        ctx.set_fill_style(&TEXT_COLOR.into());
        let _ = ctx.fill_text(&format!("{:.1}", value), 5.0, y + 4.0);
    }

    let points = series.data.len();
    let x_at = |i: usize| {
        if points > 1 {
            margin_left + (i as f64 / (points - 1) as f64) * chart_width
        } else {
            margin_left + chart_width / 2.0
        }
    };
    // Canvas y grows downward
    let y_at = |value: f64| margin_top + ((y_max - value) / y_span) * chart_height;

    ctx.set_stroke_style(&series.border_color.as_str().into());
    ctx.set_line_width(2.0);
    ctx.begin_path();
    for (i, value) in series.data.iter().enumerate() {
        if i == 0 {
            ctx.move_to(x_at(i), y_at(*value));
        } else {
            ctx.line_to(x_at(i), y_at(*value));
        }
    }
    ctx.stroke();

    ctx.set_fill_style(&series.border_color.as_str().into());
    for (i, value) in series.data.iter().enumerate() {
        ctx.begin_path();
        let _ = ctx.arc(x_at(i), y_at(*value), 3.0, 0.0, std::f64::consts::PI * 2.0);
        ctx.fill();
    }

    // X-axis labels, thinned out for long series
    ctx.set_fill_style(&TEXT_COLOR.into());
    let step = label_step(config.data.labels.len());
    for (i, label) in config.data.labels.iter().enumerate().step_by(step) {
        let _ = ctx.fill_text(label, x_at(i) - 20.0, height - 10.0);
    }
}

/// Every n-th label so at most `MAX_X_LABELS` are drawn
fn label_step(count: usize) -> usize {
    count.div_ceil(MAX_X_LABELS).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_step() {
        assert_eq!(label_step(0), 1);
        assert_eq!(label_step(4), 1);
        assert_eq!(label_step(6), 1);
        assert_eq!(label_step(7), 2);
        assert_eq!(label_step(60), 10);
    }
}
