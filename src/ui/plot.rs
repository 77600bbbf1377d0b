use std::f32::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, Mesh, RichText, Sense, Shape, Ui, pos2, vec2};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, Points};

use crate::color::{CategoryColors, ColorScale};
use crate::data::filter::FilteredView;
use crate::data::model::{Column, format_thousands};
use crate::data::summary::{CorrelationMatrix, Histogram, histogram};

pub const CHART_HEIGHT: f32 = 300.0;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Placeholder shown instead of a chart when there is nothing to draw.
pub fn empty_state(ui: &mut Ui, title: &str) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_height(CHART_HEIGHT * 0.4);
        ui.vertical_centered(|ui: &mut Ui| {
            ui.strong(title);
            ui.add_space(8.0);
            ui.label(RichText::new("No data for the current filters").italics().weak());
        });
    });
}

fn chart_title(ui: &mut Ui, title: &str) {
    ui.label(RichText::new(title).strong().size(15.0));
}

/// Bubble radius from a size value normalised into `[min, max]`.
fn bubble_radius(value: Option<f64>, bounds: Option<(f64, f64)>) -> f32 {
    match (value, bounds) {
        (Some(v), Some((lo, hi))) if hi > lo => 2.5 + 9.0 * ((v - lo) / (hi - lo)).sqrt() as f32,
        _ => 4.0,
    }
}

fn bounds(view: &FilteredView<'_>, column: Column) -> Option<(f64, f64)> {
    view.records()
        .filter_map(|r| r.value(column))
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Histogram of one numeric column over the view.
pub fn histogram_chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    view: &FilteredView<'_>,
    column: Column,
    bins: usize,
    color: Color32,
) {
    let Some(hist) = histogram(view, column, bins) else {
        empty_state(ui, title);
        return;
    };
    chart_title(ui, title);
    draw_histogram(ui, id, &hist, column.label(), color);
}

fn draw_histogram(ui: &mut Ui, id: &str, hist: &Histogram, x_label: &str, color: Color32) {
    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            Bar::new(hist.center(i), n as f64)
                .width(hist.bin_width * 0.95)
                .name(format!(
                    "{:.1} – {:.1}",
                    hist.start + i as f64 * hist.bin_width,
                    hist.start + (i + 1) as f64 * hist.bin_width
                ))
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label("Number of Zip Codes")
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
        });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Vertical bars, one per labelled value, coloured along `scale`.
pub fn labelled_bars(
    ui: &mut Ui,
    id: &str,
    title: &str,
    y_label: &str,
    entries: &[(String, f64)],
    scale: ColorScale,
) {
    if entries.is_empty() {
        empty_state(ui, title);
        return;
    }
    chart_title(ui, title);

    let (lo, hi) = value_bounds(entries);
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (label, v))| {
            Bar::new(i as f64, *v)
                .width(0.7)
                .name(label)
                .fill(scale.sample_range(*v, lo, hi))
        })
        .collect();
    let labels: Vec<String> = entries.iter().map(|(l, _)| l.clone()).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .include_y(0.0)
        .allow_scroll(false)
        .x_axis_formatter(move |mark: GridMark, _range| category_tick(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Horizontal bars (e.g. top cities), first entry on top.
pub fn horizontal_bars(
    ui: &mut Ui,
    id: &str,
    title: &str,
    x_label: &str,
    entries: &[(String, f64)],
    scale: ColorScale,
) {
    if entries.is_empty() {
        empty_state(ui, title);
        return;
    }
    chart_title(ui, title);

    let (lo, hi) = value_bounds(entries);
    let n = entries.len();
    // Highest value first means plotting it at the largest y.
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (label, v))| {
            Bar::new((n - 1 - i) as f64, *v)
                .width(0.7)
                .name(label)
                .fill(scale.sample_range(*v, lo, hi))
        })
        .collect();
    let labels: Vec<String> = entries.iter().rev().map(|(l, _)| l.clone()).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .include_x(0.0)
        .allow_scroll(false)
        .y_axis_formatter(move |mark: GridMark, _range| category_tick(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn value_bounds(entries: &[(String, f64)]) -> (f64, f64) {
    entries.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
        (lo.min(*v), hi.max(*v))
    })
}

/// Axis label for integer grid marks that index into `labels`.
fn category_tick(labels: &[String], value: f64) -> String {
    if value < 0.0 || (value - value.round()).abs() > 1e-6 {
        return String::new();
    }
    labels.get(value.round() as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Scatter plots
// ---------------------------------------------------------------------------

/// Scatter coloured by score category (one legend entry per category),
/// bubble size from `size_by`.
pub fn category_scatter(
    ui: &mut Ui,
    id: &str,
    title: &str,
    view: &FilteredView<'_>,
    (x, y): (Column, Column),
    size_by: Column,
    colors: &CategoryColors,
) {
    let size_bounds = bounds(view, size_by);
    let mut groups: Vec<(String, Vec<([f64; 2], f32)>)> = Vec::new();
    for r in view.records() {
        let (Some(xv), Some(yv)) = (r.value(x), r.value(y)) else {
            continue;
        };
        let radius = bubble_radius(r.value(size_by), size_bounds);
        match groups.iter_mut().find(|(c, _)| *c == r.score_category) {
            Some((_, pts)) => pts.push(([xv, yv], radius)),
            None => groups.push((r.score_category.clone(), vec![([xv, yv], radius)])),
        }
    }
    if groups.is_empty() {
        empty_state(ui, title);
        return;
    }
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    chart_title(ui, title);

    Plot::new(id)
        .height(CHART_HEIGHT * 1.3)
        .legend(Legend::default())
        .x_axis_label(x.label())
        .y_axis_label(y.label())
        .show(ui, |plot_ui| {
            for (category, pts) in groups {
                let color = colors.color_for(&category);
                // Items sharing a name share one legend entry.
                for (p, radius) in pts {
                    plot_ui.points(
                        Points::new(vec![p])
                            .radius(radius)
                            .color(color.gamma_multiply(0.8))
                            .name(&category),
                    );
                }
            }
        });
}

/// Scatter coloured along a continuous scale by `color_by`, sized by `size_by`.
#[allow(clippy::too_many_arguments)]
pub fn gradient_scatter(
    ui: &mut Ui,
    id: &str,
    title: &str,
    view: &FilteredView<'_>,
    (x, y): (Column, Column),
    color_by: Column,
    size_by: Column,
    scale: ColorScale,
) {
    let color_bounds = bounds(view, color_by);
    let size_bounds = bounds(view, size_by);
    let points: Vec<([f64; 2], Color32, f32)> = view
        .records()
        .filter_map(|r| {
            let p = [r.value(x)?, r.value(y)?];
            let color = match (r.value(color_by), color_bounds) {
                (Some(v), Some((lo, hi))) => scale.sample_range(v, lo, hi),
                _ => Color32::GRAY,
            };
            Some((p, color, bubble_radius(r.value(size_by), size_bounds)))
        })
        .collect();
    if points.is_empty() {
        empty_state(ui, title);
        return;
    }
    chart_title(ui, title);
    if let Some((lo, hi)) = color_bounds {
        color_bar(ui, color_by.label(), scale, lo, hi);
    }

    Plot::new(id)
        .height(CHART_HEIGHT * 1.3)
        .x_axis_label(x.label())
        .y_axis_label(y.label())
        .show(ui, |plot_ui| {
            for (p, color, radius) in points {
                plot_ui.points(Points::new(vec![p]).radius(radius).color(color));
            }
        });
}

/// Small horizontal legend for a continuous scale.
fn color_bar(ui: &mut Ui, label: &str, scale: ColorScale, lo: f64, hi: f64) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(format!("{label}: {}", short_number(lo))).small());
        let (rect, _) = ui.allocate_exact_size(vec2(160.0, 10.0), Sense::hover());
        let steps = 32;
        let w = rect.width() / steps as f32;
        for i in 0..steps {
            let cell = egui::Rect::from_min_size(
                pos2(rect.left() + i as f32 * w, rect.top()),
                vec2(w + 0.5, rect.height()),
            );
            ui.painter()
                .rect_filled(cell, 0.0, scale.sample(i as f64 / (steps - 1) as f64));
        }
        ui.label(RichText::new(short_number(hi)).small());
    });
}

fn short_number(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format_thousands(v)
    } else {
        format!("{v:.1}")
    }
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

/// Pie of counts per label with a legend showing percentages.
pub fn pie_chart(ui: &mut Ui, title: &str, slices: &[(String, usize)], colors: &CategoryColors) {
    let total: usize = slices.iter().map(|(_, n)| n).sum();
    if total == 0 {
        empty_state(ui, title);
        return;
    }
    chart_title(ui, title);

    ui.horizontal(|ui: &mut Ui| {
        let side = CHART_HEIGHT * 0.85;
        let (rect, _) = ui.allocate_exact_size(vec2(side, side), Sense::hover());
        let center = rect.center();
        let radius = side * 0.48;

        let mut start = -TAU / 4.0;
        for (label, n) in slices {
            let sweep = TAU * *n as f32 / total as f32;
            let color = colors.color_for(label);
            // Fan of thin triangles keeps every piece convex.
            let segments = ((sweep / TAU) * 90.0).ceil().max(1.0) as usize;
            let mut mesh = Mesh::default();
            mesh.colored_vertex(center, color);
            for s in 0..=segments {
                let a = start + sweep * s as f32 / segments as f32;
                mesh.colored_vertex(center + radius * vec2(a.cos(), a.sin()), color);
            }
            for s in 0..segments as u32 {
                mesh.add_triangle(0, s + 1, s + 2);
            }
            ui.painter().add(Shape::mesh(mesh));

            let share = *n as f32 / total as f32;
            if share >= 0.05 {
                let mid = start + sweep / 2.0;
                ui.painter().text(
                    center + radius * 0.65 * vec2(mid.cos(), mid.sin()),
                    Align2::CENTER_CENTER,
                    format!("{:.1}%", share * 100.0),
                    FontId::proportional(12.0),
                    Color32::BLACK,
                );
            }
            start += sweep;
        }

        ui.vertical(|ui: &mut Ui| {
            for (label, n) in slices {
                ui.horizontal(|ui: &mut Ui| {
                    let (swatch, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, colors.color_for(label));
                    ui.label(format!("{label}  ({n})"));
                });
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Coloured grid of correlation coefficients; blank cells have no coefficient.
pub fn correlation_heatmap(ui: &mut Ui, title: &str, matrix: &CorrelationMatrix) {
    if matrix.values.iter().flatten().all(Option::is_none) {
        empty_state(ui, title);
        return;
    }
    chart_title(ui, title);

    let cell = vec2(62.0, 30.0);
    let label_width = 110.0;
    let font = FontId::proportional(11.0);
    let text_color = ui.visuals().text_color();

    let n = matrix.columns.len();
    let size = vec2(label_width + cell.x * n as f32, cell.y * (n as f32 + 1.5));
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);

    for (j, col) in matrix.columns.iter().enumerate() {
        painter.text(
            pos2(rect.left() + label_width + cell.x * (j as f32 + 0.5), rect.top() + cell.y * 0.5),
            Align2::CENTER_CENTER,
            short_label(*col),
            font.clone(),
            text_color,
        );
    }
    for (i, row_col) in matrix.columns.iter().enumerate() {
        let top = rect.top() + cell.y * (i as f32 + 1.0);
        painter.text(
            pos2(rect.left() + label_width - 6.0, top + cell.y * 0.5),
            Align2::RIGHT_CENTER,
            short_label(*row_col),
            font.clone(),
            text_color,
        );
        for j in 0..n {
            let cell_rect = egui::Rect::from_min_size(
                pos2(rect.left() + label_width + cell.x * j as f32, top),
                cell,
            )
            .shrink(1.0);
            match matrix.values[i][j] {
                Some(r) => {
                    painter.rect_filled(cell_rect, 2.0, ColorScale::RdBu.sample_range(r, -1.0, 1.0));
                    painter.text(
                        cell_rect.center(),
                        Align2::CENTER_CENTER,
                        format!("{r:.2}"),
                        font.clone(),
                        Color32::BLACK,
                    );
                }
                None => {
                    painter.rect_filled(cell_rect, 2.0, ui.visuals().faint_bg_color);
                }
            }
        }
    }
}

fn short_label(column: Column) -> &'static str {
    match column {
        Column::CompositeScore => "composite",
        Column::DensityScore => "density",
        Column::TransitScore => "transit",
        Column::IncomeScore => "income",
        Column::EducationScore => "education",
        Column::HousingScore => "housing",
        other => other.name(),
    }
}
