use eframe::egui::{self, Color32, Ui};

use crate::color::ColorScale;
use crate::data::model::Column;
use crate::data::summary::{city_means, mean};
use crate::state::AppState;
use crate::ui::plot;
use crate::ui::table::ranking_table;

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

pub fn overview(ui: &mut Ui, state: &AppState) {
    ui.heading("Overview Analysis");
    let (Some(view), Some(summary), Some(colors)) =
        (state.view(), &state.summary, &state.category_colors)
    else {
        return;
    };
    let bins = state.config.histogram_bins;

    ui.columns(2, |cols: &mut [Ui]| {
        plot::pie_chart(
            &mut cols[0],
            "Distribution by Score Category",
            &summary.category_counts,
            colors,
        );
        plot::histogram_chart(
            &mut cols[1],
            "composite_hist",
            "Composite Score Distribution",
            &view,
            Column::CompositeScore,
            bins,
            Color32::from_rgb(0x1f, 0x77, 0xb4),
        );
    });

    ui.add_space(12.0);
    let n = state.config.top_n;
    ui.columns(2, |cols: &mut [Ui]| {
        ranking_table(
            &mut cols[0],
            "top_table",
            &format!("🏆 Top {n} Zip Codes by Composite Score"),
            view.dataset(),
            &summary.top,
        );
        ranking_table(
            &mut cols[1],
            "bottom_table",
            &format!("📉 Bottom {n} Zip Codes by Composite Score"),
            view.dataset(),
            &summary.bottom,
        );
    });
}

// ---------------------------------------------------------------------------
// Score Analysis
// ---------------------------------------------------------------------------

/// Takes the state mutably for the scatter axis pickers.
pub fn score_analysis(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Score Analysis");
    let Some(summary) = state.summary.clone() else {
        return;
    };

    let averages: Vec<(String, f64)> = Column::COMPONENT_SCORES
        .iter()
        .filter_map(|&c| summary.mean(c).map(|m| (c.name().to_string(), m)))
        .collect();

    ui.columns(2, |cols: &mut [Ui]| {
        plot::labelled_bars(
            &mut cols[0],
            "component_bars",
            "Average Scores by Component",
            "Average Score",
            &averages,
            ColorScale::Viridis,
        );
        plot::correlation_heatmap(
            &mut cols[1],
            "Score Components Correlation Matrix",
            &summary.correlations,
        );
    });

    ui.add_space(12.0);
    ui.strong("Score Relationships");
    ui.horizontal(|ui: &mut Ui| {
        axis_picker(ui, "x_score", "X-axis Score", &mut state.scatter_x, &Column::COMPONENT_SCORES);
        axis_picker(ui, "y_score", "Y-axis Score", &mut state.scatter_y, &Column::SCORES);
    });

    let (x, y) = (state.scatter_x, state.scatter_y);
    let (Some(view), Some(colors)) = (state.view(), &state.category_colors) else {
        return;
    };
    plot::category_scatter(
        ui,
        "score_scatter",
        &format!("{} vs {}", x.label(), y.label()),
        &view,
        (x, y),
        Column::EstimatedPopulation,
        colors,
    );
}

fn axis_picker(ui: &mut Ui, id: &str, label: &str, current: &mut Column, options: &[Column]) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.name())
        .show_ui(ui, |ui: &mut Ui| {
            for &col in options {
                ui.selectable_value(current, col, col.name());
            }
        });
}

// ---------------------------------------------------------------------------
// Economic Metrics
// ---------------------------------------------------------------------------

pub fn economic_metrics(ui: &mut Ui, state: &AppState) {
    ui.heading("Economic Metrics");
    let Some(view) = state.view() else {
        return;
    };
    let view = &view;
    let bins = state.config.histogram_bins;

    ui.columns(2, |cols: &mut [Ui]| {
        plot::histogram_chart(
            &mut cols[0],
            "income_hist",
            "Median Income Distribution",
            view,
            Column::MedianIncome,
            bins,
            Color32::from_rgb(0x2c, 0xa0, 0x2c),
        );
        plot::histogram_chart(
            &mut cols[1],
            "home_hist",
            "Median Home Value Distribution",
            view,
            Column::MedianHomeValue,
            bins,
            Color32::from_rgb(0xff, 0x7f, 0x0e),
        );
    });

    plot::gradient_scatter(
        ui,
        "income_vs_home",
        "Median Income vs Median Home Value",
        view,
        (Column::MedianIncome, Column::MedianHomeValue),
        Column::CompositeScore,
        Column::EstimatedPopulation,
        ColorScale::Viridis,
    );

    let limit = state.config.city_bar_limit;
    let income = city_means(view, Column::MedianIncome, limit);
    let home = city_means(view, Column::MedianHomeValue, limit);
    ui.columns(2, |cols: &mut [Ui]| {
        plot::horizontal_bars(
            &mut cols[0],
            "city_income",
            &format!("Top {limit} Cities by Average Median Income"),
            "Average Median Income ($)",
            &income,
            ColorScale::Greens,
        );
        plot::horizontal_bars(
            &mut cols[1],
            "city_home",
            &format!("Top {limit} Cities by Average Home Value"),
            "Average Home Value ($)",
            &home,
            ColorScale::Oranges,
        );
    });
}

// ---------------------------------------------------------------------------
// Demographics
// ---------------------------------------------------------------------------

pub fn demographics(ui: &mut Ui, state: &AppState) {
    ui.heading("Demographics & Location Metrics");
    let Some(view) = state.view() else {
        return;
    };
    let view = &view;
    let bins = state.config.histogram_bins;

    let charts = [
        (
            "pop_hist",
            "Population Distribution",
            Column::EstimatedPopulation,
            Color32::from_rgb(0x94, 0x67, 0xbd),
        ),
        (
            "density_hist",
            "Population Density Distribution",
            Column::PopulationDensity,
            Color32::from_rgb(0x8c, 0x56, 0x4b),
        ),
        (
            "transit_hist",
            "Public Transit Usage Distribution",
            Column::PublicTransitPct,
            Color32::from_rgb(0xe3, 0x77, 0xc2),
        ),
        (
            "education_hist",
            "Education Level Distribution",
            Column::EducationPct,
            Color32::from_rgb(0x7f, 0x7f, 0x7f),
        ),
    ];
    for pair in charts.chunks(2) {
        ui.columns(2, |cols: &mut [Ui]| {
            for (ui, (id, title, column, color)) in cols.iter_mut().zip(pair) {
                plot::histogram_chart(ui, id, title, view, *column, bins, *color);
            }
        });
        ui.add_space(8.0);
    }

    plot::gradient_scatter(
        ui,
        "pop_vs_density",
        "Population vs Population Density",
        view,
        (Column::EstimatedPopulation, Column::PopulationDensity),
        Column::CompositeScore,
        Column::MedianIncome,
        ColorScale::Plasma,
    );

    if let Some(transit) = mean(view, Column::PublicTransitPct) {
        ui.label(format!("Average public transit usage: {transit:.1}%"));
    }
}
