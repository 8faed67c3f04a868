use eframe::egui::{self, RichText, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::data::aggregate::CategorySummary;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Metric cards and status chart
// ---------------------------------------------------------------------------

/// Render the collapsible metrics section.
pub fn metrics_section(ui: &mut Ui, state: &AppState) {
    let (Some(status), Some(assignees)) = (state.status_summary(), state.assignee_summary())
    else {
        return;
    };

    egui::CollapsingHeader::new(RichText::new("See metrics").strong())
        .id_salt("metrics")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.label(format!("Story status metrics ({} stories)", status.total));
            metric_cards(ui, &status);
            ui.add_space(6.0);

            ui.label("Stories per assignee");
            metric_cards(ui, &assignees);
            ui.add_space(6.0);

            status_chart(ui, state, &status);
        });
}

fn metric_cards(ui: &mut Ui, summary: &CategorySummary) {
    if summary.entries.is_empty() {
        return;
    }
    ui.columns(summary.entries.len(), |cols: &mut [Ui]| {
        for (col, (label, count)) in cols.iter_mut().zip(&summary.entries) {
            col.vertical(|ui: &mut Ui| {
                ui.label(label.as_str());
                ui.label(RichText::new(count.to_string()).heading());
            });
        }
    });
    if summary.other > 0 {
        ui.label(RichText::new(format!("{} with other values", summary.other)).weak());
    }
}

fn status_chart(ui: &mut Ui, state: &AppState, summary: &CategorySummary) {
    let bars: Vec<Bar> = summary
        .entries
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            Bar::new(i as f64, *count as f64)
                .name(label)
                .fill(state.color_map.color_for(label))
                .width(0.7)
        })
        .collect();

    Plot::new("status_chart")
        .height(180.0)
        .y_axis_label("Stories")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_x(false)
        .legend(egui_plot::Legend::default())
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&state.config.status_column));
        });
}
