use eframe::egui;

use crate::state::AppState;
use crate::ui::table::TaskTable;
use crate::ui::{metrics, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TrackerApp {
    pub state: AppState,
    table: TaskTable,
}

impl TrackerApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            table: TaskTable::default(),
        }
    }
}

impl eframe::App for TrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: heading, metrics, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.state.config.title.as_str());
            ui.label(self.state.config.subtitle.as_str());
            ui.label("The table shows the stories matching the filters applied on the left. Make sure you save your changes.");
            ui.separator();

            metrics::metrics_section(ui, &self.state);
            ui.separator();

            egui::ScrollArea::horizontal().show(ui, |ui| {
                self.table.show(ui, &mut self.state);
            });
        });
    }
}
