use eframe::egui::{self, Align, Layout, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::{CellValue, Dataset, Edit};
use crate::state::AppState;

const ROW_HEIGHT: f32 = 22.0;

// ---------------------------------------------------------------------------
// Editable task table (central panel)
// ---------------------------------------------------------------------------

/// The cell currently open for typing.
struct OpenCell {
    index: usize,
    column: String,
    buffer: String,
    /// Focus is grabbed once, on the frame the cell opens.
    fresh: bool,
}

/// Table editor. Free-text cells open on click and commit when they lose focus;
/// status and assignee cells are edited through their pick-lists.
#[derive(Default)]
pub struct TaskTable {
    open: Option<OpenCell>,
}

impl TaskTable {
    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let shared: &AppState = state;
        let Some(view) = shared.view.as_ref() else {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a tracker file to get started  (File → Open…)");
            });
            return;
        };

        if view.is_empty() {
            ui.label("No stories match the current filters.");
            return;
        }

        let columns = shared.display_columns(view);
        let mut edits: Vec<Edit> = Vec::new();

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(TableColumn::auto().at_least(90.0).clip(true), columns.len())
            .header(ROW_HEIGHT, |mut header| {
                for name in &columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, view.len(), |mut row| {
                    let pos = row.index();
                    let index = view.index()[pos];
                    for name in &columns {
                        row.col(|ui: &mut Ui| {
                            if let Some(edit) = self.cell(ui, shared, view, pos, index, name) {
                                edits.push(edit);
                            }
                        });
                    }
                });
            });

        for edit in edits {
            let result = state.commit_edit(edit);
            state.report("Edit", result);
        }
    }

    fn cell(
        &mut self,
        ui: &mut Ui,
        state: &AppState,
        view: &Dataset,
        pos: usize,
        index: usize,
        column: &str,
    ) -> Option<Edit> {
        let value = view
            .column(column)
            .map(|c| c.values[pos].clone())
            .unwrap_or(CellValue::Null);
        let text = value.to_csv_field();

        if let Some(choices) = state.config.choices_for(column) {
            return pick_list(ui, state, index, column, &text, choices);
        }

        match &mut self.open {
            Some(open) if open.index == index && open.column == column => {
                let response = ui.text_edit_singleline(&mut open.buffer);
                if open.fresh {
                    response.request_focus();
                    open.fresh = false;
                }
                if response.lost_focus() {
                    let edit = (open.buffer != text).then(|| Edit {
                        index,
                        column: column.to_string(),
                        text: open.buffer.clone(),
                    });
                    self.open = None;
                    return edit;
                }
                None
            }
            _ => {
                let label = if value.is_null() {
                    RichText::new("—").weak()
                } else {
                    RichText::new(&text)
                };
                if ui.add(egui::Label::new(label).sense(egui::Sense::click())).clicked() {
                    self.open = Some(OpenCell {
                        index,
                        column: column.to_string(),
                        buffer: text,
                        fresh: true,
                    });
                }
                None
            }
        }
    }
}

/// Combo box over the configured options plus whatever the cell holds now.
fn pick_list(
    ui: &mut Ui,
    state: &AppState,
    index: usize,
    column: &str,
    current: &str,
    choices: &[String],
) -> Option<Edit> {
    let mut picked: Option<String> = None;
    let color = (column == state.color_map.column).then(|| state.color_map.color_for(current));
    let mut selected_text = RichText::new(current);
    if let Some(c) = color {
        selected_text = selected_text.color(c);
    }

    egui::ComboBox::from_id_salt((column, index))
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            let extra = (!current.is_empty() && !choices.iter().any(|c| c == current))
                .then_some(current);
            for choice in choices.iter().map(String::as_str).chain(extra) {
                if ui.selectable_label(choice == current, choice).clicked() && choice != current {
                    picked = Some(choice.to_string());
                }
            }
        });

    picked.map(|text| Edit {
        index,
        column: column.to_string(),
        text,
    })
}
