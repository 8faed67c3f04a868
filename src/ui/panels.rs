use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{FilterControl, Selection};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let columns = match &state.dataset {
        Some(ds) => ds.column_names(),
        None => {
            ui.label("No tracker file loaded.");
            return;
        }
    };

    let mut enabled = state.filters_enabled;
    if ui.checkbox(&mut enabled, "Add filters").changed() {
        state.set_filters_enabled(enabled);
    }
    if !state.filters_enabled {
        ui.label("Check the box to filter the table. Filters on several columns combine.");
        return;
    }

    // ---- Column picker ----
    ui.strong("Filter table on");
    egui::ComboBox::from_id_salt("filter_columns")
        .selected_text(format!("{} column(s)", state.filter_columns.len()))
        .show_ui(ui, |ui: &mut Ui| {
            for col in &columns {
                let active = state.filter_columns.contains(col);
                if ui.selectable_label(active, col.as_str()).clicked() {
                    if active {
                        state.remove_filter_column(col);
                    } else {
                        state.add_filter_column(col);
                    }
                }
            }
        });
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let controls = state.controls.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for control in &controls {
                let column = control.column().to_string();
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("↳");
                    ui.strong(column.as_str());
                    if ui.small_button("✕").on_hover_text("Remove filter").clicked() {
                        state.remove_filter_column(&column);
                    }
                    if ui.small_button("Reset").clicked() {
                        state.reset_selection(&column);
                    }
                });

                let current = state.selection_for(control);
                if let Some(selection) = filter_widget(ui, control, current) {
                    state.set_selection(&column, selection);
                }
                ui.separator();
            }
        });
}

/// Draw the widget for one control. Returns the new selection if the user changed it.
fn filter_widget(ui: &mut Ui, control: &FilterControl, current: Selection) -> Option<Selection> {
    match (control, current) {
        (FilterControl::Categories { options, .. }, Selection::Categories(mut selected)) => {
            let mut changed = false;
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    selected = options.iter().cloned().collect();
                    changed = true;
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                    changed = true;
                }
            });
            for value in options {
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, value.to_string()).changed() {
                    if checked {
                        selected.insert(value.clone());
                    } else {
                        selected.remove(value);
                    }
                    changed = true;
                }
            }
            changed.then_some(Selection::Categories(selected))
        }
        (
            FilterControl::NumberRange { min, max, step, .. },
            Selection::NumberRange { min: mut lo, max: mut hi },
        ) => {
            let mut changed = false;
            let step = if *step > 0.0 { *step } else { 1.0 };
            changed |= ui
                .add(egui::Slider::new(&mut lo, *min..=*max).step_by(step).text("from"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut hi, *min..=*max).step_by(step).text("to"))
                .changed();
            changed.then_some(Selection::NumberRange { min: lo, max: hi })
        }
        (
            FilterControl::DateRange { column, .. },
            Selection::DateRange { start, end },
        ) => {
            let mut from: NaiveDate = start.date();
            let mut to: NaiveDate = end.date();
            let mut changed = false;
            ui.horizontal(|ui: &mut Ui| {
                ui.label("from");
                changed |= ui
                    .add(
                        egui_extras::DatePickerButton::new(&mut from)
                            .id_salt(&format!("{column}_from")),
                    )
                    .changed();
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("to");
                changed |= ui
                    .add(
                        egui_extras::DatePickerButton::new(&mut to)
                            .id_salt(&format!("{column}_to")),
                    )
                    .changed();
            });
            changed.then(|| {
                let (start, end) = whole_days(from, to);
                Selection::DateRange { start, end }
            })
        }
        (FilterControl::Pattern { column }, Selection::Pattern(mut text)) => {
            ui.label(format!("Substring or regex in {column}"));
            ui.text_edit_singleline(&mut text)
                .changed()
                .then_some(Selection::Pattern(text))
        }
        _ => None,
    }
}

/// Inclusive bounds from the start of `from` to the last instant of `to`.
fn whole_days(from: NaiveDate, to: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let end = to
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap_or_else(|| to.and_time(NaiveTime::MIN));
    (from.and_time(NaiveTime::MIN), end)
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save As…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                let result = state.reload();
                state.report("Reload", result);
                ui.close_menu();
            }
        });

        let loaded = state.dataset.is_some();
        if ui.add_enabled(loaded, egui::Button::new("Save")).clicked() {
            let result = state.save();
            state.report("Save", result);
        }
        if ui.add_enabled(loaded, egui::Button::new("Add task")).clicked() {
            let result = state.add_task();
            state.report("Add task", result);
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            let shown = state.view.as_ref().map_or(0, |v| v.len());
            ui.label(format!("{} tasks, {} shown", ds.len(), shown));
        }
        if state.dirty {
            ui.label(RichText::new("● unsaved changes").color(Color32::YELLOW));
        }

        if let Some(msg) = &state.status_message {
            let mut text = RichText::new(msg);
            if msg.starts_with("Error") {
                text = text.color(Color32::RED);
            }
            ui.label(text);
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tracker file")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        let result = state.open(&path);
        state.report("Open", result);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save tracker file")
        .add_filter("CSV", &["csv"])
        .set_file_name("out.csv")
        .save_file();

    if let Some(path) = file {
        let result = state.save_as(&path);
        state.report("Save", result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picked_end_day_includes_sub_second_times() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (start, end) = whole_days(day, day);
        assert_eq!(start, day.and_hms_opt(0, 0, 0).unwrap());
        assert!(end >= day.and_hms_milli_opt(23, 59, 59, 500).unwrap());
        assert!(end < day.succ_opt().unwrap().and_time(NaiveTime::MIN));
    }
}
