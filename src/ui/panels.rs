use egui::{Color32, Context, RichText, ScrollArea, Ui};

use crate::scene::TerrainPlot;
use crate::ui::state::UiState;
use crate::ui::theme::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageAction {
    First,
    Previous,
    Next,
    Last,
}

#[derive(Default)]
pub struct UiActions {
    pub stage: Option<StageAction>,
    pub clear_selection: bool,
    pub reload: bool,
}

pub fn draw_side_panel(ctx: &Context, state: &mut UiState, plot: &TerrainPlot) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(260.0)
        .max_width(360.0)
        .default_width(280.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(14.0))
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(RichText::new("Terrain 3D").strong());
                if !state.data_name.is_empty() {
                    ui.label(RichText::new(&state.data_name).color(TEXT_MUTED).size(11.0));
                }
                ui.add_space(12.0);

                dataset_summary(ui, plot);
                ui.add_space(12.0);

                section_header(ui, "STAGE");
                stage_controls(ui, plot, &mut actions);
                ui.add_space(12.0);

                if plot.config().allow_selection {
                    section_header(ui, "SELECTION");
                    selection_readout(ui, state, plot, &mut actions);
                    ui.add_space(12.0);
                }

                ui.separator();
                ui.add_space(8.0);

                section_header(ui, "VIEW");
                ui.checkbox(&mut state.show_labels, "Axis labels");
                ui.checkbox(&mut state.show_help, "Controls help");
                ui.add_space(8.0);
                if ui.button("Reload data").clicked() {
                    actions.reload = true;
                }

                if let Some(err) = &state.last_error {
                    ui.add_space(10.0);
                    error_frame(ui, err);
                }
            });
        });

    actions
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn dataset_summary(ui: &mut Ui, plot: &TerrainPlot) {
    let Some(dataset) = plot.dataset() else {
        let text = if plot.is_busy() { "Building..." } else { "Nothing plotted" };
        ui.label(RichText::new(text).color(TEXT_MUTED).italics());
        return;
    };

    egui::Grid::new("dataset_summary")
        .num_columns(2)
        .spacing([16.0, 2.0])
        .show(ui, |ui| {
            ui.label(RichText::new("Points").color(TEXT_MUTED));
            ui.label(dataset.points.len().to_string());
            ui.end_row();

            ui.label(RichText::new("Faces").color(TEXT_MUTED));
            ui.label(dataset.faces.len().to_string());
            ui.end_row();

            ui.label(RichText::new("Stages").color(TEXT_MUTED));
            ui.label(plot.number_of_stages().to_string());
            ui.end_row();
        });
}

fn stage_controls(ui: &mut Ui, plot: &TerrainPlot, actions: &mut UiActions) {
    let enabled = plot.current_stage().is_some();

    ui.horizontal(|ui| {
        for (text, action) in [
            ("|<", StageAction::First),
            ("<", StageAction::Previous),
            (">", StageAction::Next),
            (">|", StageAction::Last),
        ] {
            let button = egui::Button::new(RichText::new(text).monospace()).min_size(egui::vec2(44.0, 28.0));
            if ui.add_enabled(enabled, button).clicked() {
                actions.stage = Some(action);
            }
        }
    });

    ui.add_space(4.0);
    let label = plot.stage_label().unwrap_or_else(|| "No stages".to_string());
    ui.label(RichText::new(label).color(ACCENT_WATER));
}

fn selection_readout(ui: &mut Ui, state: &UiState, plot: &TerrainPlot, actions: &mut UiActions) {
    let Some((index, point)) = &state.selected else {
        ui.label(RichText::new("Click a point to inspect it").color(TEXT_MUTED).italics());
        return;
    };
    let (x_name, y_name) = plot.axis_names();
    let stage = plot.current_stage().unwrap_or(0);

    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(4.0)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id = Some(egui::FontId::new(12.0, egui::FontFamily::Monospace));

            egui::Grid::new("selected_point")
                .num_columns(2)
                .spacing([16.0, 2.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Point").color(TEXT_MUTED));
                    ui.label(index.to_string());
                    ui.end_row();

                    ui.label(RichText::new(x_name).color(TEXT_MUTED));
                    ui.label(format!("{:.3}", point.x));
                    ui.end_row();

                    ui.label(RichText::new(y_name).color(TEXT_MUTED));
                    ui.label(format!("{:.3}", point.y));
                    ui.end_row();

                    ui.label(RichText::new(&plot.config().z_label).color(TEXT_MUTED));
                    ui.label(RichText::new(format!("{:.3}", point.e)).color(ACCENT_LAND));
                    ui.end_row();

                    if let Some(w) = point.w.get(stage) {
                        ui.label(RichText::new(&plot.config().value_label).color(TEXT_MUTED));
                        ui.label(RichText::new(format!("{:.3}", w)).color(ACCENT_WATER));
                        ui.end_row();
                    }
                });
        });

    if ui.small_button("Clear selection").clicked() {
        actions.clear_selection = true;
    }
}

fn error_frame(ui: &mut Ui, err: &str) {
    egui::Frame::default()
        .fill(Color32::from_rgb(252, 232, 232))
        .stroke(egui::Stroke::new(1.0, ACCENT_ERROR))
        .rounding(4.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(err).color(ACCENT_ERROR).size(11.0));
        });
}

/// Draws the axis labels at their projected screen positions.
pub fn draw_axis_labels(ctx: &Context, plot: &TerrainPlot) {
    let painter = ctx.layer_painter(egui::LayerId::background());
    let pixels_per_point = ctx.pixels_per_point();
    let viewport = plot.viewport();

    for label in plot.labels() {
        let Some(px) = plot.camera().project_to_screen(label.position, viewport) else {
            continue;
        };
        let pos = egui::pos2(px.x / pixels_per_point, px.y / pixels_per_point);
        painter.text(
            pos,
            egui::Align2::CENTER_CENTER,
            &label.text,
            egui::FontId::proportional(13.0),
            TEXT_LABEL,
        );
    }
}

pub fn draw_help_overlay(ctx: &Context, selection: bool) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_white_alpha(220))
                .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new("RMB+Drag - Orbit | Scroll - Zoom").color(TEXT_MUTED));
                    ui.label(RichText::new("Left/Right - Stage | Home/End - First/Last").color(TEXT_MUTED));
                    if selection {
                        ui.label(RichText::new("Click - Select point").color(TEXT_MUTED));
                    }
                });
        });
}
