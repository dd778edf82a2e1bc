use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

pub const BG_PANEL: Color32 = Color32::from_rgb(246, 246, 248);
pub const BG_WIDGET: Color32 = Color32::from_rgb(232, 233, 238);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(218, 222, 236);
pub const BG_WIDGET_ACTIVE: Color32 = Color32::from_rgb(200, 208, 236);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(48, 48, 56);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 120, 132);
pub const TEXT_LABEL: Color32 = Color32::from_rgb(70, 70, 70);

pub const ACCENT_WATER: Color32 = Color32::from_rgb(85, 85, 255);
pub const ACCENT_LAND: Color32 = Color32::from_rgb(210, 169, 95);
pub const ACCENT_ERROR: Color32 = Color32::from_rgb(190, 40, 40);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(208, 210, 220);

fn widget(bg: Color32, stroke: Stroke, fg: Color32, expansion: f32) -> egui::style::WidgetVisuals {
    egui::style::WidgetVisuals {
        bg_fill: bg,
        weak_bg_fill: bg,
        bg_stroke: stroke,
        rounding: Rounding::same(3.0),
        fg_stroke: Stroke::new(1.0, fg),
        expansion,
    }
}

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    let mut visuals = Visuals::light();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.error_fg_color = ACCENT_ERROR;
    visuals.selection.bg_fill = ACCENT_WATER.gamma_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT_WATER);

    visuals.widgets.noninteractive =
        widget(BG_PANEL, Stroke::new(1.0, BORDER_SUBTLE), TEXT_MUTED, 0.0);
    visuals.widgets.inactive = widget(BG_WIDGET, Stroke::new(1.0, BORDER_SUBTLE), TEXT_PRIMARY, 0.0);
    visuals.widgets.hovered = widget(BG_WIDGET_HOVER, Stroke::new(1.0, ACCENT_WATER), TEXT_PRIMARY, 1.0);
    visuals.widgets.active = widget(BG_WIDGET_ACTIVE, Stroke::new(2.0, ACCENT_WATER), TEXT_PRIMARY, 1.0);

    style.visuals = visuals;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(10.0);
    style.spacing.button_padding = egui::vec2(10.0, 4.0);

    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(17.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(13.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}
