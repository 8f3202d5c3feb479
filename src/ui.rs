use egui::{Align2, Color32, Context, FontId, Pos2, Stroke, StrokeKind};

use crate::controller::EditorSession;
use crate::model::{Menu, Tool};

const ICON_OFF: Color32 = Color32::from_rgb(70, 70, 78);
const ICON_ON: Color32 = Color32::from_rgb(235, 180, 60);

/// Build the HUD for one frame and return egui output
pub fn build_ui(egui_ctx: &Context, raw_input: egui::RawInput, session: &EditorSession, pixels_per_point: f32, dt: f32) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        draw_menu(ctx, &session.menu, pixels_per_point);
        draw_debug_window(ctx, session, dt);
        if session.is_paused() {
            draw_pause_banner(ctx);
        }
    })
}

/// Paints the tool strip. Menu rects are in physical pixels.
fn draw_menu(ctx: &Context, menu: &Menu, pixels_per_point: f32) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("tool_menu")));
    let scale = 1.0 / pixels_per_point.max(f32::EPSILON);

    for (tool, r) in menu.icons() {
        let rect = egui::Rect::from_min_size(
            Pos2::new(r.x * scale, r.y * scale),
            egui::vec2(r.width * scale, r.height * scale),
        )
        .shrink(2.0);
        let (fill, text) = if menu.is_highlighted(tool) {
            (ICON_ON, Color32::BLACK)
        } else {
            (ICON_OFF, Color32::WHITE)
        };
        painter.rect_filled(rect, 4.0, fill);
        painter.rect_stroke(rect, 4.0, Stroke::new(1.0, Color32::BLACK), StrokeKind::Inside);
        painter.text(rect.center(), Align2::CENTER_CENTER, tool.label(), FontId::proportional(14.0), text);
    }
}

fn draw_debug_window(ctx: &Context, session: &EditorSession, dt: f32) {
    let camera = &session.camera;
    let cubes = session.world.cubes().count();

    egui::Window::new("Debug")
        .default_pos([ctx.available_rect().width() - 220.0, 8.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", if dt > 0.0 { 1.0 / dt } else { 0.0 })).small());
            ui.label(egui::RichText::new(format!("Objects: {} ({} cubes)", session.world.len(), cubes)).small());
            ui.label(egui::RichText::new(format!("Tool: {}", tool_name(session.active_tool()))).small());
            ui.label(
                egui::RichText::new(format!(
                    "Azimuth: {:.1} Elevation: {:.1}",
                    camera.azimuth.to_degrees(),
                    camera.elevation.to_degrees()
                ))
                .small(),
            );
            ui.label(egui::RichText::new(format!("Last edit: {:?}", session.last_edit())).small());
            match session.closest_pair() {
                Some(pair) => ui.label(
                    egui::RichText::new(format!("Closest on screen: {} {} ({:.2})", pair.a, pair.b, pair.distance)).small(),
                ),
                None => ui.label(egui::RichText::new("Closest on screen: -").small()),
            };
            ui.separator();
            ui.label(egui::RichText::new("Controls:").small());
            ui.label(egui::RichText::new("Left click - Use tool").small());
            ui.label(egui::RichText::new("Right drag / WASD - Orbit").small());
            ui.label(egui::RichText::new("Hold on menu - Move menu").small());
            ui.label(egui::RichText::new("P - Pause").small());
            ui.label(egui::RichText::new("Esc - Quit").small());
        });
}

fn draw_pause_banner(ctx: &Context) {
    egui::Area::new(egui::Id::new("pause_banner"))
        .anchor(Align2::CENTER_TOP, [0.0, 8.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("PAUSED").strong().color(Color32::RED));
        });
}

fn tool_name(tool: Tool) -> &'static str {
    match tool {
        Tool::None => "none",
        other => other.label(),
    }
}
