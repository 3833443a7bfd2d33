//! Toast overlay for store notifications.

use crate::app::AppState;
use rquill::{with_alpha, NotificationKind};

/// Seconds a toast stays on screen.
const TOAST_LIFETIME: f64 = 4.0;

/// Draws live toasts in the bottom-right corner and drops expired ones.
pub fn render_toasts(ctx: &egui::Context, state: &mut AppState) {
    let now = ctx.input(|i| i.time);
    state.toasts.retain(|toast| now - toast.shown_at < TOAST_LIFETIME);
    if state.toasts.is_empty() {
        return;
    }

    let visuals = ctx.style().visuals.clone();
    egui::Area::new(egui::Id::new("toasts"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -36.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            for toast in &state.toasts {
                let accent = match toast.notification.kind {
                    NotificationKind::Success => visuals.selection.stroke.color,
                    NotificationKind::Error => visuals.error_fg_color,
                    NotificationKind::Info => visuals.widgets.noninteractive.bg_stroke.color,
                };
                egui::Frame::popup(ui.style())
                    .fill(with_alpha(visuals.extreme_bg_color, 240))
                    .stroke(egui::Stroke::new(1.5, accent))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&toast.notification.message).color(accent));
                    });
                ui.add_space(4.0);
            }
        });

    ctx.request_repaint_after(std::time::Duration::from_millis(250));
}
