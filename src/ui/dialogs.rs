use crate::app::PortfolioApp;
use crate::ui::theme;
use egui::{Context, RichText, Window};

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut PortfolioApp, ctx: &Context) {
    let mut open = true;
    Window::new(RichText::new("About").strong().size(14.0))
        .open(&mut open)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(
                RichText::new(concat!("Portfolio Gantt ", env!("CARGO_PKG_VERSION")))
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            );
            ui.label(RichText::new(env!("CARGO_PKG_DESCRIPTION")).color(theme::TEXT_SECONDARY));
            ui.add_space(6.0);
            ui.separator();
            ui.label(RichText::new("Click a project to load its tasks.").color(theme::TEXT_DIM));
            ui.label(RichText::new("Ctrl+Scroll zooms the timeline.").color(theme::TEXT_DIM));
            ui.label(
                RichText::new(format!("Tasks from: {}", app.source_label())).color(theme::TEXT_DIM),
            );
            ui.add_space(2.0);
        });

    if !open || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}
