use crate::app::PortfolioApp;
use egui::{menu, RichText, Ui};

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut PortfolioApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button("  File  ", |ui| {
            if ui.button("  Open Portfolio...").clicked() {
                app.open_portfolio();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_portfolio_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Import CSV...").clicked() {
                app.import_csv();
                ui.close_menu();
            }
        });

        ui.menu_button("  View  ", |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.viewport.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.viewport.zoom_out();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Collapse All").clicked() {
                app.collapse_all();
                ui.close_menu();
            }
        });

        ui.menu_button("  Help  ", |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned portfolio name and task source
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!("{} · {}", app.portfolio.name, app.source_label()))
                    .size(11.0)
                    .weak(),
            );
        });
    });
}
