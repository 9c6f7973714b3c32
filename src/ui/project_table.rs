use crate::ui::rows::ChartRow;
use crate::ui::theme;
use egui::{Color32, RichText, Ui};
use egui_phosphor::regular as icons;
use portfolio_gantt::model::EntityId;

/// Actions that the project list can request.
pub enum ProjectTableAction {
    None,
    Select(EntityId),
    Toggle(EntityId),
    Retry(EntityId),
}

/// Render the left-side project list, mirroring the chart's rows.
pub fn show_project_table(
    rows: &[ChartRow<'_>],
    project_count: usize,
    selected: Option<&EntityId>,
    ui: &mut Ui,
) -> ProjectTableAction {
    let mut action = ProjectTableAction::None;

    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Projects")
                .strong()
                .size(15.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.add_space(4.0);
        ui.label(
            RichText::new(format!("({})", project_count))
                .size(11.0)
                .color(theme::TEXT_DIM),
        );
    });
    ui.add_space(6.0);
    ui.separator();
    ui.add_space(2.0);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (i, row) in rows.iter().enumerate() {
                let entity_id = row.entity().map(|e| &e.id);
                let is_selected = entity_id.is_some() && entity_id == selected;

                let row_bg = if is_selected {
                    theme::BG_SELECTED
                } else if i % 2 == 0 {
                    theme::BG_PANEL
                } else {
                    theme::BG_DARK
                };

                let frame = egui::Frame {
                    fill: row_bg,
                    rounding: egui::Rounding::same(4.0),
                    inner_margin: egui::Margin::symmetric(6.0, 4.0),
                    outer_margin: egui::Margin::ZERO,
                    stroke: egui::Stroke::NONE,
                    shadow: egui::epaint::Shadow::NONE,
                };

                let frame_resp = frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 6.0;
                        ui.add_space(row.depth() as f32 * theme::INDENT);

                        match *row {
                            ChartRow::Project { entity, index, expanded } => {
                                let caret = if expanded { icons::CARET_DOWN } else { icons::CARET_RIGHT };
                                let caret_btn = ui.add(
                                    egui::Button::new(RichText::new(caret).color(theme::TEXT_SECONDARY))
                                        .frame(false),
                                );
                                if caret_btn.on_hover_text("Show tasks").clicked() {
                                    action = ProjectTableAction::Toggle(entity.id.clone());
                                }

                                let (dot_rect, _) =
                                    ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
                                ui.painter()
                                    .circle_filled(dot_rect.center(), 3.0, theme::project_color(index));

                                ui.add(
                                    egui::Label::new(
                                        RichText::new(&entity.title).size(12.0).color(if is_selected {
                                            Color32::WHITE
                                        } else {
                                            theme::TEXT_PRIMARY
                                        }),
                                    )
                                    .truncate(),
                                );
                                show_trailing(ui, entity.progress, entity.dates(), theme::project_color(index));
                            }
                            ChartRow::Task { entity, project_index, .. } => {
                                ui.add(
                                    egui::Label::new(
                                        RichText::new(&entity.title).size(11.5).color(theme::TEXT_SECONDARY),
                                    )
                                    .truncate(),
                                );
                                show_trailing(
                                    ui,
                                    entity.progress,
                                    entity.dates(),
                                    theme::task_color(theme::project_color(project_index)),
                                );
                            }
                            ChartRow::Milestone { entity, .. } => {
                                ui.label(
                                    RichText::new(format!("◆ {}", entity.title))
                                        .size(11.5)
                                        .color(theme::MILESTONE),
                                );
                            }
                            ChartRow::Loading => {
                                ui.spinner();
                                ui.label(RichText::new("Loading…").size(11.0).color(theme::TEXT_DIM));
                            }
                            ChartRow::NoTasks => {
                                ui.label(RichText::new("No tasks").size(11.0).color(theme::TEXT_DIM));
                            }
                            ChartRow::Failed { project_id, .. } => {
                                ui.label(RichText::new("Load failed").size(11.0).color(theme::TEXT_ERROR));
                                if ui.small_button("Retry").clicked() {
                                    action = ProjectTableAction::Retry(project_id.clone());
                                }
                            }
                        }
                    });
                });

                if let Some(id) = entity_id {
                    let row_click = ui.interact(
                        frame_resp.response.rect,
                        egui::Id::new(("project-row", id)),
                        egui::Sense::click(),
                    );
                    if row_click.clicked() && matches!(action, ProjectTableAction::None) {
                        action = ProjectTableAction::Select(id.clone());
                    }
                }

                ui.add_space(1.0);
            }
        });

    action
}

fn show_trailing(
    ui: &mut Ui,
    progress: u8,
    dates: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
    color: Color32,
) {
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        ui.spacing_mut().item_spacing.x = 4.0;

        let pbar = egui::ProgressBar::new(progress as f32 / 100.0)
            .desired_width(40.0)
            .fill(color)
            .rounding(egui::Rounding::same(3.0));
        ui.add(pbar);

        match dates {
            Some((start, end)) => {
                ui.label(
                    RichText::new(format!("{} → {}", start.format("%m/%d"), end.format("%m/%d")))
                        .size(10.0)
                        .color(theme::TEXT_SECONDARY),
                );
            }
            None => {
                ui.label(RichText::new("no dates").size(10.0).color(theme::TEXT_DIM));
            }
        }
    });
}
