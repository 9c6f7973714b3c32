use crate::ui::rows::ChartRow;
use crate::ui::theme;
use chrono::NaiveDate;
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use portfolio_gantt::model::{position, BarPosition, EntityId, TimelineEntity, TimelineRange, TimelineViewport};

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;

/// What the user did in the chart this frame.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    pub toggle: Option<EntityId>,
    pub retry: Option<EntityId>,
    pub select: Option<EntityId>,
    pub clear_selection: bool,
}

/// Render the Gantt chart area (central panel).
pub fn show_gantt_chart(
    rows: &[ChartRow<'_>],
    range: &TimelineRange,
    viewport: &mut TimelineViewport,
    selected: Option<&EntityId>,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let available = ui.available_size();
    let chart_width = viewport.chart_width(range, available.x);
    let chart_height = HEADER_HEIGHT + (rows.len() as f32 * (ROW_HEIGHT + ROW_PADDING)) + 40.0;

    // Handle zoom with scroll wheel
    let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        if scroll_delta.y > 0.0 {
            viewport.zoom_in();
        } else if scroll_delta.y < 0.0 {
            viewport.zoom_out();
        }
    }

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(chart_width, chart_height.max(available.y)),
                Sense::click(),
            );
            let origin = response.rect.min;
            let canvas_height = response.rect.height();
            let mut consumed_click = false;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            draw_month_header(&painter, origin, range, chart_width, canvas_height);
            draw_today_line(&painter, origin, range, chart_width, canvas_height);

            for (i, row) in rows.iter().enumerate() {
                let y = origin.y + HEADER_HEIGHT + i as f32 * (ROW_HEIGHT + ROW_PADDING);
                let row_bg = if matches!(row, ChartRow::Project { .. }) {
                    theme::BG_PANEL
                } else {
                    theme::BG_DARK
                };
                painter.rect_filled(
                    Rect::from_min_size(
                        Pos2::new(origin.x, y),
                        Vec2::new(chart_width, ROW_HEIGHT + ROW_PADDING),
                    ),
                    0.0,
                    row_bg,
                );
                painter.line_segment(
                    [
                        Pos2::new(origin.x, y + ROW_HEIGHT + ROW_PADDING),
                        Pos2::new(origin.x + chart_width, y + ROW_HEIGHT + ROW_PADDING),
                    ],
                    Stroke::new(0.5, theme::BORDER_SUBTLE),
                );

                let y = y + ROW_PADDING;
                match *row {
                    ChartRow::Loading => {
                        draw_row_note(&painter, origin, y, "Loading tasks…", theme::TEXT_DIM);
                    }
                    ChartRow::NoTasks => {
                        draw_row_note(&painter, origin, y, "No tasks", theme::TEXT_DIM);
                    }
                    ChartRow::Failed { project_id, message } => {
                        draw_row_note(
                            &painter,
                            origin,
                            y,
                            &format!("Could not load tasks: {}", message),
                            theme::TEXT_ERROR,
                        );
                        let button_rect = Rect::from_min_size(
                            Pos2::new(origin.x + 8.0, y + 4.0),
                            Vec2::new(56.0, ROW_HEIGHT - 8.0),
                        );
                        if ui.put(button_rect, egui::Button::new("Retry")).clicked() {
                            interaction.retry = Some(project_id.clone());
                            consumed_click = true;
                        }
                    }
                    ChartRow::Project { entity, index, .. } => {
                        let color = theme::project_color(index);
                        if let Some(bar) = position(entity, range, row.tier()) {
                            let is_selected = selected == Some(&entity.id);
                            let rect = draw_bar(&painter, origin, chart_width, bar, entity, y, color, is_selected);
                            let bar_response = ui.interact(
                                rect,
                                ui.make_persistent_id(("project-bar", &entity.id)),
                                Sense::click(),
                            );
                            if bar_response.clicked() {
                                interaction.toggle = Some(entity.id.clone());
                                interaction.select = Some(entity.id.clone());
                                consumed_click = true;
                            }
                            if bar_response.hovered() {
                                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                                show_entity_tooltip(ui, entity);
                            }
                        }
                    }
                    ChartRow::Task { entity, project_index, .. } => {
                        let color = theme::task_color(theme::project_color(project_index));
                        if let Some(bar) = position(entity, range, row.tier()) {
                            let is_selected = selected == Some(&entity.id);
                            let rect = draw_bar(&painter, origin, chart_width, bar, entity, y, color, is_selected);
                            let bar_response = ui.interact(
                                rect,
                                ui.make_persistent_id(("task-bar", &entity.id)),
                                Sense::click(),
                            );
                            if bar_response.clicked() {
                                interaction.select = Some(entity.id.clone());
                                consumed_click = true;
                            }
                            if bar_response.hovered() {
                                show_entity_tooltip(ui, entity);
                            }
                        }
                    }
                    ChartRow::Milestone { entity, .. } => {
                        if let Some(bar) = position(entity, range, row.tier()) {
                            let is_selected = selected == Some(&entity.id);
                            let rect = draw_milestone(&painter, origin, chart_width, bar, entity, y, is_selected);
                            let response = ui.interact(
                                rect.expand(6.0),
                                ui.make_persistent_id(("milestone", &entity.id)),
                                Sense::click(),
                            );
                            if response.clicked() {
                                interaction.select = Some(entity.id.clone());
                                consumed_click = true;
                            }
                            if response.hovered() {
                                show_entity_tooltip(ui, entity);
                            }
                        }
                    }
                }
            }

            // Empty click on background clears selection
            if response.clicked() && !consumed_click {
                interaction.clear_selection = true;
            }
        });

    interaction
}

fn show_entity_tooltip(ui: &Ui, entity: &TimelineEntity) {
    egui::show_tooltip_at_pointer(
        ui.ctx(),
        ui.layer_id(),
        egui::Id::new(("entity-tip", &entity.id)),
        |ui| {
            ui.strong(&entity.title);
            if let Some((start, end)) = entity.dates() {
                if start == end {
                    ui.label(start.format("%d/%m/%Y").to_string());
                } else {
                    ui.label(format!(
                        "{} → {}",
                        start.format("%d/%m/%Y"),
                        end.format("%d/%m/%Y"),
                    ));
                }
            }
            if !entity.status.is_empty() {
                ui.label(&entity.status);
            }
            ui.label(format!("Progress: {}%", entity.progress));
        },
    );
}

fn draw_month_header(
    painter: &egui::Painter,
    origin: Pos2,
    range: &TimelineRange,
    width: f32,
    height: f32,
) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    for month in &range.months {
        let x = origin.x + percent_to_x(range.date_to_percent(*month), width);

        painter.line_segment(
            [
                Pos2::new(x, origin.y + HEADER_HEIGHT),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        painter.text(
            Pos2::new(x + 5.0, origin.y + HEADER_HEIGHT / 2.0),
            egui::Align2::LEFT_CENTER,
            month.format("%b %Y").to_string(),
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
    }
}

fn draw_today_line(
    painter: &egui::Painter,
    origin: Pos2,
    range: &TimelineRange,
    width: f32,
    height: f32,
) {
    let today: NaiveDate = chrono::Local::now().date_naive();
    if !range.contains(today) {
        return;
    }
    let x = origin.x + percent_to_x(range.date_to_percent(today), width);

    painter.line_segment(
        [
            Pos2::new(x, origin.y + HEADER_HEIGHT),
            Pos2::new(x, origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, origin.y + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn draw_row_note(painter: &egui::Painter, origin: Pos2, y: f32, text: &str, color: Color32) {
    painter.text(
        Pos2::new(origin.x + 72.0, y + ROW_HEIGHT / 2.0),
        egui::Align2::LEFT_CENTER,
        text,
        theme::font_bar(),
        color,
    );
}

fn percent_to_x(percent: f64, width: f32) -> f32 {
    (percent / 100.0 * width as f64) as f32
}

#[allow(clippy::too_many_arguments)]
fn draw_bar(
    painter: &egui::Painter,
    origin: Pos2,
    chart_width: f32,
    bar: BarPosition,
    entity: &TimelineEntity,
    y: f32,
    color: Color32,
    is_selected: bool,
) -> Rect {
    let (x, w) = bar.to_pixels(chart_width);
    let bar_width = w.max(2.0);
    let inset = theme::BAR_INSET;

    let bar_rect = Rect::from_min_size(
        Pos2::new(origin.x + x, y + inset),
        Vec2::new(bar_width, ROW_HEIGHT - inset * 2.0),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING.min(bar_width / 2.0));

    // Soft shadow
    painter.rect_filled(
        bar_rect.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(35),
    );
    painter.rect_filled(bar_rect, rounding, color);

    // Progress fill (darkened overlay)
    if entity.progress > 0 {
        let progress_width = bar_width * (entity.progress as f32 / 100.0);
        let progress_rect =
            Rect::from_min_size(bar_rect.min, Vec2::new(progress_width, bar_rect.height()));
        painter.rect_filled(progress_rect, rounding, theme::PROGRESS_OVERLAY);

        if entity.progress < 98 {
            let tick_x = bar_rect.left() + progress_width;
            painter.line_segment(
                [
                    Pos2::new(tick_x, bar_rect.top() + 2.0),
                    Pos2::new(tick_x, bar_rect.bottom() - 2.0),
                ],
                Stroke::new(1.0, Color32::from_white_alpha(60)),
            );
        }
    }

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    // Title on the bar when it fits, otherwise just right of it.
    let galley = painter.layout_no_wrap(entity.title.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
    let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
    if bar_width > galley.size().x + 12.0 {
        painter.galley(Pos2::new(bar_rect.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    } else {
        painter.text(
            Pos2::new(bar_rect.right() + 6.0, bar_rect.center().y),
            egui::Align2::LEFT_CENTER,
            &entity.title,
            theme::font_bar(),
            theme::TEXT_SECONDARY,
        );
    }

    bar_rect
}

/// Milestones ignore `bar.width`: a fixed diamond centered on `bar.left`.
fn draw_milestone(
    painter: &egui::Painter,
    origin: Pos2,
    chart_width: f32,
    bar: BarPosition,
    entity: &TimelineEntity,
    y: f32,
    is_selected: bool,
) -> Rect {
    let (x, _) = bar.to_pixels(chart_width);
    let center = Pos2::new(origin.x + x, y + ROW_HEIGHT / 2.0);
    let size = (ROW_HEIGHT / 2.0 - 3.0).max(6.0);

    let shadow_offset = Vec2::new(1.0, 1.5);
    let shadow_pts = vec![
        center + shadow_offset + Vec2::new(0.0, -size),
        center + shadow_offset + Vec2::new(size, 0.0),
        center + shadow_offset + Vec2::new(0.0, size),
        center + shadow_offset + Vec2::new(-size, 0.0),
    ];
    painter.add(egui::Shape::convex_polygon(
        shadow_pts,
        Color32::from_black_alpha(40),
        Stroke::NONE,
    ));

    let points = vec![
        Pos2::new(center.x, center.y - size),
        Pos2::new(center.x + size, center.y),
        Pos2::new(center.x, center.y + size),
        Pos2::new(center.x - size, center.y),
    ];
    painter.add(egui::Shape::convex_polygon(
        points.clone(),
        theme::MILESTONE,
        Stroke::NONE,
    ));

    if is_selected {
        painter.add(egui::Shape::convex_polygon(
            points,
            Color32::TRANSPARENT,
            Stroke::new(2.0, theme::BORDER_ACCENT),
        ));
    }

    painter.text(
        Pos2::new(center.x + size + 6.0, center.y),
        egui::Align2::LEFT_CENTER,
        &entity.title,
        theme::font_bar(),
        theme::TEXT_SECONDARY,
    );

    Rect::from_center_size(center, Vec2::splat(size * 2.0 + 2.0))
}
