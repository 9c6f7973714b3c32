use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use portfolio_gantt::config::ViewerConfig;
use portfolio_gantt::io;
use portfolio_gantt::model::{
    EntityId, ExpansionCache, FetchRequest, Portfolio, TimelineEntity, TimelineRange,
    TimelineViewport, Toggle,
};
use portfolio_gantt::source::{FetchDriver, InMemorySource, TaskSource};
use tokio::runtime::Runtime;

use crate::ui;

/// Main application state. One instance per window; dropping it cancels any
/// task fetch still in flight.
pub struct PortfolioApp {
    pub portfolio: Portfolio,
    pub viewport: TimelineViewport,
    pub file_path: Option<PathBuf>,
    pub selected: Option<EntityId>,
    pub cache: ExpansionCache,

    // Dialog state
    pub show_about: bool,

    // Status message
    pub status_message: String,

    config: ViewerConfig,
    config_path: PathBuf,
    external_source: Option<Arc<dyn TaskSource>>,
    runtime: Arc<Runtime>,
    driver: FetchDriver,
    egui_ctx: egui::Context,
}

impl PortfolioApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Arc<Runtime>,
        config: ViewerConfig,
        config_path: PathBuf,
        external_source: Option<Arc<dyn TaskSource>>,
    ) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let (portfolio, file_path, status_message) = match config.last_portfolio.clone() {
            Some(path) => match io::load_portfolio(&path) {
                Ok(portfolio) => (portfolio, Some(path), "Portfolio loaded".to_string()),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not reopen last portfolio");
                    (Self::sample_portfolio(), None, format!("Error loading: {}", e))
                }
            },
            None => (Self::sample_portfolio(), None, "Ready".to_string()),
        };

        let egui_ctx = cc.egui_ctx.clone();
        let driver = Self::make_driver(&runtime, &egui_ctx, &external_source, &portfolio);

        Self {
            portfolio,
            viewport: TimelineViewport::default(),
            file_path,
            selected: None,
            cache: ExpansionCache::new(),
            show_about: false,
            status_message,
            config,
            config_path,
            external_source,
            runtime,
            driver,
            egui_ctx,
        }
    }

    /// The configured source, or the portfolio's inline tasks when none is
    /// configured.
    fn make_driver(
        runtime: &Runtime,
        egui_ctx: &egui::Context,
        external_source: &Option<Arc<dyn TaskSource>>,
        portfolio: &Portfolio,
    ) -> FetchDriver {
        let source: Arc<dyn TaskSource> = match external_source {
            Some(source) => Arc::clone(source),
            None => Arc::new(InMemorySource::from(portfolio.tasks.clone())),
        };
        let repaint = egui_ctx.clone();
        FetchDriver::new(runtime.handle().clone(), source).with_notify(move || repaint.request_repaint())
    }

    pub fn source_label(&self) -> String {
        self.driver.source().describe()
    }

    /// Generate a sample portfolio for demonstration.
    fn sample_portfolio() -> Portfolio {
        let today = chrono::Local::now().date_naive();
        let day = |offset: i64| Some(today + Duration::days(offset));
        let on = |offset: i64| today + Duration::days(offset);
        let mut portfolio = Portfolio::new("Sample Portfolio");

        // ── Website relaunch ────────────────────────────────────────
        let website = TimelineEntity::new("website", "Website Relaunch", day(-40), day(50))
            .with_progress(45)
            .with_status("ACTIVE");
        portfolio.tasks.insert(
            website.id.clone(),
            vec![
                TimelineEntity::new("w-design", "Design", day(-40), day(-5)).with_progress(100),
                TimelineEntity::new("w-wire", "Wireframes", day(-40), day(-25))
                    .with_progress(100)
                    .with_parent("w-design"),
                TimelineEntity::new("w-visual", "Visual Design", day(-24), day(-5))
                    .with_progress(90)
                    .with_parent("w-design"),
                TimelineEntity::new("w-build", "Build", day(-6), day(40)).with_progress(20),
                TimelineEntity::new("w-cms", "CMS Integration", day(-6), day(18))
                    .with_progress(35)
                    .with_parent("w-build"),
                TimelineEntity::new("w-qa", "QA Pass", day(30), day(40)).with_parent("w-build"),
                TimelineEntity::new_milestone("w-signoff", "Design Sign-off", on(-5))
                    .with_parent("w-design"),
                TimelineEntity::new_milestone("w-launch", "Launch", on(50)),
            ],
        );

        // ── Data platform ───────────────────────────────────────────
        let platform = TimelineEntity::new("platform", "Data Platform", day(-10), day(110))
            .with_progress(10)
            .with_status("PLANNING");
        portfolio.tasks.insert(
            platform.id.clone(),
            vec![
                TimelineEntity::new("p-ingest", "Ingestion", day(-10), day(35)).with_progress(25),
                TimelineEntity::new("p-model", "Modeling", day(30), day(80)),
                TimelineEntity::new("p-dash", "Dashboards", day(75), day(110)),
                TimelineEntity::new("p-spike", "Vendor Spike", None, None),
            ],
        );

        // ── Compliance audit: no tasks, no dates yet ───────────────
        let audit = TimelineEntity::new("audit", "Compliance Audit", None, None).with_status("BACKLOG");

        // ── Office move: short, no tasks ───────────────────────────
        let office = TimelineEntity::new("office", "Office Move", day(60), day(64)).with_status("PLANNED");

        portfolio.projects = vec![website, platform, audit, office];
        portfolio
    }

    // --- File operations ---

    /// Swap in another portfolio. Cached tasks and in-flight fetches belong to
    /// the old one and are dropped with the old driver.
    fn set_portfolio(&mut self, portfolio: Portfolio, path: Option<PathBuf>) {
        self.driver = Self::make_driver(&self.runtime, &self.egui_ctx, &self.external_source, &portfolio);
        self.portfolio = portfolio;
        self.cache.reset();
        self.selected = None;
        self.file_path = path;
        self.remember_last_portfolio();
    }

    fn remember_last_portfolio(&mut self) {
        if self.config.last_portfolio == self.file_path {
            return;
        }
        self.config.last_portfolio = self.file_path.clone();
        if let Err(e) = self.config.save(&self.config_path) {
            tracing::warn!(path = %self.config_path.display(), error = %e, "could not save config");
        }
    }

    pub fn open_portfolio(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Portfolio", &["json"])
            .pick_file()
        {
            match io::load_portfolio(&path) {
                Ok(portfolio) => {
                    self.set_portfolio(portfolio, Some(path));
                    self.status_message = "Portfolio loaded".to_string();
                }
                Err(e) => {
                    self.status_message = format!("Error loading: {}", e);
                }
            }
        }
    }

    pub fn save_portfolio_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Portfolio", &["json"])
            .set_file_name(format!("{}.portfolio.json", self.portfolio.name))
            .save_file()
        {
            self.portfolio.touch();
            match io::save_portfolio(&self.portfolio, &path) {
                Ok(()) => {
                    self.file_path = Some(path);
                    self.remember_last_portfolio();
                    self.status_message = "Portfolio saved".to_string();
                }
                Err(e) => self.status_message = format!("Error saving: {}", e),
            }
        }
    }

    pub fn import_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        {
            match io::import_csv(&path) {
                Ok((portfolio, skipped)) => {
                    let count = portfolio.projects.len();
                    self.set_portfolio(portfolio, None);
                    self.status_message = if skipped > 0 {
                        format!("Imported {} projects ({} rows skipped)", count, skipped)
                    } else {
                        format!("Imported {} projects", count)
                    };
                }
                Err(e) => {
                    self.status_message = format!("CSV import failed: {}", e);
                }
            }
        }
    }

    // --- Expansion ---

    pub fn toggle_project(&mut self, id: &EntityId) {
        match self.cache.toggle_expand(id) {
            Toggle::Fetch(request) => self.dispatch(request),
            Toggle::Expanded | Toggle::Collapsed => {}
        }
    }

    pub fn retry_project(&mut self, id: &EntityId) {
        if let Some(request) = self.cache.retry(id) {
            self.dispatch(request);
        }
    }

    fn dispatch(&mut self, request: FetchRequest) {
        let title = self
            .portfolio
            .project(&request.project_id)
            .map(|p| p.title.clone())
            .unwrap_or_else(|| request.project_id.to_string());
        self.status_message = format!("Loading tasks for '{}'…", title);
        self.driver.dispatch(request);
    }

    pub fn collapse_all(&mut self) {
        self.cache.collapse_all();
    }

    /// Range over projects plus every task currently on screen.
    fn current_range(&self) -> Option<TimelineRange> {
        TimelineRange::from_entities(
            self.portfolio
                .projects
                .iter()
                .chain(self.cache.visible_tasks()),
        )
    }
}

impl eframe::App for PortfolioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        let landed = self.driver.pump(&mut self.cache);
        if landed > 0 {
            self.status_message = format!("Loaded tasks for {} project(s)", landed);
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_STATUS)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Projects: {}", self.portfolio.projects.len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(egui::RichText::new(" · ").size(10.5).color(ui::theme::TEXT_DIM));
                        ui.label(
                            egui::RichText::new(format!("Zoom: {:.0}%", self.viewport.zoom_percent()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        let range = self.current_range();
        let mut table_action = ui::project_table::ProjectTableAction::None;
        let mut chart_interaction = ui::gantt_chart::ChartInteraction::default();

        {
            let rows = ui::rows::build_rows(&self.portfolio.projects, &self.cache);
            let selected = self.selected.as_ref();
            let viewport = &mut self.viewport;

            // Left panel: project list
            egui::SidePanel::left("project_panel")
                .default_width(ui::theme::SIDE_PANEL_WIDTH)
                .min_width(200.0)
                .max_width(ui::theme::SIDE_PANEL_WIDTH * 2.0)
                .resizable(true)
                .frame(
                    egui::Frame::default()
                        .fill(ui::theme::BG_PANEL)
                        .inner_margin(egui::Margin::same(8.0))
                        .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
                )
                .show(ctx, |ui| {
                    table_action = ui::project_table::show_project_table(
                        &rows,
                        self.portfolio.projects.len(),
                        selected,
                        ui,
                    );
                });

            // Central panel: Gantt chart
            let chart_frame = egui::Frame::default()
                .fill(ui::theme::BG_DARK)
                .inner_margin(egui::Margin::ZERO);
            egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| match &range {
                Some(range) => {
                    chart_interaction =
                        ui::gantt_chart::show_gantt_chart(&rows, range, viewport, selected, ui);
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            egui::RichText::new("No dated projects to show. Open a portfolio or import a CSV.")
                                .color(ui::theme::TEXT_DIM),
                        );
                    });
                }
            });
        }

        match table_action {
            ui::project_table::ProjectTableAction::Select(id) => self.selected = Some(id),
            ui::project_table::ProjectTableAction::Toggle(id) => self.toggle_project(&id),
            ui::project_table::ProjectTableAction::Retry(id) => self.retry_project(&id),
            ui::project_table::ProjectTableAction::None => {}
        }

        if let Some(id) = chart_interaction.toggle {
            self.toggle_project(&id);
        }
        if let Some(id) = chart_interaction.retry {
            self.retry_project(&id);
        }
        if let Some(id) = chart_interaction.select {
            self.selected = Some(id);
        } else if chart_interaction.clear_selection {
            self.selected = None;
        }

        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}

