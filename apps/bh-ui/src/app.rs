use crate::views::{DashboardView, HomeView, ReportsView, UploadAction, UploadView};
use bh_api::{FederationApi, ReportBlob};
use bh_app::{
    AppConfig, DirectorySink, Notice, NoticeLevel, NoticeLog, ReportFlow, RequestWorker, Route,
    RunFlow, SUPPORTED_MODEL_EXTENSIONS, SelectedFile, UploadFlow, WorkerPoll,
    load_config_or_default,
};
use bh_core::ModelId;
use bh_results::FederationResult;
use bh_session::Session;
use egui_file_dialog::FileDialog;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming a YAML config file.
const CONFIG_ENV: &str = "BENCHMARK_HEALTH_CONFIG";

pub struct BenchmarkHealthApp {
    config: AppConfig,
    session: Session,
    api: Option<Arc<dyn FederationApi>>,
    sink: DirectorySink,
    file_dialog: FileDialog,
    last_directory: Option<PathBuf>,
    active_route: Route,
    home_view: HomeView,
    upload_view: UploadView,
    dashboard_view: DashboardView,
    reports_view: ReportsView,
    upload: UploadFlow,
    run: RunFlow,
    report: ReportFlow,
    upload_worker: Option<RequestWorker<ModelId>>,
    run_worker: Option<RequestWorker<FederationResult>>,
    report_worker: Option<RequestWorker<ReportBlob>>,
    notices: NoticeLog,
}

impl BenchmarkHealthApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut notices = NoticeLog::default();

        let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let config = match load_config_or_default(config_path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                warn!("Falling back to default config: {}", e);
                notices.push(Notice::error(format!("{} (using defaults)", e)));
                AppConfig::default()
            }
        };

        let api: Option<Arc<dyn FederationApi>> = match config.api_client() {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                notices.push(Notice::error(e.to_string()));
                None
            }
        };
        info!("Federation server: {}", config.api.base_url);

        let session = config.session();
        let file_dialog = FileDialog::new()
            .add_file_filter(
                "Model files",
                Arc::new(|path: &Path| {
                    path.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|ext| {
                            SUPPORTED_MODEL_EXTENSIONS
                                .iter()
                                .any(|s| s.eq_ignore_ascii_case(ext))
                        })
                }),
            )
            .default_file_filter("Model files");

        Self {
            sink: config.download_sink(),
            upload: UploadFlow::mount(&session),
            run: RunFlow::mount(&session, config.missing_metrics),
            report: ReportFlow::mount(&session),
            config,
            session,
            api,
            file_dialog,
            last_directory: None,
            active_route: Route::Home,
            home_view: HomeView,
            upload_view: UploadView,
            dashboard_view: DashboardView::default(),
            reports_view: ReportsView,
            upload_worker: None,
            run_worker: None,
            report_worker: None,
            notices,
        }
    }

    /// Views re-read the session when entered; leaving one abandons its request.
    fn navigate(&mut self, route: Route) {
        if route == self.active_route {
            return;
        }
        match self.active_route {
            Route::Upload => {
                self.upload_worker = None;
                self.upload.cancel();
            }
            Route::Dashboard => {
                self.run_worker = None;
                self.run.cancel();
            }
            Route::Reports => {
                self.report_worker = None;
                self.report.cancel();
            }
            Route::Home => {}
        }
        match route {
            Route::Upload => self.upload = UploadFlow::mount(&self.session),
            Route::Dashboard => {
                self.run = RunFlow::mount(&self.session, self.run.policy());
            }
            Route::Reports => self.report = ReportFlow::mount(&self.session),
            Route::Home => {}
        }
        info!("Navigated to {}", route.path());
        self.active_route = route;
    }

    fn api(&mut self) -> Option<Arc<dyn FederationApi>> {
        if self.api.is_none() {
            self.notices.push(Notice::error(format!(
                "No usable server URL configured ({})",
                self.config.api.base_url
            )));
        }
        self.api.clone()
    }

    fn start_upload(&mut self) {
        let Some(api) = self.api() else { return };
        match self.upload.begin() {
            Ok(job) => {
                self.upload_worker = Some(RequestWorker::start(move || job.execute(api.as_ref())));
            }
            Err(e) => self.notices.push(Notice::error(e.to_string())),
        }
    }

    fn start_run(&mut self) {
        let Some(api) = self.api() else { return };
        match self.run.begin() {
            Ok(job) => {
                self.run_worker = Some(RequestWorker::start(move || job.execute(api.as_ref())));
            }
            Err(e) => self.notices.push(Notice::error(e.to_string())),
        }
    }

    fn start_report(&mut self) {
        let Some(api) = self.api() else { return };
        match self.report.begin() {
            Ok(job) => {
                self.report_worker = Some(RequestWorker::start(move || job.execute(api.as_ref())));
            }
            Err(e) => self.notices.push(Notice::error(e.to_string())),
        }
    }

    fn select_model_file(&mut self, path: PathBuf) {
        if let Some(parent) = path.parent() {
            self.last_directory = Some(parent.to_path_buf());
        }
        match SelectedFile::from_path(&path) {
            Ok(file) => self.upload.select_file(file),
            Err(e) => self.notices.push(Notice::error(e.to_string())),
        }
    }

    /// Returns true while any request is still outstanding.
    fn poll_workers(&mut self) -> bool {
        let mut pending = false;

        if let Some(worker) = &self.upload_worker {
            match worker.poll() {
                WorkerPoll::Pending => pending = true,
                WorkerPoll::Done(completion) => {
                    self.upload_worker = None;
                    let notice = self.upload.complete(completion, &self.session);
                    self.notices.extend(notice);
                }
                WorkerPoll::Disconnected => {
                    self.upload_worker = None;
                    self.upload.cancel();
                    self.notices
                        .push(Notice::error("Upload failed. Please try again."));
                }
            }
        }

        if let Some(worker) = &self.run_worker {
            match worker.poll() {
                WorkerPoll::Pending => pending = true,
                WorkerPoll::Done(completion) => {
                    self.run_worker = None;
                    let notice = self.run.complete(completion);
                    self.notices.extend(notice);
                }
                WorkerPoll::Disconnected => {
                    self.run_worker = None;
                    self.run.cancel();
                    self.notices.push(Notice::error("Federation failed."));
                }
            }
        }

        if let Some(worker) = &self.report_worker {
            match worker.poll() {
                WorkerPoll::Pending => pending = true,
                WorkerPoll::Done(completion) => {
                    self.report_worker = None;
                    let notice = self.report.complete(completion, &self.sink);
                    self.notices.extend(notice);
                }
                WorkerPoll::Disconnected => {
                    self.report_worker = None;
                    self.report.cancel();
                    self.notices.push(Notice::error("Download failed."));
                }
            }
        }

        pending
    }

    fn show_notices(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.strong("Notifications");
            if ui
                .add_enabled(!self.notices.is_empty(), egui::Button::new("Clear"))
                .clicked()
            {
                self.notices.clear();
            }
        });
        if self.notices.is_empty() {
            ui.weak("Nothing yet");
            return;
        }
        egui::ScrollArea::vertical()
            .max_height(90.0)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for notice in self.notices.iter() {
                    let color = match notice.level {
                        NoticeLevel::Success => egui::Color32::from_rgb(16, 185, 129),
                        NoticeLevel::Error => egui::Color32::from_rgb(220, 38, 38),
                    };
                    ui.colored_label(color, notice.timestamped());
                }
            });
    }
}

impl eframe::App for BenchmarkHealthApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.poll_workers() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let mut next_route = self.active_route;
        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(bh_app::routes::PRODUCT_NAME);
                ui.separator();
                for route in Route::ALL {
                    ui.selectable_value(&mut next_route, route, route.title());
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(&self.config.api.base_url);
                });
            });
        });
        self.navigate(next_route);

        egui::TopBottomPanel::bottom("notices")
            .resizable(true)
            .show(ctx, |ui| self.show_notices(ui));

        self.file_dialog.update(ctx);
        if let Some(path) = self.file_dialog.take_selected() {
            self.select_model_file(path.to_path_buf());
        }

        let mut upload_action = UploadAction::None;
        let mut run_clicked = false;
        let mut report_clicked = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.active_route {
                Route::Home => {
                    if let Some(route) = self.home_view.show(ui) {
                        next_route = route;
                    }
                }
                Route::Upload => {
                    upload_action = self.upload_view.show(ui, &self.upload);
                }
                Route::Dashboard => {
                    run_clicked = self.dashboard_view.show(ui, &mut self.run);
                }
                Route::Reports => {
                    report_clicked =
                        self.reports_view
                            .show(ui, &mut self.report, self.sink.dir());
                }
            });
        });
        self.navigate(next_route);

        match upload_action {
            UploadAction::None => {}
            UploadAction::PickFile => {
                let initial_dir = self.last_directory.as_ref().and_then(|p| p.to_str());
                let _ = self.file_dialog.open(
                    egui_file_dialog::DialogMode::SelectFile,
                    true,
                    initial_dir,
                );
            }
            UploadAction::ClearSelection => self.upload.clear_selection(),
            UploadAction::Submit => self.start_upload(),
        }
        if run_clicked {
            self.start_run();
        }
        if report_clicked {
            self.start_report();
        }
    }
}
