use bh_app::ReportFlow;
use std::path::Path;

pub struct ReportsView;

impl ReportsView {
    /// Returns true when the download button was clicked.
    pub fn show(&mut self, ui: &mut egui::Ui, flow: &mut ReportFlow, download_dir: &Path) -> bool {
        let mut clicked = false;

        ui.heading("Download Federation Report");
        ui.add_space(8.0);

        ui.group(|ui| {
            ui.add_enabled(
                !flow.is_loading(),
                egui::TextEdit::singleline(&mut flow.model_id_input)
                    .hint_text("Enter Model ID")
                    .desired_width(f32::INFINITY),
            );
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let label = if flow.is_loading() {
                    "Downloading..."
                } else {
                    "Download Report"
                };
                if ui
                    .add_enabled(!flow.is_loading(), egui::Button::new(label))
                    .clicked()
                {
                    clicked = true;
                }
                if flow.is_loading() {
                    ui.spinner();
                }
            });
            ui.weak(format!("Reports are saved to {}", download_dir.display()));
        });

        if let Some(saved) = flow.saved() {
            ui.add_space(12.0);
            ui.group(|ui| {
                ui.colored_label(
                    egui::Color32::from_rgb(21, 128, 61),
                    format!("Saved {} ({} bytes)", saved.file_name, saved.size_bytes),
                );
                ui.weak(saved.path.display().to_string());
            });
        }

        clicked
    }
}
