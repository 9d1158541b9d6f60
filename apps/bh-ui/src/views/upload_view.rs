use bh_app::{SUPPORTED_MODEL_EXTENSIONS, UploadFlow};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UploadAction {
    None,
    PickFile,
    ClearSelection,
    Submit,
}

pub struct UploadView;

impl UploadView {
    pub fn show(&mut self, ui: &mut egui::Ui, flow: &UploadFlow) -> UploadAction {
        let mut action = UploadAction::None;

        ui.heading("Upload AI Model");
        ui.add_space(8.0);

        ui.group(|ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!flow.is_loading(), egui::Button::new("Choose File…"))
                    .clicked()
                {
                    action = UploadAction::PickFile;
                }
                ui.weak(format!(
                    "Accepted: {}",
                    SUPPORTED_MODEL_EXTENSIONS
                        .iter()
                        .map(|e| format!(".{e}"))
                        .collect::<Vec<_>>()
                        .join(" ")
                ));
            });

            if let Some(file) = flow.selected_file() {
                ui.separator();
                ui.horizontal(|ui| {
                    ui.strong("Selected:");
                    ui.label(&file.file_name);
                    if ui
                        .add_enabled(!flow.is_loading(), egui::Button::new("✖"))
                        .on_hover_text("Clear selection")
                        .clicked()
                    {
                        action = UploadAction::ClearSelection;
                    }
                });
                ui.weak(format!("Size: {:.2} KB", file.size_kb()));
                if !file.has_supported_extension() {
                    ui.colored_label(
                        egui::Color32::from_rgb(202, 138, 4),
                        "This extension is not a known model format",
                    );
                }
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let label = if flow.is_loading() {
                    "Uploading..."
                } else {
                    "Upload Model"
                };
                if ui
                    .add_enabled(flow.can_submit(), egui::Button::new(label))
                    .clicked()
                {
                    action = UploadAction::Submit;
                }
                if flow.is_loading() {
                    ui.spinner();
                }
            });
        });

        if let Some(id) = flow.model_id() {
            ui.add_space(12.0);
            ui.group(|ui| {
                ui.colored_label(egui::Color32::from_rgb(21, 128, 61), "Uploaded Model ID:");
                ui.horizontal(|ui| {
                    ui.code(id.as_str());
                    if ui.small_button("Copy").clicked() {
                        ui.output_mut(|o| o.copied_text = id.to_string());
                    }
                });
            });
        }

        if let Some(error) = flow.last_error() {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::RED, error);
        }

        action
    }
}
