use bh_app::Route;
use bh_app::routes::{HOME_FEATURES, HOME_INTRO, HOME_TAGLINE};

const FEATURE_COLORS: [egui::Color32; 3] = [
    egui::Color32::from_rgb(37, 99, 235),
    egui::Color32::from_rgb(22, 163, 74),
    egui::Color32::from_rgb(147, 51, 234),
];

pub struct HomeView;

impl HomeView {
    /// Returns a route when one of the shortcut buttons was clicked.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<Route> {
        let mut goto = None;

        ui.add_space(12.0);
        ui.heading(HOME_TAGLINE);
        ui.add_space(6.0);
        ui.label(HOME_INTRO);
        ui.add_space(16.0);

        ui.columns(HOME_FEATURES.len(), |columns| {
            for (i, (title, blurb)) in HOME_FEATURES.iter().enumerate() {
                columns[i].group(|ui| {
                    ui.colored_label(FEATURE_COLORS[i], egui::RichText::new(*title).strong());
                    ui.label(*blurb);
                });
            }
        });

        ui.add_space(16.0);
        ui.horizontal(|ui| {
            for route in [Route::Upload, Route::Dashboard, Route::Reports] {
                if ui.button(route.title()).clicked() {
                    goto = Some(route);
                }
            }
        });

        goto
    }
}
