//! The four navigable views and the static copy shown on Home.

use std::fmt;

pub const PRODUCT_NAME: &str = "Benchmark Health";
pub const HOME_TAGLINE: &str = "Federated AI Evaluation Platform";
pub const HOME_INTRO: &str = "Benchmark Health enables secure federated evaluation of AI \
models across multiple hospitals without sharing sensitive data.";

/// `(title, blurb)` for each feature card on Home.
pub const HOME_FEATURES: [(&str, &str); 3] = [
    ("Privacy Preserving", "Models are evaluated locally at hospitals."),
    ("Bias Monitoring", "Track fairness metrics across nodes."),
    ("Auto Reports", "Generate compliance-ready reports instantly."),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Home,
    Upload,
    Dashboard,
    Reports,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Home, Route::Upload, Route::Dashboard, Route::Reports];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Upload => "/upload",
            Route::Dashboard => "/dashboard",
            Route::Reports => "/reports",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Upload => "Upload Model",
            Route::Dashboard => "Dashboard",
            Route::Reports => "Reports",
        }
    }

    /// Resolve a path; a trailing slash is ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" if trimmed.starts_with('/') => "/",
            other => other,
        };
        Route::ALL.into_iter().find(|r| r.path() == normalized)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
