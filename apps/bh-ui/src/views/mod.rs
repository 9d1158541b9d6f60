pub mod dashboard_view;
pub mod home_view;
pub mod reports_view;
pub mod upload_view;

pub use dashboard_view::DashboardView;
pub use home_view::HomeView;
pub use reports_view::ReportsView;
pub use upload_view::{UploadAction, UploadView};
