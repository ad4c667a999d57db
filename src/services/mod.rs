pub mod activity;
pub mod cart;
pub mod catalog;
pub mod dashboard;
pub mod preferences;
pub mod recommendations;
pub mod search;

pub use activity::{ActivityRecorder, ActivityWriterHandle};
pub use cart::CartStore;
pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use preferences::PreferenceProfile;
pub use recommendations::{RecommendationProvider, RecommendationSettings};
pub use search::SearchGateway;
