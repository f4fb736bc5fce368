pub mod aggregate;
pub mod app;
pub mod bucket;
pub mod config;
pub mod correlate;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod state;
pub mod stats;
pub mod storage;
pub mod trend;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::RecordStore;
