pub mod advisor;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod fx;
pub mod model;
pub mod rollup;
pub mod siting;
pub mod store;
pub mod template;

pub use config::Config;
pub use dashboard::Dashboard;
pub use store::ProjectStore;
