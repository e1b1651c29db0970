// Library for tests to access modules

pub mod approval_repo;
pub mod chart;
pub mod config;
pub mod live;
pub mod metrics_repo;
pub mod models;
pub mod palette;
pub mod routes;
pub mod scheduler;
pub mod store;
pub mod version;
