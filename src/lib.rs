// Library for tests to access modules

pub mod aggregate;
pub mod config;
pub mod delta;
pub mod hub_repo;
pub mod mcstatus_repo;
pub mod models;
pub mod routes;
pub mod snapshot;
pub mod snapshot_repo;
pub mod version;
pub mod worker;
