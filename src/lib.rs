// Library for tests to access modules

pub mod analysis;
pub mod config;
pub mod format;
pub mod history;
pub mod models;
pub mod monitor;
pub mod policy;
pub mod sources;
pub mod sysinfo_repo;
pub mod version;
pub mod worker;
