// Library for tests to access modules

pub mod archive_policy;
pub mod archive_writer;
pub mod config;
pub mod models;
pub mod paths;
pub mod plugin;
pub mod rrd;
pub mod worker;
