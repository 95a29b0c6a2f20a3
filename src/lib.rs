pub mod analysis;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod pose;
pub mod protocol;
pub mod session;
