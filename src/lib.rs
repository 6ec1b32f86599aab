pub mod chart;
pub mod collections;
pub mod config;
pub mod index;
pub mod time;
