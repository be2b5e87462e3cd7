pub mod chart;
pub mod config;
pub mod data;
pub mod dbf;
pub mod error;
pub mod join;
pub mod lookup;
pub mod numerals;
pub mod poi;
pub mod profile;
pub mod render;
pub mod scoring;
pub mod server;
pub mod stations;
pub mod types;
