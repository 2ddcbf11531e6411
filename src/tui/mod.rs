//! Terminal UI: preview the CSV, start the run, watch progress

pub mod app;
pub mod ui;

pub use app::App;
