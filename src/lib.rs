pub mod api;
pub mod app;
pub mod capture;
pub mod config;
pub mod data;
pub mod editor;
pub mod media_url;
pub mod model;
pub mod quiz;
pub mod selection;
pub mod ui;
pub mod view_models;

pub use app::DrillApp;
