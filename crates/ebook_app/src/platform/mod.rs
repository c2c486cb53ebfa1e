pub mod app;
pub mod effects;
pub mod ui;
