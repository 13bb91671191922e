//! egui front end: controller, presentation state and renderer.

pub mod controller;
pub mod state;
pub mod ui;
