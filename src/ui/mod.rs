//! Widgets and canvas programs for the floor-plan editor.

pub mod coords;
pub mod editor;
pub mod plan_canvas;
