//! Pointer ↔ percentage coordinate mapping for the plan canvas.
//!
//! Markers are stored as percent offsets of the rendered image box, so a
//! pointer event is normalized against the box it landed in. Deliberately
//! unclamped: a drag released just outside the box yields coordinates
//! outside [0, 100], which are stored as-is. A degenerate zero-size box
//! maps everything to the origin instead of dividing by zero.

use iced::{Point, Rectangle};

use crate::state::marker::Position;

/// Normalize an absolute pointer position against the image box.
pub fn to_percent(pointer: Point, bounds: Rectangle) -> Position {
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return Position::new(0.0, 0.0);
    }
    Position::new(
        100.0 * (pointer.x - bounds.x) / bounds.width,
        100.0 * (pointer.y - bounds.y) / bounds.height,
    )
}

/// Inverse mapping, used for drawing markers and hit-testing clicks.
pub fn to_pixels(position: Position, bounds: Rectangle) -> Point {
    Point::new(
        bounds.x + bounds.width * position.x / 100.0,
        bounds.y + bounds.height * position.y / 100.0,
    )
}
