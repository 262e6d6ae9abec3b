//! Marker overlay canvas for one floor-plan image.
//!
//! Sits in a stack on top of the image widget and owns all pointer
//! interaction: click placement, marker clicks, in-canvas marker dragging,
//! and receiving toolbox drags. The canvas only reports *what happened
//! where*; the shell routes the event through the floor's `EditorSession`.

use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Stroke};
use iced::{Color, Point, Rectangle, Size};

use crate::state::household::FloorPath;
use crate::state::marker::{Marker, MarkerId, MarkerKind, StyleGroup};
use crate::ui::coords;
use crate::Message;

/// Click target radius around a marker center, in pixels.
const HIT_RADIUS: f32 = 16.0;
/// Pointer travel before a press becomes a drag instead of a click.
const DRAG_THRESHOLD: f32 = 4.0;
const BADGE_RADIUS: f32 = 14.0;
/// Radius of the hover delete button drawn at a marker's corner.
const DELETE_RADIUS: f32 = 7.0;

/// One frame's view of a floor's active image, borrowed from the shell.
pub struct PlanCanvas<'a> {
    pub floor: FloorPath,
    pub markers: &'a [Marker],
    /// Marker whose inline editor is open, drawn with a focus ring.
    pub editing: Option<MarkerId>,
    /// Whether a toolbox chip is currently being dragged anywhere in the
    /// app; a release over this canvas is then a drop.
    pub toolbox_drag: bool,
    /// Armed tool, used only for the cursor shape.
    pub armed: Option<MarkerKind>,
}

/// Transient pointer state between press and release.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pressed_marker: Option<MarkerId>,
    pressed: bool,
    press_origin: Option<Point>,
    dragging: bool,
}

impl Interaction {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl<'a> PlanCanvas<'a> {
    /// Topmost marker under the pointer, honoring stacking order.
    fn hit_test(&self, pointer: Point, bounds: Rectangle) -> Option<MarkerId> {
        self.markers.iter().rev().find_map(|marker| {
            let center = coords::to_pixels(marker.position, bounds);
            if pointer.distance(center) <= HIT_RADIUS {
                Some(marker.id)
            } else {
                None
            }
        })
    }

    /// Topmost marker whose delete button is under the pointer.
    fn hit_delete(&self, pointer: Point, bounds: Rectangle) -> Option<MarkerId> {
        self.markers.iter().rev().find_map(|marker| {
            (pointer.distance(delete_anchor(marker, bounds)) <= DELETE_RADIUS)
                .then_some(marker.id)
        })
    }
}

/// Center of a marker's hover delete button: top-right corner of the badge
/// circle, or of the note chip.
fn delete_anchor(marker: &Marker, bounds: Rectangle) -> Point {
    let center = coords::to_pixels(marker.position, bounds);
    if marker.kind == MarkerKind::Note {
        let width = 16.0 + 6.5 * marker.label.chars().count() as f32;
        Point::new(center.x + width / 2.0, center.y - 11.0)
    } else {
        Point::new(center.x + BADGE_RADIUS, center.y - BADGE_RADIUS)
    }
}

impl<'a> canvas::Program<Message> for PlanCanvas<'a> {
    type State = Interaction;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(pos) = cursor.position() {
                    if bounds.contains(pos) {
                        state.pressed = true;
                        state.pressed_marker = self.hit_test(pos, bounds);
                        state.press_origin = Some(pos);
                        state.dragging = false;
                        return (canvas::event::Status::Captured, None);
                    }
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.pressed && !state.dragging {
                    if let (Some(origin), Some(pos)) = (state.press_origin, cursor.position()) {
                        if origin.distance(pos) > DRAG_THRESHOLD {
                            state.dragging = true;
                        }
                    }
                }
                if state.pressed {
                    return (canvas::event::Status::Captured, None);
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let pressed = state.pressed;
                let pressed_marker = state.pressed_marker;
                let dragging = state.dragging;
                state.reset();

                let Some(pos) = cursor.position() else {
                    return (canvas::event::Status::Ignored, None);
                };
                // A release outside the canvas cancels whatever was in
                // flight; nothing is dropped or clicked.
                if !bounds.contains(pos) {
                    return (canvas::event::Status::Ignored, None);
                }

                let dragged_marker = if dragging { pressed_marker } else { None };

                // Drop: a toolbox chip released here, and/or a marker drag
                // ending here. The shell resolves payload precedence. A
                // chip drag never starts with a press on this canvas, so a
                // press means the drag flag is stale and this is a click.
                if (self.toolbox_drag && !pressed) || dragged_marker.is_some() {
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::CanvasDropped {
                            floor: self.floor,
                            at: coords::to_percent(pos, bounds),
                            existing: dragged_marker,
                        }),
                    );
                }

                if !pressed {
                    return (canvas::event::Status::Ignored, None);
                }

                if let Some(id) = self.hit_delete(pos, bounds) {
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::MarkerRemoved(self.floor, id)),
                    );
                }

                if let Some(id) = pressed_marker {
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::MarkerClicked {
                            floor: self.floor,
                            id,
                        }),
                    );
                }

                return (
                    canvas::event::Status::Captured,
                    Some(Message::CanvasClicked {
                        floor: self.floor,
                        at: coords::to_percent(pos, bounds),
                    }),
                );
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let local = Rectangle {
            x: 0.0,
            y: 0.0,
            width: bounds.width,
            height: bounds.height,
        };
        let pointer = cursor.position_in(bounds);

        for marker in self.markers {
            let center = coords::to_pixels(marker.position, local);
            let palette = style_colors(marker.kind.catalog().style_group);

            if marker.kind == MarkerKind::Note {
                draw_note_chip(&mut frame, marker, center, palette);
            } else {
                draw_badge(&mut frame, marker, center, palette);
            }

            let hovered = pointer.is_some_and(|p| {
                p.distance(center) <= HIT_RADIUS
                    || p.distance(delete_anchor(marker, local)) <= DELETE_RADIUS
            });
            if hovered {
                draw_delete_button(&mut frame, delete_anchor(marker, local));
            }

            if self.editing == Some(marker.id) {
                frame.stroke(
                    &Path::circle(center, BADGE_RADIUS + 4.0),
                    Stroke::default()
                        .with_color(Color::from_rgb8(0xdc, 0x26, 0x26))
                        .with_width(3.0),
                );
            }
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.dragging {
            return mouse::Interaction::Grabbing;
        }
        if let Some(pos) = cursor.position() {
            if bounds.contains(pos) {
                if self.hit_delete(pos, bounds).is_some() {
                    return mouse::Interaction::Pointer;
                }
                if self.hit_test(pos, bounds).is_some() {
                    return mouse::Interaction::Grab;
                }
                if self.armed.is_some() || self.toolbox_drag {
                    return mouse::Interaction::Crosshair;
                }
            }
        }
        mouse::Interaction::Idle
    }
}

/// Fill and border colors of a style group.
fn style_colors(group: StyleGroup) -> (Color, Color) {
    match group {
        StyleGroup::Amber => (Color::from_rgb8(0xfe, 0xf3, 0xc7), Color::from_rgb8(0xd9, 0x77, 0x06)),
        StyleGroup::Blue => (Color::from_rgb8(0xdb, 0xea, 0xfe), Color::from_rgb8(0x25, 0x63, 0xeb)),
        StyleGroup::Purple => (Color::from_rgb8(0xf3, 0xe8, 0xff), Color::from_rgb8(0x93, 0x33, 0xea)),
        StyleGroup::Red => (Color::from_rgb8(0xfe, 0xe2, 0xe2), Color::from_rgb8(0xdc, 0x26, 0x26)),
        StyleGroup::Green => (Color::from_rgb8(0xdc, 0xfc, 0xe7), Color::from_rgb8(0x16, 0xa3, 0x4a)),
        StyleGroup::Orange => (Color::from_rgb8(0xff, 0xed, 0xd5), Color::from_rgb8(0xea, 0x58, 0x0c)),
        StyleGroup::Emerald => (Color::from_rgb8(0xd1, 0xfa, 0xe5), Color::from_rgb8(0x05, 0x96, 0x69)),
        StyleGroup::Slate => (Color::from_rgb8(0xff, 0xff, 0xff), Color::from_rgb8(0x64, 0x74, 0x8b)),
    }
}

fn draw_badge(frame: &mut canvas::Frame, marker: &Marker, center: Point, palette: (Color, Color)) {
    let (fill, border) = palette;
    let circle = Path::circle(center, BADGE_RADIUS);
    frame.fill(&circle, fill);
    frame.stroke(&circle, Stroke::default().with_color(border).with_width(2.0));

    frame.fill_text(canvas::Text {
        content: marker.kind.catalog().icon.to_string(),
        position: center,
        color: border,
        size: 16.0.into(),
        horizontal_alignment: iced::alignment::Horizontal::Center,
        vertical_alignment: iced::alignment::Vertical::Center,
        shaping: iced::widget::text::Shaping::Advanced,
        ..canvas::Text::default()
    });

    // Customized labels get a small caption under the badge.
    if marker.has_custom_label() {
        frame.fill_text(canvas::Text {
            content: marker.label.clone(),
            position: Point::new(center.x, center.y + BADGE_RADIUS + 10.0),
            color: Color::from_rgb8(0x1e, 0x29, 0x3b),
            size: 10.0.into(),
            horizontal_alignment: iced::alignment::Horizontal::Center,
            vertical_alignment: iced::alignment::Vertical::Center,
            shaping: iced::widget::text::Shaping::Advanced,
            ..canvas::Text::default()
        });
    }
}

fn draw_delete_button(frame: &mut canvas::Frame, anchor: Point) {
    let dot = Path::circle(anchor, DELETE_RADIUS);
    frame.fill(&dot, Color::from_rgb8(0xdc, 0x26, 0x26));
    frame.fill_text(canvas::Text {
        content: "✕".to_string(),
        position: anchor,
        color: Color::WHITE,
        size: 9.0.into(),
        horizontal_alignment: iced::alignment::Horizontal::Center,
        vertical_alignment: iced::alignment::Vertical::Center,
        shaping: iced::widget::text::Shaping::Advanced,
        ..canvas::Text::default()
    });
}

fn draw_note_chip(frame: &mut canvas::Frame, marker: &Marker, center: Point, palette: (Color, Color)) {
    let (fill, border) = palette;
    // Approximate text extent; canvas text is not measured up front.
    let width = 16.0 + 6.5 * marker.label.chars().count() as f32;
    let height = 22.0;
    let top_left = Point::new(center.x - width / 2.0, center.y - height / 2.0);

    let chip = Path::rounded_rectangle(top_left, Size::new(width, height), 6.0.into());
    frame.fill(&chip, fill);
    frame.stroke(&chip, Stroke::default().with_color(border).with_width(1.5));

    frame.fill_text(canvas::Text {
        content: marker.label.clone(),
        position: center,
        color: Color::from_rgb8(0x1e, 0x29, 0x3b),
        size: 11.0.into(),
        horizontal_alignment: iced::alignment::Horizontal::Center,
        vertical_alignment: iced::alignment::Vertical::Center,
        shaping: iced::widget::text::Shaping::Advanced,
        ..canvas::Text::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::household::{BuildingId, FloorId};
    use crate::state::marker::Position;
    use iced::widget::canvas::Program;

    const BOUNDS: Rectangle = Rectangle {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    };

    fn path() -> FloorPath {
        FloorPath {
            building: BuildingId::new(),
            floor: FloorId::new(),
        }
    }

    fn test_canvas<'a>(markers: &'a [Marker], toolbox_drag: bool) -> PlanCanvas<'a> {
        PlanCanvas {
            floor: path(),
            markers,
            editing: None,
            toolbox_drag,
            armed: None,
        }
    }

    fn press() -> canvas::Event {
        canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left))
    }

    fn moved(x: f32, y: f32) -> canvas::Event {
        canvas::Event::Mouse(mouse::Event::CursorMoved {
            position: Point::new(x, y),
        })
    }

    fn release() -> canvas::Event {
        canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
    }

    fn at(x: f32, y: f32) -> Cursor {
        Cursor::Available(Point::new(x, y))
    }

    #[test]
    fn click_with_pending_toolbox_drag_stays_a_click() {
        let canvas = test_canvas(&[], true);
        let mut state = Interaction::default();

        // Press and release in place: the drag flag is left over from an
        // aborted chip drag and must not reclassify this as a drop.
        let (_, msg) = canvas.update(&mut state, press(), BOUNDS, at(50.0, 50.0));
        assert!(msg.is_none());
        let (_, msg) = canvas.update(&mut state, release(), BOUNDS, at(50.0, 50.0));
        assert!(
            matches!(msg, Some(Message::CanvasClicked { .. })),
            "expected a click, got {msg:?}"
        );
    }

    #[test]
    fn release_without_canvas_press_is_a_toolbox_drop() {
        let canvas = test_canvas(&[], true);
        let mut state = Interaction::default();

        let (_, msg) = canvas.update(&mut state, release(), BOUNDS, at(30.0, 40.0));
        match msg {
            Some(Message::CanvasDropped { at, existing, .. }) => {
                assert_eq!(existing, None);
                assert_eq!(at, Position::new(30.0, 40.0));
            }
            other => panic!("expected a drop, got {other:?}"),
        }
    }

    #[test]
    fn dragging_a_marker_reports_a_reposition_drop() {
        let markers = [Marker::new(MarkerKind::Pet, Position::new(50.0, 50.0))];
        let id = markers[0].id;
        let canvas = test_canvas(&markers, false);
        let mut state = Interaction::default();

        canvas.update(&mut state, press(), BOUNDS, at(50.0, 50.0));
        canvas.update(&mut state, moved(80.0, 20.0), BOUNDS, at(80.0, 20.0));
        let (_, msg) = canvas.update(&mut state, release(), BOUNDS, at(80.0, 20.0));
        match msg {
            Some(Message::CanvasDropped { at, existing, .. }) => {
                assert_eq!(existing, Some(id));
                assert_eq!(at, Position::new(80.0, 20.0));
            }
            other => panic!("expected a drop, got {other:?}"),
        }
    }

    #[test]
    fn clicking_a_markers_delete_button_removes_it() {
        let markers = [Marker::new(MarkerKind::Hazard, Position::new(50.0, 50.0))];
        let id = markers[0].id;
        let canvas = test_canvas(&markers, false);
        let mut state = Interaction::default();

        // The delete button sits at the badge's top-right corner.
        let (x, y) = (50.0 + BADGE_RADIUS, 50.0 - BADGE_RADIUS);
        canvas.update(&mut state, press(), BOUNDS, at(x, y));
        let (_, msg) = canvas.update(&mut state, release(), BOUNDS, at(x, y));
        assert!(
            matches!(msg, Some(Message::MarkerRemoved(_, got)) if got == id),
            "expected a removal, got {msg:?}"
        );
    }

    #[test]
    fn release_outside_bounds_cancels() {
        let canvas = test_canvas(&[], true);
        let mut state = Interaction::default();

        let (_, msg) = canvas.update(&mut state, release(), BOUNDS, at(200.0, 200.0));
        assert!(msg.is_none());
    }
}
