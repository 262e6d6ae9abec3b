//! Floor-plan editor interaction state: tool arming, click placement,
//! drag-and-drop resolution, and the single-marker edit focus.
//!
//! One `EditorSession` exists per floor. The armed tool is deliberately
//! *not* stored here: a single selection value lives in the application
//! shell and is passed into every session, so arming a tool on one floor
//! keeps it armed on every other floor.

use super::gallery::Gallery;
use super::marker::{MarkerId, MarkerKind, Position};

/// What a drop event carries onto the canvas. The two variants are
/// mutually exclusive at the source; when both somehow arrive in one drop,
/// `NewFromCatalog` wins (see [`resolve_drop`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPayload {
    /// A toolbox entry dragged onto the canvas: create a new marker.
    NewFromCatalog(MarkerKind),
    /// An existing marker dragged to a new spot on the same image.
    RepositionExisting(MarkerId),
}

/// Collapse the raw transfer fields of a drop event into one payload.
/// A new-marker payload takes precedence over an existing-marker one.
pub fn resolve_drop(
    from_toolbox: Option<MarkerKind>,
    existing: Option<MarkerId>,
) -> Option<DropPayload> {
    if let Some(kind) = from_toolbox {
        return Some(DropPayload::NewFromCatalog(kind));
    }
    existing.map(DropPayload::RepositionExisting)
}

/// Toggle semantics of the toolbox: clicking the armed kind disarms it,
/// clicking any other kind re-arms.
pub fn toggle_tool(current: Option<MarkerKind>, clicked: MarkerKind) -> Option<MarkerKind> {
    if current == Some(clicked) {
        None
    } else {
        Some(clicked)
    }
}

/// Per-floor edit-focus state machine. At most one marker is being edited
/// at a time within a session.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    editing: Option<MarkerId>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The marker whose inline editor is open, if any.
    pub fn editing(&self) -> Option<MarkerId> {
        self.editing
    }

    pub fn close(&mut self) {
        self.editing = None;
    }

    /// A marker badge was clicked: open its editor, closing any other.
    pub fn open(&mut self, id: MarkerId) {
        self.editing = Some(id);
    }

    /// Empty canvas was clicked. Closing an open editor takes priority over
    /// placing; the same click never does both. Placement requires an armed
    /// tool and an active image, leaves the tool armed, and opens the new
    /// marker's editor immediately.
    pub fn canvas_clicked(
        &mut self,
        gallery: &mut Gallery,
        at: Position,
        armed: Option<MarkerKind>,
    ) {
        if self.editing.is_some() {
            self.editing = None;
            return;
        }
        let Some(kind) = armed else { return };
        if let Some(image) = gallery.active_mut() {
            self.editing = Some(image.place(at, kind));
        }
    }

    /// A drop landed on the canvas at `at`. New markers open their editor;
    /// a reposition moves the marker without touching edit focus. Stale
    /// reposition ids are silent no-ops.
    pub fn drop_received(&mut self, gallery: &mut Gallery, at: Position, payload: DropPayload) {
        let Some(image) = gallery.active_mut() else {
            return;
        };
        match payload {
            DropPayload::NewFromCatalog(kind) => {
                self.editing = Some(image.place(at, kind));
            }
            DropPayload::RepositionExisting(id) => {
                image.reposition(id, at);
            }
        }
    }

    /// Delete a marker from the active image; if it was the one being
    /// edited, the edit session closes with it.
    pub fn remove_marker(&mut self, gallery: &mut Gallery, id: MarkerId) {
        if let Some(image) = gallery.active_mut() {
            image.remove(id);
        }
        if self.editing == Some(id) {
            self.editing = None;
        }
    }

    /// Live keystroke from the edit panel: write label and note together
    /// onto the marker on the active image.
    pub fn relabel(&mut self, gallery: &mut Gallery, id: MarkerId, label: String, note: String) {
        if let Some(image) = gallery.active_mut() {
            image.relabel(id, label, note);
        }
    }

    /// Drop edit focus when its marker is no longer reachable: the owning
    /// image was removed, the active image switched, or the marker was
    /// removed by any path. Call after every gallery mutation.
    pub fn sync(&mut self, gallery: &Gallery) {
        if let Some(id) = self.editing {
            if !gallery.marker_on_active(id) {
                self.editing = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::image::test_image;
    use crate::state::marker::MarkerKind;

    fn gallery_with_image() -> Gallery {
        let mut gallery = Gallery::new();
        gallery.append(test_image());
        gallery
    }

    #[test]
    fn toggling_the_armed_kind_disarms_it() {
        let armed = toggle_tool(None, MarkerKind::Hazard);
        assert_eq!(armed, Some(MarkerKind::Hazard));
        let armed = toggle_tool(armed, MarkerKind::Hazard);
        assert_eq!(armed, None);
        let armed = toggle_tool(Some(MarkerKind::Hazard), MarkerKind::Pet);
        assert_eq!(armed, Some(MarkerKind::Pet));
    }

    #[test]
    fn click_places_and_opens_editor() {
        let mut gallery = gallery_with_image();
        let mut session = EditorSession::new();

        session.canvas_clicked(&mut gallery, Position::new(30.0, 40.0), Some(MarkerKind::Hazard));

        let image = gallery.active().unwrap();
        assert_eq!(image.markers().len(), 1);
        let marker = &image.markers()[0];
        assert_eq!(marker.kind, MarkerKind::Hazard);
        assert_eq!(marker.position, Position::new(30.0, 40.0));
        assert_eq!(session.editing(), Some(marker.id));
    }

    #[test]
    fn click_without_armed_tool_or_image_places_nothing() {
        let mut empty = Gallery::new();
        let mut session = EditorSession::new();
        session.canvas_clicked(&mut empty, Position::new(10.0, 10.0), Some(MarkerKind::Pet));
        assert!(session.editing().is_none());

        let mut gallery = gallery_with_image();
        session.canvas_clicked(&mut gallery, Position::new(10.0, 10.0), None);
        assert!(gallery.active().unwrap().markers().is_empty());
    }

    #[test]
    fn click_with_open_editor_closes_and_suppresses_placement() {
        let mut gallery = gallery_with_image();
        let mut session = EditorSession::new();

        session.canvas_clicked(&mut gallery, Position::new(10.0, 10.0), Some(MarkerKind::Pet));
        assert!(session.editing().is_some());

        // Editor open: this click only closes it, even though a tool is armed.
        session.canvas_clicked(&mut gallery, Position::new(60.0, 60.0), Some(MarkerKind::Pet));
        assert!(session.editing().is_none());
        assert_eq!(gallery.active().unwrap().markers().len(), 1);
    }

    #[test]
    fn edit_focus_is_exclusive() {
        let mut gallery = gallery_with_image();
        let mut session = EditorSession::new();

        let image = gallery.active_mut().unwrap();
        let a = image.place(Position::new(10.0, 10.0), MarkerKind::Child);
        let b = image.place(Position::new(20.0, 20.0), MarkerKind::Pet);

        session.open(a);
        assert_eq!(session.editing(), Some(a));
        session.open(b);
        assert_eq!(session.editing(), Some(b));
    }

    #[test]
    fn new_from_catalog_wins_over_reposition() {
        let mut gallery = gallery_with_image();
        let mut session = EditorSession::new();

        let existing = gallery
            .active_mut()
            .unwrap()
            .place(Position::new(10.0, 10.0), MarkerKind::ExitRoute);

        let payload = resolve_drop(Some(MarkerKind::Hazard), Some(existing)).unwrap();
        assert_eq!(payload, DropPayload::NewFromCatalog(MarkerKind::Hazard));

        session.drop_received(&mut gallery, Position::new(70.0, 70.0), payload);

        let image = gallery.active().unwrap();
        assert_eq!(image.markers().len(), 2);
        // The existing marker did not move.
        assert_eq!(
            image.marker(existing).unwrap().position,
            Position::new(10.0, 10.0)
        );
    }

    #[test]
    fn reposition_drop_moves_without_stealing_focus() {
        let mut gallery = gallery_with_image();
        let mut session = EditorSession::new();

        let image = gallery.active_mut().unwrap();
        let moved = image.place(Position::new(10.0, 10.0), MarkerKind::Pet);
        let edited = image.place(Position::new(20.0, 20.0), MarkerKind::Child);
        session.open(edited);

        let payload = resolve_drop(None, Some(moved)).unwrap();
        session.drop_received(&mut gallery, Position::new(80.0, 90.0), payload);

        assert_eq!(
            gallery.active().unwrap().marker(moved).unwrap().position,
            Position::new(80.0, 90.0)
        );
        assert_eq!(session.editing(), Some(edited));
    }

    #[test]
    fn drop_with_no_payload_resolves_to_none() {
        assert_eq!(resolve_drop(None, None), None);
    }

    #[test]
    fn removing_the_edited_marker_closes_its_editor() {
        let mut gallery = gallery_with_image();
        let mut session = EditorSession::new();

        session.canvas_clicked(&mut gallery, Position::new(10.0, 10.0), Some(MarkerKind::Hazard));
        let id = session.editing().unwrap();

        session.remove_marker(&mut gallery, id);
        assert!(session.editing().is_none());
        assert!(gallery.active().unwrap().markers().is_empty());
    }

    #[test]
    fn stale_focus_is_dropped_when_image_goes_away() {
        let mut gallery = gallery_with_image();
        let mut session = EditorSession::new();

        session.canvas_clicked(&mut gallery, Position::new(10.0, 10.0), Some(MarkerKind::Note));
        assert!(session.editing().is_some());

        let image_id = gallery.active_id().unwrap();
        gallery.remove(image_id);
        session.sync(&gallery);
        assert!(session.editing().is_none());
    }

    #[test]
    fn stale_focus_is_dropped_when_active_image_switches() {
        let mut gallery = gallery_with_image();
        gallery.append(test_image());
        let second = gallery.images()[1].id;
        let mut session = EditorSession::new();

        session.canvas_clicked(&mut gallery, Position::new(10.0, 10.0), Some(MarkerKind::Pet));
        assert!(session.editing().is_some());

        gallery.set_active(second);
        session.sync(&gallery);
        assert!(session.editing().is_none());
    }

    /// End-to-end: upload, arm, place, relabel, confirm, remove image.
    #[test]
    fn report_a_gas_cylinder_then_discard_the_photo() {
        let mut gallery = Gallery::new();
        let mut session = EditorSession::new();
        let mut armed = None;

        // Upload one image: it becomes active.
        gallery.append(test_image());
        assert_eq!(gallery.len(), 1);
        assert!(gallery.active().is_some());

        // Arm the hazard tool and click the canvas.
        armed = toggle_tool(armed, MarkerKind::Hazard);
        session.canvas_clicked(&mut gallery, Position::new(30.0, 40.0), armed);

        let marker_id = session.editing().expect("placement opens the editor");
        {
            let marker = gallery.active().unwrap().marker(marker_id).unwrap();
            assert_eq!(marker.kind, MarkerKind::Hazard);
            assert_eq!(marker.position, Position::new(30.0, 40.0));
        }

        // Type a label, then confirm: edits apply live, Enter just closes.
        session.relabel(&mut gallery, marker_id, "Bình gas".to_string(), String::new());
        session.close();
        assert!(session.editing().is_none());
        assert_eq!(
            gallery.active().unwrap().marker(marker_id).unwrap().label,
            "Bình gas"
        );

        // Remove the image: gallery empties, markers are gone, no active image.
        let image_id = gallery.active_id().unwrap();
        gallery.remove(image_id);
        session.sync(&gallery);
        assert!(gallery.is_empty());
        assert!(gallery.active_id().is_none());
    }
}
