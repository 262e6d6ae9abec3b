//! Per-floor image collection with active-image selection.
//!
//! Images arrive asynchronously as each file finishes decoding, so within
//! one multi-file selection the append order is decode-completion order,
//! not selection order.

use super::image::{FloorImage, ImageId};
use super::marker::MarkerId;

/// Ordered images of one floor, plus which one the canvas shows.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    images: Vec<FloorImage>,
    active: Option<ImageId>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[FloorImage] {
        &self.images
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn active_id(&self) -> Option<ImageId> {
        self.active
    }

    pub fn active(&self) -> Option<&FloorImage> {
        let id = self.active?;
        self.images.iter().find(|img| img.id == id)
    }

    pub fn active_mut(&mut self) -> Option<&mut FloorImage> {
        let id = self.active?;
        self.images.iter_mut().find(|img| img.id == id)
    }

    /// Append a freshly decoded image. The first image to arrive while
    /// nothing is active becomes the active image.
    pub fn append(&mut self, image: FloorImage) {
        if self.active.is_none() {
            self.active = Some(image.id);
        }
        self.images.push(image);
    }

    /// Remove an image and all markers on it. If it was active, the first
    /// remaining image in sequence order takes over, or none.
    pub fn remove(&mut self, id: ImageId) {
        self.images.retain(|img| img.id != id);
        if self.active == Some(id) {
            self.active = self.images.first().map(|img| img.id);
        }
    }

    /// Switch the displayed image. No-op if `id` is not in this gallery.
    pub fn set_active(&mut self, id: ImageId) {
        if self.images.iter().any(|img| img.id == id) {
            self.active = Some(id);
        }
    }

    /// Whether the marker is on the *active* image, i.e. still reachable
    /// from an open editor panel.
    pub fn marker_on_active(&self, id: MarkerId) -> bool {
        self.active().map(|img| img.contains_marker(id)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::image::test_image;
    use crate::state::marker::{MarkerKind, Position};

    #[test]
    fn first_appended_image_becomes_active() {
        let mut gallery = Gallery::new();
        assert!(gallery.active_id().is_none());

        let first = test_image();
        let first_id = first.id;
        gallery.append(first);
        assert_eq!(gallery.active_id(), Some(first_id));

        // A later arrival does not steal the active slot.
        gallery.append(test_image());
        assert_eq!(gallery.active_id(), Some(first_id));
    }

    #[test]
    fn set_active_ignores_unknown_ids() {
        let mut gallery = Gallery::new();
        let a = test_image();
        let a_id = a.id;
        gallery.append(a);

        gallery.set_active(ImageId::new());
        assert_eq!(gallery.active_id(), Some(a_id));
    }

    #[test]
    fn removing_active_promotes_first_remaining() {
        let mut gallery = Gallery::new();
        let a = test_image();
        let b = test_image();
        let c = test_image();
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        gallery.append(a);
        gallery.append(b);
        gallery.append(c);

        gallery.set_active(b_id);
        gallery.remove(b_id);
        assert_eq!(gallery.active_id(), Some(a_id));

        gallery.remove(a_id);
        assert_eq!(gallery.active_id(), Some(c_id));

        gallery.remove(c_id);
        assert!(gallery.active_id().is_none());
        assert!(gallery.is_empty());
    }

    #[test]
    fn removing_image_discards_its_markers() {
        let mut gallery = Gallery::new();
        gallery.append(test_image());
        let image_id = gallery.active_id().unwrap();

        let marker_id = gallery
            .active_mut()
            .unwrap()
            .place(Position::new(30.0, 40.0), MarkerKind::Hazard);
        assert!(gallery.marker_on_active(marker_id));

        gallery.remove(image_id);
        assert!(gallery.is_empty());
        assert!(!gallery.marker_on_active(marker_id));
    }
}
