//! A single uploaded floor-plan image and the marker operations scoped to it.

use iced::widget::image::Handle;
use uuid::Uuid;

use super::marker::{Marker, MarkerId, MarkerKind, Position};
use crate::decode::DecodedImage;

/// Session-unique image identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded raster payload plus the display handle derived from it.
///
/// The whole payload stays in memory for the session; uploads are
/// floor-plan photos, not bulk archives.
#[derive(Debug, Clone)]
pub struct ImageData {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    handle: Handle,
}

impl ImageData {
    pub fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        let handle = Handle::from_bytes(bytes.clone());
        Self {
            bytes,
            width,
            height,
            handle,
        }
    }

    pub fn from_decoded(decoded: DecodedImage) -> Self {
        Self::new(decoded.bytes, decoded.width, decoded.height)
    }

    /// Handle for the iced image widget. Cheap to clone.
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// One floor-plan image together with the markers placed on it.
///
/// Marker mutation goes through the four operations below; all of them are
/// idempotent against stale ids (a drag payload can outlive its marker).
/// Insertion order is kept only for rendering stacking.
#[derive(Debug, Clone)]
pub struct FloorImage {
    pub id: ImageId,
    pub data: ImageData,
    markers: Vec<Marker>,
}

impl FloorImage {
    pub fn new(data: ImageData) -> Self {
        Self {
            id: ImageId::new(),
            data,
            markers: Vec::new(),
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn contains_marker(&self, id: MarkerId) -> bool {
        self.marker(id).is_some()
    }

    /// Place a new marker of `kind` at `position` and return its id.
    ///
    /// The caller is expected to open the inline editor for the returned id
    /// right away; placement always starts an edit session.
    pub fn place(&mut self, position: Position, kind: MarkerKind) -> MarkerId {
        let marker = Marker::new(kind, position);
        let id = marker.id;
        self.markers.push(marker);
        id
    }

    /// Delete the marker with `id`. No-op if it is not here.
    pub fn remove(&mut self, id: MarkerId) {
        self.markers.retain(|m| m.id != id);
    }

    /// Move the marker with `id` to `position`. No-op if it is not here.
    pub fn reposition(&mut self, id: MarkerId, position: Position) {
        if let Some(marker) = self.markers.iter_mut().find(|m| m.id == id) {
            marker.position = position;
        }
    }

    /// Write label and note together from the editor panel's current values.
    pub fn relabel(&mut self, id: MarkerId, label: String, note: String) {
        if let Some(marker) = self.markers.iter_mut().find(|m| m.id == id) {
            marker.label = label;
            marker.note = note;
        }
    }
}

#[cfg(test)]
pub(crate) fn test_image() -> FloorImage {
    FloorImage::new(ImageData::new(vec![0u8; 16], 4, 4))
}
