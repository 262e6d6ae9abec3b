//! Marker kinds, the static marker catalog, and the marker data type.
//!
//! A marker is a typed, positioned, labeled annotation pinned onto a
//! floor-plan image. Positions are stored as percentages of the rendered
//! image box so markers stay put regardless of display size.

use uuid::Uuid;

/// Placeholder prompt shown as the initial label of a freshly placed note.
pub const NOTE_PLACEHOLDER: &str = "Nhập ghi chú...";

/// Closed set of annotation categories available in the toolbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    ElderlyOccupant,
    Child,
    MobilityAid,
    Hazard,
    FireExtinguisher,
    Pet,
    ExitRoute,
    /// Free-text chip; its label *is* the content, so it has no separate note.
    Note,
}

impl MarkerKind {
    /// Toolbox display order.
    pub const ALL: [MarkerKind; 8] = [
        MarkerKind::ElderlyOccupant,
        MarkerKind::Child,
        MarkerKind::MobilityAid,
        MarkerKind::Hazard,
        MarkerKind::FireExtinguisher,
        MarkerKind::Pet,
        MarkerKind::ExitRoute,
        MarkerKind::Note,
    ];

    /// Catalog entry for this kind. The `match` is total, so adding a new
    /// kind forces a new catalog entry.
    pub fn catalog(self) -> &'static CatalogEntry {
        match self {
            MarkerKind::ElderlyOccupant => &CatalogEntry {
                icon: "👵",
                default_label: "Người già",
                style_group: StyleGroup::Amber,
            },
            MarkerKind::Child => &CatalogEntry {
                icon: "👶",
                default_label: "Trẻ nhỏ",
                style_group: StyleGroup::Blue,
            },
            MarkerKind::MobilityAid => &CatalogEntry {
                icon: "♿",
                default_label: "Hỗ trợ vận động",
                style_group: StyleGroup::Purple,
            },
            MarkerKind::Hazard => &CatalogEntry {
                icon: "🔥",
                default_label: "Nguy hiểm cháy nổ",
                style_group: StyleGroup::Red,
            },
            MarkerKind::FireExtinguisher => &CatalogEntry {
                icon: "🧯",
                default_label: "Dụng cụ chữa cháy",
                style_group: StyleGroup::Green,
            },
            MarkerKind::Pet => &CatalogEntry {
                icon: "🐶",
                default_label: "Thú cưng",
                style_group: StyleGroup::Orange,
            },
            MarkerKind::ExitRoute => &CatalogEntry {
                icon: "🚪",
                default_label: "Lối thoát hiểm",
                style_group: StyleGroup::Emerald,
            },
            MarkerKind::Note => &CatalogEntry {
                icon: "T",
                default_label: "Văn bản / Ghi chú",
                style_group: StyleGroup::Slate,
            },
        }
    }

    /// Label a marker of this kind starts out with. Notes start with the
    /// placeholder prompt instead of the catalog noun.
    pub fn initial_label(self) -> &'static str {
        match self {
            MarkerKind::Note => NOTE_PLACEHOLDER,
            other => other.catalog().default_label,
        }
    }
}

/// Immutable display identity of a marker kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Glyph shown inside the marker badge.
    pub icon: &'static str,
    /// Label applied to freshly placed markers of this kind.
    pub default_label: &'static str,
    /// Color family used when rendering the badge.
    pub style_group: StyleGroup,
}

/// Color family of a marker badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleGroup {
    Amber,
    Blue,
    Purple,
    Red,
    Green,
    Orange,
    Emerald,
    Slate,
}

/// Session-unique marker identity. Stable for the marker's lifetime,
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(Uuid);

impl MarkerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MarkerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized marker position: percent offsets from the top-left of the
/// rendered image box. Values outside [0, 100] are possible when a drop
/// lands outside the box; they are stored as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A single annotation on a floor-plan image.
///
/// The kind is fixed at creation; position, label, and note are editable.
/// A marker belongs to exactly one image for its whole lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub position: Position,
    /// User-editable caption. For notes this is the displayed content.
    pub label: String,
    /// Extra detail that is not rendered on the image. Unused for notes.
    pub note: String,
}

impl Marker {
    /// Build a marker of `kind` at `position` with the catalog's initial
    /// label and a fresh id.
    pub fn new(kind: MarkerKind, position: Position) -> Self {
        Self {
            id: MarkerId::new(),
            kind,
            position,
            label: kind.initial_label().to_string(),
            note: String::new(),
        }
    }

    /// Whether the label has been customized away from the catalog default.
    pub fn has_custom_label(&self) -> bool {
        self.label != self.kind.catalog().default_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_total() {
        for kind in MarkerKind::ALL {
            let entry = kind.catalog();
            assert!(!entry.icon.is_empty());
            assert!(!entry.default_label.is_empty());
        }
    }

    #[test]
    fn note_starts_with_placeholder() {
        let note = Marker::new(MarkerKind::Note, Position::new(10.0, 10.0));
        assert_eq!(note.label, NOTE_PLACEHOLDER);

        let hazard = Marker::new(MarkerKind::Hazard, Position::new(10.0, 10.0));
        assert_eq!(hazard.label, "Nguy hiểm cháy nổ");
        assert!(!hazard.has_custom_label());
    }

    #[test]
    fn ids_are_unique() {
        let ids: Vec<MarkerId> = (0..256)
            .map(|_| Marker::new(MarkerKind::Pet, Position::new(0.0, 0.0)).id)
            .collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
