//! The household aggregate: Building → Floor → Image ownership tree plus
//! the flat form fields (address, GPS, reporter, residents, descriptions).
//!
//! Every level exclusively owns the next, so each mutation is a `&mut`
//! walk from the single root. Cascades fall out of ownership: dropping a
//! building drops its floors, images, and markers.

use thiserror::Error;
use uuid::Uuid;

use super::gallery::Gallery;
use crate::geo::Coordinates;

/// Session-unique floor identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloorId(Uuid);

impl FloorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FloorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Session-unique building identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildingId(Uuid);

impl BuildingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BuildingId {
    fn default() -> Self {
        Self::new()
    }
}

/// Address of one floor inside the building tree. Canvas events carry this
/// so the shell can route them to the owning gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloorPath {
    pub building: BuildingId,
    pub floor: FloorId,
}

/// One floor of a building: an editable display name and its image gallery.
#[derive(Debug, Clone)]
pub struct Floor {
    pub id: FloorId,
    pub name: String,
    pub gallery: Gallery,
}

impl Floor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FloorId::new(),
            name: name.into(),
            gallery: Gallery::new(),
        }
    }

    /// The ground floor every new building starts with.
    pub fn ground() -> Self {
        Self::new("Tầng trệt")
    }
}

/// One free-standing structure of the household, with at least one floor
/// on every creation path.
#[derive(Debug, Clone)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub floors: Vec<Floor>,
}

impl Building {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BuildingId::new(),
            name: name.into(),
            floors: vec![Floor::ground()],
        }
    }

    /// Append a floor named after the current count ("Tầng trệt" is floor
    /// zero, so the next one is "Tầng 1") and return its id.
    pub fn add_floor(&mut self) -> FloorId {
        let floor = Floor::new(format!("Tầng {}", self.floors.len()));
        let id = floor.id;
        self.floors.push(floor);
        id
    }

    pub fn remove_floor(&mut self, id: FloorId) {
        self.floors.retain(|f| f.id != id);
    }

    pub fn floor(&self, id: FloorId) -> Option<&Floor> {
        self.floors.iter().find(|f| f.id == id)
    }

    pub fn floor_mut(&mut self, id: FloorId) -> Option<&mut Floor> {
        self.floors.iter_mut().find(|f| f.id == id)
    }
}

/// Contact details of the person filing the report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReporterInfo {
    pub full_name: String,
    pub phone: String,
    pub relationship: String,
    pub id_number: String,
    pub email: String,
}

/// Reporter form fields addressable from UI messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterField {
    FullName,
    Phone,
    Relationship,
    IdNumber,
    Email,
}

impl ReporterInfo {
    pub fn set(&mut self, field: ReporterField, value: String) {
        match field {
            ReporterField::FullName => self.full_name = value,
            ReporterField::Phone => self.phone = value,
            ReporterField::Relationship => self.relationship = value,
            ReporterField::IdNumber => self.id_number = value,
            ReporterField::Email => self.email = value,
        }
    }

    pub fn get(&self, field: ReporterField) -> &str {
        match field {
            ReporterField::FullName => &self.full_name,
            ReporterField::Phone => &self.phone,
            ReporterField::Relationship => &self.relationship,
            ReporterField::IdNumber => &self.id_number,
            ReporterField::Email => &self.email,
        }
    }
}

/// Headcounts used by responders to prioritize rescue. Unsigned, and
/// decrements saturate at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResidentCounts {
    pub elderly: u32,
    pub children: u32,
    pub mobility_impaired: u32,
    pub adults: u32,
}

/// Resident count fields addressable from UI messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidentField {
    Elderly,
    Children,
    MobilityImpaired,
    Adults,
}

impl ResidentCounts {
    pub fn get(&self, field: ResidentField) -> u32 {
        match field {
            ResidentField::Elderly => self.elderly,
            ResidentField::Children => self.children,
            ResidentField::MobilityImpaired => self.mobility_impaired,
            ResidentField::Adults => self.adults,
        }
    }

    pub fn increment(&mut self, field: ResidentField) {
        let slot = self.slot(field);
        *slot = slot.saturating_add(1);
    }

    pub fn decrement(&mut self, field: ResidentField) {
        let slot = self.slot(field);
        *slot = slot.saturating_sub(1);
    }

    fn slot(&mut self, field: ResidentField) -> &mut u32 {
        match field {
            ResidentField::Elderly => &mut self.elderly,
            ResidentField::Children => &mut self.children,
            ResidentField::MobilityImpaired => &mut self.mobility_impaired,
            ResidentField::Adults => &mut self.adults,
        }
    }
}

/// Reasons a submission is refused. Surfaced as user-facing text; the form
/// state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Vui lòng nhập đầy đủ Họ tên và Số điện thoại.")]
    MissingReporter,
    #[error("Vui lòng xác định vị trí tọa độ GPS.")]
    MissingCoordinates,
}

/// The aggregate root owning everything the report will carry.
#[derive(Debug, Clone)]
pub struct HouseholdInfo {
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub buildings: Vec<Building>,
    pub reporter: ReporterInfo,
    pub residents: ResidentCounts,
    pub fire_equipment: String,
    pub hazards: String,
    pub assembly_point: String,
}

impl HouseholdInfo {
    /// Fresh report: one main building with a single ground floor.
    pub fn new() -> Self {
        Self {
            address: String::new(),
            coordinates: None,
            buildings: vec![Building::new("Khối nhà chính")],
            reporter: ReporterInfo::default(),
            residents: ResidentCounts::default(),
            fire_equipment: String::new(),
            hazards: String::new(),
            assembly_point: String::new(),
        }
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.iter_mut().find(|b| b.id == id)
    }

    pub fn floor(&self, path: FloorPath) -> Option<&Floor> {
        self.building(path.building)?.floor(path.floor)
    }

    pub fn floor_mut(&mut self, path: FloorPath) -> Option<&mut Floor> {
        self.building_mut(path.building)?.floor_mut(path.floor)
    }

    /// Append a building named after the new count and return its name.
    pub fn add_building(&mut self) -> String {
        let name = format!("Khối nhà {}", self.buildings.len() + 1);
        self.buildings.push(Building::new(name.clone()));
        name
    }

    /// Remove a building and everything under it. Refused while it is the
    /// only one left; the report must always keep at least one building.
    pub fn remove_building(&mut self, id: BuildingId) -> bool {
        if self.buildings.len() <= 1 {
            return false;
        }
        let before = self.buildings.len();
        self.buildings.retain(|b| b.id != id);
        self.buildings.len() != before
    }

    /// Replace the whole building list with `count` fresh buildings, each
    /// with one ground floor. The first keeps the main-building name.
    /// Refused for a zero count.
    pub fn quick_setup(&mut self, count: usize) -> bool {
        if count < 1 {
            return false;
        }
        self.buildings = (0..count)
            .map(|i| {
                if i == 0 {
                    Building::new("Khối nhà chính")
                } else {
                    Building::new(format!("Khối nhà {}", i + 1))
                }
            })
            .collect();
        true
    }

    /// Gate for the final submit button: reporter name + phone and a GPS
    /// fix are mandatory.
    pub fn validate_submission(&self) -> Result<(), SubmitError> {
        if self.reporter.full_name.trim().is_empty() || self.reporter.phone.trim().is_empty() {
            return Err(SubmitError::MissingReporter);
        }
        if self.coordinates.is_none() {
            return Err(SubmitError::MissingCoordinates);
        }
        Ok(())
    }
}

impl Default for HouseholdInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::image::test_image;
    use crate::state::marker::{MarkerKind, Position};

    #[test]
    fn new_household_has_main_building_and_ground_floor() {
        let info = HouseholdInfo::new();
        assert_eq!(info.buildings.len(), 1);
        assert_eq!(info.buildings[0].name, "Khối nhà chính");
        assert_eq!(info.buildings[0].floors.len(), 1);
        assert_eq!(info.buildings[0].floors[0].name, "Tầng trệt");
    }

    #[test]
    fn added_floors_are_numbered_from_current_count() {
        let mut building = Building::new("Khối nhà chính");
        building.add_floor();
        building.add_floor();
        let names: Vec<&str> = building.floors.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Tầng trệt", "Tầng 1", "Tầng 2"]);
    }

    #[test]
    fn sole_building_cannot_be_removed() {
        let mut info = HouseholdInfo::new();
        let id = info.buildings[0].id;
        assert!(!info.remove_building(id));
        assert_eq!(info.buildings.len(), 1);

        info.add_building();
        assert!(info.remove_building(id));
        assert_eq!(info.buildings.len(), 1);
    }

    #[test]
    fn removal_cascades_through_the_tree() {
        let mut info = HouseholdInfo::new();
        let building_id = info.buildings[0].id;
        let floor_id = info.buildings[0].floors[0].id;
        let path = FloorPath {
            building: building_id,
            floor: floor_id,
        };

        let floor = info.floor_mut(path).unwrap();
        floor.gallery.append(test_image());
        floor
            .gallery
            .active_mut()
            .unwrap()
            .place(Position::new(50.0, 50.0), MarkerKind::ElderlyOccupant);

        // Floor removal takes its images and markers with it.
        info.building_mut(building_id).unwrap().remove_floor(floor_id);
        assert!(info.floor(path).is_none());

        // Building removal takes its floors with it.
        info.add_building();
        let second = info.buildings[1].id;
        info.building_mut(second).unwrap().add_floor();
        assert!(info.remove_building(second));
        assert!(info.building(second).is_none());
    }

    #[test]
    fn quick_setup_replaces_buildings() {
        let mut info = HouseholdInfo::new();
        assert!(info.quick_setup(3));
        assert_eq!(info.buildings.len(), 3);
        assert_eq!(info.buildings[0].name, "Khối nhà chính");
        assert_eq!(info.buildings[1].name, "Khối nhà 2");
        assert_eq!(info.buildings[2].name, "Khối nhà 3");
        for building in &info.buildings {
            assert_eq!(building.floors.len(), 1);
        }

        assert!(!info.quick_setup(0));
        assert_eq!(info.buildings.len(), 3);
    }

    #[test]
    fn resident_decrement_saturates_at_zero() {
        let mut counts = ResidentCounts::default();
        counts.decrement(ResidentField::Elderly);
        assert_eq!(counts.elderly, 0);

        counts.increment(ResidentField::Children);
        counts.increment(ResidentField::Children);
        counts.decrement(ResidentField::Children);
        assert_eq!(counts.children, 1);
    }

    #[test]
    fn submission_requires_reporter_and_coordinates() {
        let mut info = HouseholdInfo::new();
        assert_eq!(info.validate_submission(), Err(SubmitError::MissingReporter));

        info.reporter.full_name = "Nguyễn Văn A".to_string();
        info.reporter.phone = "0901234567".to_string();
        assert_eq!(
            info.validate_submission(),
            Err(SubmitError::MissingCoordinates)
        );

        info.coordinates = Some(Coordinates {
            latitude: 10.7769,
            longitude: 106.7009,
        });
        assert_eq!(info.validate_submission(), Ok(()));
    }
}
