use crate::core::units::FloorArea;
use crate::errors::ValidationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// A council building that reports metered energy use.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub category: String,
    #[validate]
    pub floor_area: FloorArea,
    #[serde(default)]
    pub address: Option<String>,
}

/// Registry of reporting buildings, keyed by id and kept in registration order.
#[derive(Clone, Debug, Default)]
pub struct BuildingRegistry {
    buildings: IndexMap<String, Building>,
}

impl BuildingRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn register(&mut self, building: Building) -> Result<(), ValidationError> {
        if self.buildings.contains_key(&building.id) {
            return Err(ValidationError::DuplicateBuilding(building.id));
        }
        self.buildings.insert(building.id.clone(), building);

        Ok(())
    }

    pub fn building(&self, id: &str) -> Result<&Building, ValidationError> {
        self.buildings
            .get(id)
            .ok_or_else(|| ValidationError::UnknownBuilding(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}
