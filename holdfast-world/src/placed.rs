//! Records placed on the world grid.

use crate::grid::{GridPos, ToolType};
use crate::placement::{Placement, Positioned, positioned_record};
use holdfast_types::{Comparison, StructuralEq};
use serde::{Deserialize, Serialize};
use tracing::error;

// ── Tile ─────────────────────────────────────────────────────────

/// A ground cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(flatten)]
    pub placement: Placement,
}

impl Tile {
    pub fn new(x: i32, y: i32, tool_type: ToolType) -> Self {
        Self {
            placement: Placement::new((x, y), tool_type),
        }
    }
}

impl StructuralEq for Tile {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        self.placement.compare(&other.placement, cmp);
    }
}

positioned_record!(Tile, "Tile");

// ── Planter ──────────────────────────────────────────────────────

/// Growth state of whatever is planted in a [`Planter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub plant_name: String,
    #[serde(default)]
    pub millis_grown: i64,
    #[serde(default)]
    pub millis_overgrown: i64,
    #[serde(default)]
    pub last_save_time: i64,
    #[serde(default = "first_level")]
    pub level: i32,
}

fn first_level() -> i32 {
    1
}

impl Plant {
    pub fn new(plant_name: impl Into<String>) -> Self {
        Self {
            plant_name: plant_name.into(),
            millis_grown: 0,
            millis_overgrown: 0,
            last_save_time: 0,
            level: first_level(),
        }
    }
}

/// Only the species matters; growth timers tick constantly.
impl StructuralEq for Plant {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        cmp.field("plant_name", &self.plant_name, &other.plant_name);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Planter {
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(default)]
    pub plant: Option<Plant>,
}

impl Planter {
    pub fn new(x: i32, y: i32, tool_type: ToolType) -> Self {
        Self {
            placement: Placement::new((x, y), tool_type),
            plant: None,
        }
    }
}

impl StructuralEq for Planter {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        self.placement.compare(&other.placement, cmp);
        cmp.optional_record("plant", self.plant.as_ref(), other.plant.as_ref());
    }
}

positioned_record!(Planter, "Planter");

// ── Harvester ────────────────────────────────────────────────────

/// A worker assigned to a [`House`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harvester {
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(default = "facing_down")]
    pub direction: GridPos,
    #[serde(default)]
    pub variant_index: i32,
    #[serde(default = "default_harvester_name")]
    pub name: String,
}

fn facing_down() -> GridPos {
    GridPos::DOWN
}

fn default_harvester_name() -> String {
    "Gardener".to_string()
}

impl Harvester {
    pub fn new(position: GridPos, direction: GridPos, variant_index: i32) -> Self {
        let tool_type = ToolType::harvester(variant_index).unwrap_or_default();
        Self {
            placement: Placement::new(position, tool_type),
            direction,
            variant_index,
            name: default_harvester_name(),
        }
    }

    /// The harvester's kind, derived from its variant when never assigned.
    pub fn resolved_tool_type(&self) -> ToolType {
        if !self.placement.tool_type.is_missing() {
            return self.placement.tool_type;
        }
        match ToolType::harvester(self.variant_index) {
            Some(tool_type) => tool_type,
            None => {
                error!(variant = self.variant_index, "harvester variant not found");
                ToolType::MissingTool
            }
        }
    }
}

/// Harvesters are created with a fresh id, even when built from defaults.
impl Default for Harvester {
    fn default() -> Self {
        Self {
            placement: Placement::new(GridPos::default(), ToolType::MissingTool),
            direction: facing_down(),
            variant_index: 0,
            name: default_harvester_name(),
        }
    }
}

impl StructuralEq for Harvester {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        self.placement.compare(&other.placement, cmp);
        cmp.field("variant_index", &self.variant_index, &other.variant_index)
            .field("direction", &self.direction, &other.direction)
            .field("name", &self.name, &other.name);
    }
}

positioned_record!(Harvester, "Harvester");

// ── House ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct House {
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(default)]
    pub rotations: i32,
    #[serde(default)]
    pub harvesters: Vec<Harvester>,
}

impl House {
    pub fn new(x: i32, y: i32, tool_type: ToolType, rotations: i32) -> Self {
        Self {
            placement: Placement::new((x, y), tool_type),
            rotations,
            harvesters: Vec::new(),
        }
    }

    /// Footprint edge length in cells.
    pub fn size(&self) -> i32 {
        match self.tool_type() {
            ToolType::Manor => 3,
            _ => 2,
        }
    }
}

impl StructuralEq for House {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        self.placement.compare(&other.placement, cmp);
        cmp.field("rotations", &self.rotations, &other.rotations)
            .sequence("harvesters", &self.harvesters, &other.harvesters);
    }
}

positioned_record!(House, "House");

// ── Misc ─────────────────────────────────────────────────────────

/// Anything else on the grid, with the cells it affects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Misc {
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub area_of_effect: Vec<GridPos>,
}

impl Misc {
    pub fn new(
        x: i32,
        y: i32,
        tool_type: ToolType,
        description: impl Into<String>,
        area_of_effect: Vec<GridPos>,
    ) -> Self {
        Self {
            placement: Placement::new((x, y), tool_type),
            description: description.into(),
            area_of_effect,
        }
    }
}

impl StructuralEq for Misc {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        self.placement.compare(&other.placement, cmp);
        cmp.field("description", &self.description, &other.description)
            .values("area_of_effect", &self.area_of_effect, &other.area_of_effect);
    }
}

positioned_record!(Misc, "Misc");
