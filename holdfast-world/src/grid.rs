//! Grid coordinates and placeable tool kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer cell position on the world grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const DOWN: GridPos = GridPos { x: 0, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// What kind of thing occupies a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolType {
    /// Never assigned.
    #[default]
    MissingTool,
    Grass,
    Soil,
    Water,
    Path,
    Planter,
    Cottage,
    Manor,
    Harvester0,
    Harvester1,
    Harvester2,
    Harvester3,
    Harvester4,
    Harvester5,
    Harvester6,
    Harvester7,
    Harvester8,
    Totem,
    Decor,
    PointOfInterest,
    CommonChest,
}

impl ToolType {
    /// The harvester kind for a variant index, if one exists.
    pub fn harvester(variant_index: i32) -> Option<ToolType> {
        Some(match variant_index {
            0 => ToolType::Harvester0,
            1 => ToolType::Harvester1,
            2 => ToolType::Harvester2,
            3 => ToolType::Harvester3,
            4 => ToolType::Harvester4,
            5 => ToolType::Harvester5,
            6 => ToolType::Harvester6,
            7 => ToolType::Harvester7,
            8 => ToolType::Harvester8,
            _ => return None,
        })
    }

    pub fn is_missing(self) -> bool {
        self == ToolType::MissingTool
    }
}
