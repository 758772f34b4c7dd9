//! Shared fields of every record that sits on the grid.

use crate::grid::{GridPos, ToolType};
use holdfast_types::{Comparison, InstanceId};
use serde::{Deserialize, Serialize};

/// Island index of a record that has not been assigned to an island.
pub const NO_ISLAND: i32 = -1;

fn no_island() -> i32 {
    NO_ISLAND
}

/// Identity, position and kind of a placed record.
///
/// Embedded (flattened) in each positioned record so the stored JSON keeps
/// these fields at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub instance_id: InstanceId,
    pub position: GridPos,
    #[serde(default = "no_island")]
    pub island_index: i32,
    #[serde(default)]
    pub tool_type: ToolType,
}

impl Placement {
    /// A fresh placement with a generated id, not yet on any island.
    pub fn new(position: impl Into<GridPos>, tool_type: ToolType) -> Self {
        Self {
            instance_id: InstanceId::generate(),
            position: position.into(),
            island_index: NO_ISLAND,
            tool_type,
        }
    }

    /// Places the record on an island.
    pub fn on_island(mut self, island_index: i32) -> Self {
        self.island_index = island_index;
        self
    }

    /// Returns true once the record belongs to an unlocked island.
    pub fn is_on_island(&self) -> bool {
        self.island_index >= 0
    }

    /// Compares identity, position and kind. The island index is bookkeeping
    /// and does not take part in equality.
    pub fn compare(&self, other: &Self, cmp: &mut Comparison) {
        cmp.field("instance_id", &self.instance_id, &other.instance_id)
            .field("position", &self.position, &other.position)
            .field("tool_type", &self.tool_type, &other.tool_type);
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            instance_id: InstanceId::default(),
            position: GridPos::default(),
            island_index: NO_ISLAND,
            tool_type: ToolType::MissingTool,
        }
    }
}

/// Access to the placement of a grid record.
pub trait Positioned {
    fn placement(&self) -> &Placement;

    fn placement_mut(&mut self) -> &mut Placement;

    fn position(&self) -> GridPos {
        self.placement().position
    }

    fn set_position(&mut self, position: GridPos) {
        self.placement_mut().position = position;
    }

    fn tool_type(&self) -> ToolType {
        self.placement().tool_type
    }
}

/// Implements [`Positioned`] and [`holdfast_types::Persistent`] for a record
/// with a `placement` field.
///
/// Positioned records only reach the remote store once they sit on an
/// island; until then they are saved locally only.
macro_rules! positioned_record {
    ($ty:ty, $collection:literal) => {
        impl $crate::placement::Positioned for $ty {
            fn placement(&self) -> &$crate::placement::Placement {
                &self.placement
            }

            fn placement_mut(&mut self) -> &mut $crate::placement::Placement {
                &mut self.placement
            }
        }

        impl holdfast_types::Persistent for $ty {
            const COLLECTION: &'static str = $collection;

            fn instance_id(&self) -> &holdfast_types::InstanceId {
                &self.placement.instance_id
            }

            fn set_instance_id(&mut self, id: holdfast_types::InstanceId) {
                self.placement.instance_id = id;
            }

            fn should_sync_remote(&self) -> bool {
                self.placement.is_on_island()
            }
        }
    };
}

pub(crate) use positioned_record;
