//! Reference world schema for holdfast.
//!
//! A small farming-world model that exercises every persistence feature:
//! positioned grid records with nested sub-records and ordered children,
//! a singleton profile stamped on save, records with generated ids, and
//! records keyed by a derived id.

mod grid;
mod placed;
mod placement;
mod profile;

pub use grid::{GridPos, ToolType};
pub use placed::{Harvester, House, Misc, Plant, Planter, Tile};
pub use placement::{NO_ISLAND, Placement, Positioned};
pub use profile::{Craft, Player, TutorialData};
