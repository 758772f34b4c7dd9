//! Per-player records that are not placed on the grid.

use chrono::Utc;
use holdfast_types::{Comparison, InstanceId, Persistent, StructuralEq, compare_identity};
use serde::{Deserialize, Serialize};

// ── Player ───────────────────────────────────────────────────────

/// The player's profile. Stored once per player under the singleton id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub instance_id: InstanceId,
    pub money: f64,
    pub aggregate_money: f64,
    pub gems: i32,
    pub aggregate_gems: i32,
    pub level: i32,
    pub xp: f64,
    pub device_id: Option<String>,
    pub user_id: Option<String>,
    /// Unix milliseconds of the last local save.
    pub save_time: i64,
    pub first_time_launch: bool,
    pub unlocked_expansions: Vec<String>,
    pub client_version: String,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            instance_id: InstanceId::singleton(),
            money: 800.0,
            aggregate_money: 0.0,
            gems: 1,
            aggregate_gems: 1,
            level: 1,
            xp: 0.0,
            device_id: None,
            user_id: None,
            save_time: 0,
            first_time_launch: true,
            unlocked_expansions: Vec::new(),
            client_version: "0.0.0".to_string(),
        }
    }
}

impl StructuralEq for Player {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        compare_identity(self, other, cmp);
        cmp.field("money", &self.money, &other.money)
            .field("gems", &self.gems, &other.gems)
            .field("level", &self.level, &other.level)
            .field("xp", &self.xp, &other.xp)
            .values(
                "unlocked_expansions",
                &self.unlocked_expansions,
                &other.unlocked_expansions,
            );
    }
}

impl Persistent for Player {
    const COLLECTION: &'static str = "Player";

    fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn set_instance_id(&mut self, id: InstanceId) {
        self.instance_id = id;
    }

    fn prepare_for_save(&mut self) {
        self.save_time = Utc::now().timestamp_millis();
    }
}

// ── Craft ────────────────────────────────────────────────────────

/// One queued or running crafting job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Craft {
    pub instance_id: InstanceId,
    pub item_id: String,
    pub date_time_begun: i64,
    pub date_time_queued: i64,
    pub is_complete: bool,
}

impl Craft {
    pub fn new(item_id: impl Into<String>, date_time_begun: i64, date_time_queued: i64) -> Self {
        Self {
            item_id: item_id.into(),
            date_time_begun,
            date_time_queued,
            ..Self::default()
        }
    }
}

/// Every craft gets its own generated id.
impl Default for Craft {
    fn default() -> Self {
        Self {
            instance_id: InstanceId::generate(),
            item_id: String::new(),
            date_time_begun: 0,
            date_time_queued: 0,
            is_complete: false,
        }
    }
}

impl StructuralEq for Craft {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        compare_identity(self, other, cmp);
        cmp.field("item_id", &self.item_id, &other.item_id)
            .field("date_time_begun", &self.date_time_begun, &other.date_time_begun)
            .field("date_time_queued", &self.date_time_queued, &other.date_time_queued)
            .field("is_complete", &self.is_complete, &other.is_complete);
    }
}

impl Persistent for Craft {
    const COLLECTION: &'static str = "Craft";

    fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn set_instance_id(&mut self, id: InstanceId) {
        self.instance_id = id;
    }
}

// ── TutorialData ─────────────────────────────────────────────────

/// Completion flag for one tutorial step, keyed `Tutorial_<step>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TutorialData {
    pub instance_id: InstanceId,
    pub tutorial_step: String,
    pub completed: bool,
}

impl TutorialData {
    pub fn create(step: &str, completed: bool) -> Self {
        Self {
            instance_id: Self::id_for(step),
            tutorial_step: step.to_string(),
            completed,
        }
    }

    /// The id a step's record is stored under.
    pub fn id_for(step: &str) -> InstanceId {
        InstanceId::new(format!("Tutorial_{step}"))
    }
}

impl StructuralEq for TutorialData {
    fn compare_fields(&self, other: &Self, cmp: &mut Comparison) {
        compare_identity(self, other, cmp);
        cmp.field("tutorial_step", &self.tutorial_step, &other.tutorial_step)
            .field("completed", &self.completed, &other.completed);
    }
}

impl Persistent for TutorialData {
    const COLLECTION: &'static str = "TutorialData";

    fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    fn set_instance_id(&mut self, id: InstanceId) {
        self.instance_id = id;
    }
}
