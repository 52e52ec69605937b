use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::ViewMode;
use crate::grid::{GridDimensions, ItemPosition};

/// Every state change of the timeline produces an Event.
/// Consumers receive them through [`crate::coordinator::Subscription`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEvent {
    ViewModeChanged {
        mode: ViewMode,
        dimensions: GridDimensions,
    },
    /// Calendar windows were rebuilt around a new "today".
    CalendarRegenerated {
        today: NaiveDate,
    },
    ItemCreated {
        id: Uuid,
        position: ItemPosition,
    },
    ItemMoved {
        id: Uuid,
        from: ItemPosition,
        to: ItemPosition,
    },
    ItemResized {
        id: Uuid,
        from: ItemPosition,
        to: ItemPosition,
    },
    ItemRemoved {
        id: Uuid,
    },
    /// A mutation was refused; the grid is unchanged.
    PlacementRejected {
        id: Option<Uuid>,
        position: Option<ItemPosition>,
        reason: String,
    },
}

impl TimelineEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ViewModeChanged { .. } => "view_mode_changed",
            Self::CalendarRegenerated { .. } => "calendar_regenerated",
            Self::ItemCreated { .. } => "item_created",
            Self::ItemMoved { .. } => "item_moved",
            Self::ItemResized { .. } => "item_resized",
            Self::ItemRemoved { .. } => "item_removed",
            Self::PlacementRejected { .. } => "placement_rejected",
        }
    }
}
