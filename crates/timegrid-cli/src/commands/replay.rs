//! Replays a JSON placement script against a fresh timeline.
//!
//! ```json
//! {
//!   "mode": "month",
//!   "ops": [
//!     { "op": "place", "row": 0, "col": 0, "rowspan": 1, "colspan": 2 },
//!     { "op": "select", "from": [1, 0], "to": [1, 3] },
//!     { "op": "drag", "item": 0, "dx": 100.0, "dy": 50.0 },
//!     { "op": "view_mode", "mode": "week" }
//!   ]
//! }
//! ```
//!
//! Items are referred to by creation order. Every published event is printed
//! as one JSON line; rejected operations show up as `placement_rejected`
//! events and do not stop the replay.

use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;
use std::path::PathBuf;
use timegrid_core::{
    GridCoord, ItemPosition, Rectangle, TimelineCoordinator, TimelineEvent, ViewMode,
};
use uuid::Uuid;

use super::{load_settings, today_or_now};

#[derive(Args)]
pub struct ReplayArgs {
    /// Path to the script
    pub script: PathBuf,
    /// Date the calendar is generated around (YYYY-MM-DD, defaults to the
    /// script's `today`, then to the current date)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    today: Option<NaiveDate>,
    #[serde(default)]
    mode: Option<ViewMode>,
    ops: Vec<Op>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Op {
    ViewMode {
        mode: ViewMode,
    },
    Place {
        row: i32,
        col: i32,
        rowspan: i32,
        colspan: i32,
    },
    /// Pointer down on `from`, move to `to`, release.
    Select {
        from: (i32, i32),
        to: (i32, i32),
    },
    Move {
        item: usize,
        row: i32,
        col: i32,
    },
    Resize {
        item: usize,
        rowspan: i32,
        colspan: i32,
    },
    /// Resize from a page rectangle as a resize handle reports it.
    ResizeRect {
        item: usize,
        rect: Rectangle,
    },
    Drag {
        item: usize,
        dx: f64,
        dy: f64,
    },
    Remove {
        item: usize,
    },
}

fn item_id(created: &[Uuid], index: usize) -> Result<Uuid, String> {
    created
        .get(index)
        .copied()
        .ok_or_else(|| format!("script refers to item {index}, but only {} were created", created.len()))
}

pub fn run(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(&args.script)?;
    let script: Script = serde_json::from_str(&content)?;

    let mut settings = load_settings(None, None)?;
    if let Some(mode) = script.mode {
        settings.initial_mode = mode;
    }
    let today = today_or_now(args.today.or(script.today));
    let mut coordinator = TimelineCoordinator::new(settings, today)?;
    let events = coordinator.subscribe();
    let mut created: Vec<Uuid> = Vec::new();

    for (step, op) in script.ops.into_iter().enumerate() {
        tracing::debug!(step, ?op, "replaying");
        // Rejections are published as events; the Err values carry nothing new.
        match op {
            Op::ViewMode { mode } => {
                coordinator.on_view_mode_changed(mode);
            }
            Op::Place {
                row,
                col,
                rowspan,
                colspan,
            } => {
                let _ = coordinator.place_item(ItemPosition::new(row, col, rowspan, colspan));
            }
            Op::Select { from, to } => {
                if coordinator.begin_selection(GridCoord::new(from.0, from.1)) {
                    coordinator.update_selection(GridCoord::new(to.0, to.1));
                    coordinator.commit_or_cancel_selection();
                }
            }
            Op::Move { item, row, col } => {
                let id = item_id(&created, item)?;
                if let Some(current) = coordinator.item(id).map(|i| i.position) {
                    let _ = coordinator.move_item(id, current.at(GridCoord::new(row, col)));
                }
            }
            Op::Resize {
                item,
                rowspan,
                colspan,
            } => {
                let id = item_id(&created, item)?;
                if let Some(current) = coordinator.item(id).map(|i| i.position) {
                    let target =
                        ItemPosition::new(current.coord.row, current.coord.col, rowspan, colspan);
                    let _ = coordinator.resize_item(id, target);
                }
            }
            Op::ResizeRect { item, rect } => {
                let id = item_id(&created, item)?;
                let _ = coordinator.resize_item_to_rect(id, &rect);
            }
            Op::Drag { item, dx, dy } => {
                let id = item_id(&created, item)?;
                let _ = coordinator.drag_item_by(id, dx, dy);
            }
            Op::Remove { item } => {
                let id = item_id(&created, item)?;
                let _ = coordinator.remove_item(id);
            }
        }

        for event in events.drain() {
            if let TimelineEvent::ItemCreated { id, .. } = &event {
                created.push(*id);
            }
            println!("{}", serde_json::to_string(&event)?);
        }
    }
    Ok(())
}
