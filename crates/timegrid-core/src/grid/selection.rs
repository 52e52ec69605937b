//! Pointer-driven placement of new items.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Selecting -> (Committed | Cancelled)
//! ```
//!
//! Pointer-down on a free cell starts a selection anchored on that cell.
//! Pointer moves stretch a preview rectangle between the anchor and the
//! hovered cell, clamped to the item span limits. Pointer-up commits the
//! preview through [`GridEngine::add_item`]; a preview that never grew past
//! one cell is replaced by the default item size first. Only one selection
//! can be in flight.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::engine::{GridEngine, ItemLimits};
use super::geometry::{GridCoord, ItemPosition, ItemSize};
use crate::error::PlacementError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionState {
    Idle,
    Selecting,
    Committed,
    Cancelled,
}

/// How a selection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Committed { id: Uuid, position: ItemPosition },
    /// `reason` is `None` when the selection was aborted by the caller.
    Cancelled { reason: Option<PlacementError> },
}

#[derive(Debug, Clone)]
pub struct Selection {
    state: SelectionState,
    anchor: Option<GridCoord>,
    preview: Option<ItemPosition>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Idle,
            anchor: None,
            preview: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SelectionState::Selecting
    }

    pub fn anchor(&self) -> Option<GridCoord> {
        self.anchor
    }

    /// Rectangle that would be committed on release.
    pub fn preview(&self) -> Option<&ItemPosition> {
        self.preview.as_ref()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start selecting at `cell`. Returns `false` (and changes nothing) when
    /// a selection is already in flight or the cell is occupied or off-grid.
    pub fn begin(&mut self, cell: GridCoord, engine: &GridEngine) -> bool {
        match self.state {
            SelectionState::Selecting => false,
            SelectionState::Idle | SelectionState::Committed | SelectionState::Cancelled => {
                if !engine.dimensions().contains(cell) || engine.is_occupied(cell) {
                    return false;
                }
                self.state = SelectionState::Selecting;
                self.anchor = Some(cell);
                self.preview = Some(ItemPosition {
                    coord: cell,
                    size: ItemSize::new(1, 1),
                });
                true
            }
        }
    }

    /// Stretch the preview to the bounding box of the anchor and `cell`.
    pub fn update(&mut self, cell: GridCoord, limits: &ItemLimits) -> Option<&ItemPosition> {
        if self.state != SelectionState::Selecting {
            return None;
        }
        let anchor = self.anchor?;
        let size = ItemSize {
            rowspan: cells_between(anchor.row, cell.row),
            colspan: cells_between(anchor.col, cell.col),
        };
        self.preview = Some(ItemPosition {
            coord: GridCoord {
                row: anchor.row.min(cell.row),
                col: anchor.col.min(cell.col),
            },
            size: limits.clamp(size),
        });
        self.preview.as_ref()
    }

    /// Release: try to place the preview. `None` if nothing was in flight.
    pub fn commit(&mut self, engine: &mut GridEngine) -> Option<SelectionOutcome> {
        if self.state != SelectionState::Selecting {
            return None;
        }
        let mut position = self.preview.take()?;
        self.anchor = None;

        if position.size.is_single_cell() {
            position.size = engine.limits().default_size;
        }

        match engine.add_item(position) {
            Ok(id) => {
                self.state = SelectionState::Committed;
                Some(SelectionOutcome::Committed { id, position })
            }
            Err(reason) => {
                self.state = SelectionState::Cancelled;
                Some(SelectionOutcome::Cancelled {
                    reason: Some(reason),
                })
            }
        }
    }

    /// Abort an in-flight selection without touching the grid.
    pub fn cancel(&mut self) -> Option<SelectionOutcome> {
        if self.state != SelectionState::Selecting {
            return None;
        }
        self.state = SelectionState::Cancelled;
        self.anchor = None;
        self.preview = None;
        Some(SelectionOutcome::Cancelled { reason: None })
    }
}

/// Inclusive cell count from `a` to `b`, saturating at `i32::MAX`.
fn cells_between(a: i32, b: i32) -> i32 {
    i32::try_from(a.abs_diff(b))
        .unwrap_or(i32::MAX)
        .saturating_add(1)
}
