//! Grid occupancy and item placement.
//!
//! This module provides:
//! - Cell coordinates, item rectangles and pixel/grid conversion
//! - The occupancy engine that validates and applies item mutations
//! - The pointer-driven selection state machine for creating items

mod engine;
mod geometry;
mod selection;

pub use engine::{GridEngine, GridItem, GridSpace, ItemLimits};
pub use geometry::{
    item_position_to_style, pixel_to_item_position, GridCoord, GridDimensions, ItemPosition,
    ItemSize, ItemStyle, Rectangle,
};
pub use selection::{Selection, SelectionOutcome, SelectionState};

use crate::calendar::ViewMode;

/// Whether grid column `col` falls in an odd main column of `mode`.
///
/// Uses the same floor division as calendar main-column bucketing so bands
/// line up with header periods.
pub fn is_alternate_band(col: i32, mode: ViewMode) -> bool {
    let per_main = mode.sub_columns_per_main() as i32;
    col.div_euclid(per_main).rem_euclid(2) == 1
}
