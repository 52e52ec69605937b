//! Grid occupancy engine.
//!
//! Owns the cell matrix and the placed items. Every mutation is validated
//! first and applied only when it passes, then occupancy and item styles are
//! recomputed from scratch. Callers never observe a half-applied change.
//!
//! ## Invariants
//!
//! - no two items cover the same cell
//! - every item accepted by a mutation lies inside `[0, rows) x [0, cols)`
//!
//! Items whose position became invalid through [`GridEngine::init_grid`]
//! (e.g. after a view mode shrank the column count) are kept as they are.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::geometry::{
    item_position_to_style, GridCoord, GridDimensions, ItemPosition, ItemSize, ItemStyle,
};
use crate::error::PlacementError;

/// Size and count limits for placed items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLimits {
    pub max_count: usize,
    pub min_rows: i32,
    pub max_rows: i32,
    pub min_cols: i32,
    pub max_cols: i32,
    /// Size used when an interactive selection ends on a single cell.
    pub default_size: ItemSize,
}

impl Default for ItemLimits {
    fn default() -> Self {
        Self {
            max_count: 10,
            min_rows: 1,
            max_rows: 1,
            min_cols: 1,
            max_cols: 100,
            default_size: ItemSize::new(1, 4),
        }
    }
}

impl ItemLimits {
    pub fn allows(&self, size: &ItemSize) -> bool {
        size.rowspan >= self.min_rows
            && size.rowspan <= self.max_rows
            && size.colspan >= self.min_cols
            && size.colspan <= self.max_cols
    }

    /// Clamp both spans into the configured range.
    pub fn clamp(&self, size: ItemSize) -> ItemSize {
        ItemSize {
            rowspan: size.rowspan.clamp(self.min_rows, self.max_rows),
            colspan: size.colspan.clamp(self.min_cols, self.max_cols),
        }
    }
}

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpace {
    pub id: String,
    pub coord: GridCoord,
    pub occupied: bool,
}

/// A placed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridItem {
    pub id: Uuid,
    pub position: ItemPosition,
    style: ItemStyle,
    #[serde(default)]
    pub content: Option<String>,
}

impl GridItem {
    /// Pixel style derived from `position` and the current grid dimensions.
    pub fn style(&self) -> &ItemStyle {
        &self.style
    }
}

#[derive(Debug, Clone)]
pub struct GridEngine {
    dimensions: GridDimensions,
    limits: ItemLimits,
    /// Row-major: `spaces[row][col]`.
    spaces: Vec<Vec<GridSpace>>,
    items: Vec<GridItem>,
}

impl GridEngine {
    pub fn new(dimensions: GridDimensions, limits: ItemLimits) -> Self {
        let mut engine = Self {
            dimensions,
            limits,
            spaces: Vec::new(),
            items: Vec::new(),
        };
        engine.init_grid(dimensions);
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn dimensions(&self) -> &GridDimensions {
        &self.dimensions
    }

    pub fn limits(&self) -> &ItemLimits {
        &self.limits
    }

    pub fn spaces(&self) -> &[Vec<GridSpace>] {
        &self.spaces
    }

    pub fn space(&self, coord: GridCoord) -> Option<&GridSpace> {
        if coord.row < 0 || coord.col < 0 {
            return None;
        }
        self.spaces
            .get(coord.row as usize)?
            .get(coord.col as usize)
    }

    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.space(coord).is_some_and(|s| s.occupied)
    }

    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    pub fn item(&self, id: Uuid) -> Option<&GridItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.limits.max_count
    }

    /// Cells covered by items, optionally ignoring one item.
    pub fn occupied_coords(&self, excluding: Option<Uuid>) -> HashSet<GridCoord> {
        self.items
            .iter()
            .filter(|item| Some(item.id) != excluding)
            .flat_map(|item| item.position.expand_to_coords())
            .collect()
    }

    /// First pair of items sharing a cell, if any.
    pub fn find_overlap(&self) -> Option<(Uuid, Uuid)> {
        for (i, a) in self.items.iter().enumerate() {
            for b in &self.items[i + 1..] {
                if a.position.intersects(&b.position) {
                    return Some((a.id, b.id));
                }
            }
        }
        None
    }

    // ── Grid state ───────────────────────────────────────────────────

    /// Rebuild the cell matrix for `dimensions`.
    ///
    /// Items keep their logical positions even if they no longer fit.
    pub fn init_grid(&mut self, dimensions: GridDimensions) {
        self.dimensions = dimensions;
        self.spaces = (0..dimensions.rows.max(0))
            .map(|row| {
                (0..dimensions.cols.max(0))
                    .map(|col| GridSpace {
                        id: format!("{row}_{col}_space"),
                        coord: GridCoord { row, col },
                        occupied: false,
                    })
                    .collect()
            })
            .collect();
        self.recompute_occupancy();
        self.restyle_items();
        tracing::debug!(
            rows = dimensions.rows,
            cols = dimensions.cols,
            col_width = dimensions.col_width,
            "grid rebuilt"
        );
    }

    /// Mark every covered cell occupied and every other cell free.
    pub fn recompute_occupancy(&mut self) {
        let covered = self.occupied_coords(None);
        for space in self.spaces.iter_mut().flatten() {
            space.occupied = covered.contains(&space.coord);
        }
    }

    /// Recompute every item's pixel style from its position.
    pub fn restyle_items(&mut self) {
        let dims = self.dimensions;
        for item in &mut self.items {
            item.style = item_position_to_style(&item.position, &dims);
        }
    }

    fn refresh(&mut self) {
        self.recompute_occupancy();
        self.restyle_items();
        debug_assert!(self.find_overlap().is_none(), "items overlap after mutation");
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Reject positions that leave the grid or cover another item's cells.
    ///
    /// `excluding` is the item being moved or resized; its own cells never
    /// block it.
    pub fn validate_drop(
        &self,
        position: &ItemPosition,
        excluding: Option<Uuid>,
    ) -> Result<(), PlacementError> {
        if !position.size.is_well_formed() {
            return Err(PlacementError::SpanOutOfRange {
                rowspan: position.size.rowspan,
                colspan: position.size.colspan,
            });
        }

        if let Some(outside) = self.first_cell_outside(position) {
            return Err(PlacementError::OutOfBounds {
                row: outside.row,
                col: outside.col,
            });
        }

        let coords = position.expand_to_coords();
        let occupied = self.occupied_coords(excluding);
        if let Some(taken) = coords.iter().find(|c| occupied.contains(c)) {
            return Err(PlacementError::Overlap {
                row: taken.row,
                col: taken.col,
            });
        }
        Ok(())
    }

    /// First covered cell (row-major) that lies off the grid, found from the
    /// rectangle's edges without expanding it.
    fn first_cell_outside(&self, position: &ItemPosition) -> Option<GridCoord> {
        let GridCoord { row, col } = position.coord;
        let dims = &self.dimensions;
        if row < 0 || col < 0 || row >= dims.rows || col >= dims.cols {
            return Some(position.coord);
        }
        if col.checked_add(position.size.colspan).map_or(true, |end| end > dims.cols) {
            return Some(GridCoord { row, col: dims.cols });
        }
        if row.checked_add(position.size.rowspan).map_or(true, |end| end > dims.rows) {
            return Some(GridCoord { row: dims.rows, col });
        }
        None
    }

    /// [`validate_drop`](Self::validate_drop) plus the configured span limits.
    pub fn validate_resize(
        &self,
        position: &ItemPosition,
        excluding: Option<Uuid>,
    ) -> Result<(), PlacementError> {
        if !self.limits.allows(&position.size) {
            return Err(PlacementError::SpanOutOfRange {
                rowspan: position.size.rowspan,
                colspan: position.size.colspan,
            });
        }
        self.validate_drop(position, excluding)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Place a new item. Refused when the grid is full or the drop is invalid.
    pub fn add_item(&mut self, position: ItemPosition) -> Result<Uuid, PlacementError> {
        if self.is_full() {
            tracing::warn!(max = self.limits.max_count, "item limit reached, placement refused");
            return Err(PlacementError::CapacityExceeded {
                max: self.limits.max_count,
            });
        }
        self.validate_drop(&position, None).inspect_err(|e| {
            tracing::warn!(?position, error = %e, "placement rejected");
        })?;

        let id = Uuid::new_v4();
        self.items.push(GridItem {
            id,
            position,
            style: item_position_to_style(&position, &self.dimensions),
            content: None,
        });
        self.refresh();
        tracing::info!(%id, ?position, "item placed");
        Ok(id)
    }

    /// Move an item to `position`. Its own cells do not block the move.
    pub fn move_item(&mut self, id: Uuid, position: ItemPosition) -> Result<(), PlacementError> {
        let index = self.index_of(id)?;
        self.validate_drop(&position, Some(id)).inspect_err(|e| {
            tracing::warn!(%id, ?position, error = %e, "move rejected");
        })?;
        self.items[index].position = position;
        self.refresh();
        tracing::info!(%id, ?position, "item moved");
        Ok(())
    }

    /// Resize (and possibly reposition) an item within the span limits.
    pub fn resize_item(&mut self, id: Uuid, position: ItemPosition) -> Result<(), PlacementError> {
        let index = self.index_of(id)?;
        self.validate_resize(&position, Some(id)).inspect_err(|e| {
            tracing::warn!(%id, ?position, error = %e, "resize rejected");
        })?;
        self.items[index].position = position;
        self.refresh();
        tracing::info!(%id, ?position, "item resized");
        Ok(())
    }

    pub fn remove_item(&mut self, id: Uuid) -> Result<GridItem, PlacementError> {
        let index = self.index_of(id)?;
        let removed = self.items.remove(index);
        self.refresh();
        tracing::info!(%id, "item removed");
        Ok(removed)
    }

    pub fn set_content(&mut self, id: Uuid, content: impl Into<String>) -> Result<(), PlacementError> {
        let index = self.index_of(id)?;
        self.items[index].content = Some(content.into());
        Ok(())
    }

    fn index_of(&self, id: Uuid) -> Result<usize, PlacementError> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or(PlacementError::UnknownItem(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(cols: i32) -> GridDimensions {
        GridDimensions {
            rows: 10,
            cols,
            row_height: 50.0,
            col_width: 40.0,
        }
    }

    fn engine() -> GridEngine {
        GridEngine::new(
            dims(35),
            ItemLimits {
                max_rows: 3,
                ..ItemLimits::default()
            },
        )
    }

    #[test]
    fn spaces_are_row_major_with_ids() {
        let engine = engine();
        assert_eq!(engine.spaces().len(), 10);
        assert_eq!(engine.spaces()[0].len(), 35);
        let space = engine.space(GridCoord::new(2, 5)).unwrap();
        assert_eq!(space.id, "2_5_space");
        assert_eq!(space.coord, GridCoord::new(2, 5));
        assert!(engine.space(GridCoord::new(10, 0)).is_none());
        assert!(engine.space(GridCoord::new(-1, 0)).is_none());
    }

    #[test]
    fn overlap_rejected_but_next_row_accepted() {
        let mut engine = engine();
        engine.add_item(ItemPosition::new(0, 0, 1, 2)).unwrap();

        let err = engine.add_item(ItemPosition::new(0, 1, 1, 1)).unwrap_err();
        assert_eq!(err, PlacementError::Overlap { row: 0, col: 1 });
        assert_eq!(engine.items().len(), 1);

        assert!(engine.add_item(ItemPosition::new(1, 0, 1, 1)).is_ok());
        assert_eq!(engine.items().len(), 2);
    }

    #[test]
    fn bounds_rejected() {
        let engine = engine();
        for position in [
            ItemPosition::new(-1, 0, 1, 1),
            ItemPosition::new(0, -1, 1, 1),
            ItemPosition::new(9, 0, 2, 1),
            ItemPosition::new(0, 33, 1, 3),
        ] {
            assert!(
                matches!(
                    engine.validate_drop(&position, None),
                    Err(PlacementError::OutOfBounds { .. })
                ),
                "{position:?}"
            );
        }
        assert!(engine.validate_drop(&ItemPosition::new(9, 32, 1, 3), None).is_ok());
    }

    #[test]
    fn occupancy_tracks_mutations() {
        let mut engine = engine();
        let id = engine.add_item(ItemPosition::new(0, 0, 1, 2)).unwrap();
        assert!(engine.is_occupied(GridCoord::new(0, 1)));

        engine.move_item(id, ItemPosition::new(3, 4, 1, 2)).unwrap();
        assert!(!engine.is_occupied(GridCoord::new(0, 0)));
        assert!(!engine.is_occupied(GridCoord::new(0, 1)));
        assert!(engine.is_occupied(GridCoord::new(3, 5)));

        engine.remove_item(id).unwrap();
        assert!(engine.spaces().iter().flatten().all(|s| !s.occupied));
    }

    #[test]
    fn move_ignores_own_cells() {
        let mut engine = engine();
        let id = engine.add_item(ItemPosition::new(0, 0, 1, 4)).unwrap();
        // Shift right by one, overlapping its previous cells
        engine.move_item(id, ItemPosition::new(0, 1, 1, 4)).unwrap();
        assert_eq!(engine.item(id).unwrap().position.coord, GridCoord::new(0, 1));
    }

    #[test]
    fn rejected_move_keeps_prior_state() {
        let mut engine = engine();
        let a = engine.add_item(ItemPosition::new(0, 0, 1, 2)).unwrap();
        engine.add_item(ItemPosition::new(0, 5, 1, 2)).unwrap();
        let before = engine.item(a).unwrap().clone();

        assert!(engine.move_item(a, ItemPosition::new(0, 4, 1, 2)).is_err());
        assert_eq!(engine.item(a).unwrap(), &before);
        assert!(engine.is_occupied(GridCoord::new(0, 0)));
    }

    #[test]
    fn resize_below_min_cols_rejected() {
        let mut engine = GridEngine::new(
            dims(35),
            ItemLimits {
                min_cols: 2,
                ..ItemLimits::default()
            },
        );
        let id = engine.add_item(ItemPosition::new(0, 0, 1, 4)).unwrap();
        assert_eq!(
            engine.resize_item(id, ItemPosition::new(0, 0, 1, 1)),
            Err(PlacementError::SpanOutOfRange {
                rowspan: 1,
                colspan: 1
            })
        );
        assert_eq!(engine.item(id).unwrap().position.size.colspan, 4);
        assert!(engine.resize_item(id, ItemPosition::new(0, 0, 1, 6)).is_ok());
    }

    #[test]
    fn capacity_exceeded() {
        let mut engine = GridEngine::new(
            dims(35),
            ItemLimits {
                max_count: 2,
                ..ItemLimits::default()
            },
        );
        engine.add_item(ItemPosition::new(0, 0, 1, 1)).unwrap();
        engine.add_item(ItemPosition::new(1, 0, 1, 1)).unwrap();
        assert_eq!(
            engine.add_item(ItemPosition::new(2, 0, 1, 1)),
            Err(PlacementError::CapacityExceeded { max: 2 })
        );
        assert!(engine.is_full());
    }

    #[test]
    fn malformed_span_rejected() {
        let engine = engine();
        assert!(matches!(
            engine.validate_drop(&ItemPosition::new(0, 0, 0, 2), None),
            Err(PlacementError::SpanOutOfRange { .. })
        ));
    }

    #[test]
    fn init_grid_keeps_items_and_restyles() {
        let mut engine = engine();
        let id = engine.add_item(ItemPosition::new(0, 30, 1, 4)).unwrap();
        assert_eq!(engine.item(id).unwrap().style().left, 1200.0);

        engine.init_grid(GridDimensions {
            cols: 20,
            col_width: 50.0,
            ..dims(20)
        });
        let item = engine.item(id).unwrap();
        assert_eq!(item.position, ItemPosition::new(0, 30, 1, 4));
        assert_eq!(item.style().left, 1500.0);
        assert_eq!(item.style().width, 200.0);
        // Cells that still exist are marked; the rest is simply off-grid
        assert_eq!(engine.spaces()[0].len(), 20);
        assert!(engine.spaces().iter().flatten().all(|s| !s.occupied));
    }

    #[test]
    fn unknown_item() {
        let mut engine = engine();
        let ghost = Uuid::new_v4();
        assert_eq!(
            engine.remove_item(ghost).unwrap_err(),
            PlacementError::UnknownItem(ghost)
        );
        assert_eq!(
            engine.set_content(ghost, "notes").unwrap_err(),
            PlacementError::UnknownItem(ghost)
        );
    }

    #[test]
    fn set_content_keeps_position() {
        let mut engine = engine();
        let id = engine.add_item(ItemPosition::new(1, 1, 1, 3)).unwrap();
        assert!(engine.item(id).unwrap().content.is_none());

        engine.set_content(id, "Design review").unwrap();
        let item = engine.item(id).unwrap();
        assert_eq!(item.content.as_deref(), Some("Design review"));
        assert_eq!(item.position, ItemPosition::new(1, 1, 1, 3));
        assert!(engine.is_occupied(GridCoord::new(1, 3)));
    }

    #[test]
    fn overflowing_positions_rejected() {
        let mut engine = engine();
        let id = engine.add_item(ItemPosition::new(0, 0, 1, 2)).unwrap();

        assert_eq!(
            engine.move_item(id, ItemPosition::new(i32::MAX, 0, 1, 2)),
            Err(PlacementError::OutOfBounds { row: i32::MAX, col: 0 })
        );
        assert_eq!(
            engine.move_item(id, ItemPosition::new(0, 1, 1, i32::MAX)),
            Err(PlacementError::OutOfBounds { row: 0, col: 35 })
        );
        assert_eq!(
            engine.move_item(id, ItemPosition::new(i32::MIN, i32::MIN, 1, 1)),
            Err(PlacementError::OutOfBounds { row: i32::MIN, col: i32::MIN })
        );
        assert_eq!(engine.item(id).unwrap().position, ItemPosition::new(0, 0, 1, 2));
    }

    #[test]
    fn huge_span_rejected_without_expanding() {
        let mut engine = engine();
        assert_eq!(
            engine.add_item(ItemPosition::new(0, 0, 100_000, 100_000)),
            Err(PlacementError::OutOfBounds { row: 0, col: 35 })
        );
        assert_eq!(
            engine.add_item(ItemPosition::new(2, 3, 100_000, 1)),
            Err(PlacementError::OutOfBounds { row: 10, col: 3 })
        );
        assert!(engine.items().is_empty());
    }
}
