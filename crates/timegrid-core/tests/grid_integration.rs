//! Integration tests for grid occupancy and item placement.

use timegrid_core::error::PlacementError;
use timegrid_core::grid::{
    item_position_to_style, pixel_to_item_position, GridCoord, GridDimensions, GridEngine,
    ItemLimits, ItemPosition, ItemSize, Selection,
};

fn dims(cols: i32) -> GridDimensions {
    GridDimensions {
        rows: 10,
        cols,
        row_height: 50.0,
        col_width: 40.0,
    }
}

#[test]
fn test_overlap_rejected_adjacent_row_accepted() {
    let mut engine = GridEngine::new(dims(35), ItemLimits::default());
    engine.add_item(ItemPosition::new(0, 0, 1, 2)).unwrap();

    let err = engine.add_item(ItemPosition::new(0, 1, 1, 1)).unwrap_err();
    assert_eq!(err, PlacementError::Overlap { row: 0, col: 1 });
    assert_eq!(engine.items().len(), 1);

    engine.add_item(ItemPosition::new(1, 0, 1, 1)).unwrap();
    assert_eq!(engine.items().len(), 2);
    assert!(engine.find_overlap().is_none());
}

#[test]
fn test_resize_below_min_cols_rejected_without_conflict() {
    let limits = ItemLimits {
        min_cols: 2,
        ..ItemLimits::default()
    };
    let mut engine = GridEngine::new(dims(35), limits);
    let id = engine.add_item(ItemPosition::new(3, 3, 1, 4)).unwrap();

    let err = engine.resize_item(id, ItemPosition::new(3, 3, 1, 1)).unwrap_err();
    assert_eq!(err, PlacementError::SpanOutOfRange { rowspan: 1, colspan: 1 });
    assert_eq!(engine.item(id).unwrap().position, ItemPosition::new(3, 3, 1, 4));

    engine.resize_item(id, ItemPosition::new(3, 3, 1, 2)).unwrap();
    assert!(!engine.is_occupied(GridCoord::new(3, 5)));
}

#[test]
fn test_occupancy_matches_items_after_mutations() {
    let mut engine = GridEngine::new(dims(20), ItemLimits::default());
    let a = engine.add_item(ItemPosition::new(0, 0, 1, 4)).unwrap();
    let b = engine.add_item(ItemPosition::new(2, 5, 1, 3)).unwrap();

    engine.move_item(a, ItemPosition::new(0, 2, 1, 4)).unwrap();
    // Moving onto its own old cells is allowed
    engine.move_item(a, ItemPosition::new(0, 3, 1, 4)).unwrap();
    assert!(engine.move_item(b, ItemPosition::new(0, 6, 1, 3)).is_err());
    engine.remove_item(b).unwrap();

    let expected = engine.occupied_coords(None);
    for space in engine.spaces().iter().flatten() {
        assert_eq!(space.occupied, expected.contains(&space.coord), "{}", space.id);
    }
    assert_eq!(expected.len(), 4);
    assert_eq!(engine.space(GridCoord::new(0, 3)).unwrap().id, "0_3_space");
}

#[test]
fn test_out_of_bounds_and_unknown_items() {
    let mut engine = GridEngine::new(dims(10), ItemLimits::default());
    assert_eq!(
        engine.add_item(ItemPosition::new(9, 8, 1, 4)).unwrap_err(),
        PlacementError::OutOfBounds { row: 9, col: 10 }
    );
    assert!(matches!(
        engine.add_item(ItemPosition::new(-1, 0, 1, 1)),
        Err(PlacementError::OutOfBounds { row: -1, col: 0 })
    ));

    let ghost = uuid::Uuid::new_v4();
    assert_eq!(
        engine.remove_item(ghost).unwrap_err(),
        PlacementError::UnknownItem(ghost)
    );
}

#[test]
fn test_capacity_limit() {
    let limits = ItemLimits {
        max_count: 2,
        ..ItemLimits::default()
    };
    let mut engine = GridEngine::new(dims(35), limits);
    engine.add_item(ItemPosition::new(0, 0, 1, 1)).unwrap();
    let second = engine.add_item(ItemPosition::new(1, 0, 1, 1)).unwrap();
    assert!(engine.is_full());
    assert_eq!(
        engine.add_item(ItemPosition::new(2, 0, 1, 1)),
        Err(PlacementError::CapacityExceeded { max: 2 })
    );

    engine.remove_item(second).unwrap();
    assert!(engine.add_item(ItemPosition::new(2, 0, 1, 1)).is_ok());
}

#[test]
fn test_shrinking_grid_keeps_item_positions() {
    let mut engine = GridEngine::new(dims(35), ItemLimits::default());
    let id = engine.add_item(ItemPosition::new(0, 30, 1, 4)).unwrap();

    engine.init_grid(dims(20));
    assert_eq!(engine.item(id).unwrap().position.coord, GridCoord::new(0, 30));
    assert_eq!(engine.item(id).unwrap().style().left, 1200.0);
    assert_eq!(engine.spaces()[0].len(), 20);
    assert!(!engine.spaces()[0].iter().any(|s| s.occupied));

    // Still overlaps logically, still rejected
    assert!(engine.validate_drop(&ItemPosition::new(0, 31, 1, 1), None).is_err());
}

#[test]
fn test_selection_through_engine() {
    let mut engine = GridEngine::new(dims(35), ItemLimits::default());
    let limits = *engine.limits();
    let mut selection = Selection::new();

    assert!(selection.begin(GridCoord::new(4, 2), &engine));
    selection.update(GridCoord::new(4, 8), &limits);
    selection.commit(&mut engine).unwrap();

    let item = &engine.items()[0];
    assert_eq!(item.position, ItemPosition::new(4, 2, 1, 7));
    assert_eq!(item.position.size, ItemSize::new(1, 7));
}

#[test]
fn test_pixel_conversion_inverse() {
    let dims = GridDimensions {
        rows: 10,
        cols: 35,
        row_height: 50.0,
        col_width: 200.0 / 7.0,
    };
    let position = ItemPosition::new(3, 12, 1, 4);
    let style = item_position_to_style(&position, &dims);
    let rect = style.to_rectangle(100.0);
    assert_eq!(pixel_to_item_position(&rect, &dims, 100.0), position);
    let css = style.to_string();
    assert!(css.starts_with("position: absolute; top: 150px;"), "{css}");
    assert!(css.contains("height: 50px"), "{css}");
}
