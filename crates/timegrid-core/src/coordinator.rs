//! Timeline coordinator.
//!
//! Ties the calendar windows to the grid. A view mode change re-derives the
//! grid's column count and width from the active mode and rebuilds the cell
//! matrix; placed items keep their logical row/column and only their pixel
//! styles change. Every state change is published as a [`TimelineEvent`] to
//! channel subscribers.
//!
//! All handlers run to completion synchronously; nothing here blocks or
//! spawns work.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use uuid::Uuid;

use crate::calendar::{CalendarService, CalendarWindow, ViewMode, ViewModeConfig, WindowSettings};
use crate::clock::Clock;
use crate::error::{PlacementError, Result};
use crate::events::TimelineEvent;
use crate::grid::{
    self, pixel_to_item_position, GridCoord, GridDimensions, GridEngine, GridItem, GridSpace,
    ItemLimits, ItemPosition, Rectangle, Selection, SelectionOutcome,
};

/// Everything the coordinator needs to lay out calendar and grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineSettings {
    pub window: WindowSettings,
    /// Pixel width of one main column; sub-columns share it evenly.
    pub main_col_width: f64,
    /// Height of the calendar header above the grid, in pixels.
    pub calendar_height: f64,
    pub rows: i32,
    pub row_height: f64,
    pub limits: ItemLimits,
    pub initial_mode: ViewMode,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            main_col_width: 200.0,
            calendar_height: 100.0,
            rows: 10,
            row_height: 50.0,
            limits: ItemLimits::default(),
            initial_mode: ViewMode::Week,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Receiving end of the event channel. Dropping it is equivalent to
/// unsubscribing; the coordinator prunes it on the next publish.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: Receiver<TimelineEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn try_recv(&self) -> Option<TimelineEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// All events received so far.
    pub fn drain(&self) -> Vec<TimelineEvent> {
        self.receiver.try_iter().collect()
    }
}

#[derive(Debug)]
struct Subscriber {
    id: SubscriberId,
    sender: Sender<TimelineEvent>,
}

#[derive(Debug)]
pub struct TimelineCoordinator {
    calendar: CalendarService,
    grid: GridEngine,
    selection: Selection,
    mode: ViewMode,
    settings: TimelineSettings,
    subscribers: Vec<Subscriber>,
    next_subscriber: u64,
}

impl TimelineCoordinator {
    pub fn new(settings: TimelineSettings, today: NaiveDate) -> Result<Self> {
        let calendar = CalendarService::new(settings.window, today)?;
        let mode = settings.initial_mode;
        let dimensions = grid_dimensions(&calendar, &settings, mode);
        Ok(Self {
            calendar,
            grid: GridEngine::new(dimensions, settings.limits),
            selection: Selection::new(),
            mode,
            settings,
            subscribers: Vec::new(),
            next_subscriber: 0,
        })
    }

    pub fn with_clock(settings: TimelineSettings, clock: &dyn Clock) -> Result<Self> {
        Self::new(settings, clock.today())
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&mut self) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push(Subscriber { id, sender });
        Subscription { id, receiver }
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn publish(&mut self, event: TimelineEvent) {
        tracing::debug!(kind = event.kind(), "publishing event");
        self.subscribers
            .retain(|s| s.sender.send(event.clone()).is_ok());
    }

    fn reject(&mut self, id: Option<Uuid>, position: Option<ItemPosition>, err: &PlacementError) {
        self.publish(TimelineEvent::PlacementRejected {
            id,
            position,
            reason: err.to_string(),
        });
    }

    // ── View mode ────────────────────────────────────────────────────

    pub fn view_mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch the active mode and rebuild the grid for its column layout.
    pub fn on_view_mode_changed(&mut self, mode: ViewMode) -> GridDimensions {
        self.mode = mode;
        let dimensions = self.dimensions_for(mode);
        self.grid.init_grid(dimensions);
        tracing::info!(
            mode = %mode,
            cols = dimensions.cols,
            col_width = dimensions.col_width,
            "view mode changed"
        );
        self.publish(TimelineEvent::ViewModeChanged { mode, dimensions });
        dimensions
    }

    /// Grid dimensions `mode` would produce.
    pub fn dimensions_for(&self, mode: ViewMode) -> GridDimensions {
        grid_dimensions(&self.calendar, &self.settings, mode)
    }

    pub fn active_config(&self) -> &ViewModeConfig {
        self.calendar.config(self.mode)
    }

    pub fn active_column_hierarchy(&self) -> &CalendarWindow {
        self.calendar.window(self.mode)
    }

    pub fn calendar(&self) -> &CalendarService {
        &self.calendar
    }

    /// Rebuild the calendar windows if the clock moved to a new date.
    pub fn refresh_today(&mut self, clock: &dyn Clock) -> Result<bool> {
        let changed = self.calendar.refresh(clock)?;
        if changed {
            let today = self.calendar.today();
            self.publish(TimelineEvent::CalendarRegenerated { today });
        }
        Ok(changed)
    }

    // ── Grid queries ─────────────────────────────────────────────────

    pub fn dimensions(&self) -> &GridDimensions {
        self.grid.dimensions()
    }

    pub fn grid_spaces(&self) -> &[Vec<GridSpace>] {
        self.grid.spaces()
    }

    pub fn items(&self) -> &[GridItem] {
        self.grid.items()
    }

    pub fn item(&self, id: Uuid) -> Option<&GridItem> {
        self.grid.item(id)
    }

    pub fn grid(&self) -> &GridEngine {
        &self.grid
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Drag and resize snap steps: `(col_width, row_height)`.
    pub fn snap_grid(&self) -> (f64, f64) {
        let dims = self.grid.dimensions();
        (dims.col_width, dims.row_height)
    }

    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    /// Dates under grid column `col` in the active mode.
    pub fn dates_for_column(&self, col: i32) -> Option<&[NaiveDate]> {
        self.active_column_hierarchy().dates_for_column(col)
    }

    pub fn is_alternate_band(&self, col: i32) -> bool {
        grid::is_alternate_band(col, self.mode)
    }

    // ── Interactive placement ────────────────────────────────────────

    pub fn begin_selection(&mut self, cell: GridCoord) -> bool {
        self.selection.begin(cell, &self.grid)
    }

    pub fn update_selection(&mut self, cell: GridCoord) -> Option<ItemPosition> {
        let limits = *self.grid.limits();
        self.selection.update(cell, &limits).copied()
    }

    /// Pointer release. `None` when no selection was in flight.
    pub fn commit_or_cancel_selection(&mut self) -> Option<SelectionOutcome> {
        let outcome = self.selection.commit(&mut self.grid)?;
        match &outcome {
            SelectionOutcome::Committed { id, position } => {
                self.publish(TimelineEvent::ItemCreated {
                    id: *id,
                    position: *position,
                });
            }
            SelectionOutcome::Cancelled {
                reason: Some(reason),
            } => {
                let reason = reason.clone();
                self.reject(None, None, &reason);
            }
            SelectionOutcome::Cancelled { reason: None } => {}
        }
        Some(outcome)
    }

    pub fn cancel_selection(&mut self) -> Option<SelectionOutcome> {
        self.selection.cancel()
    }

    // ── Explicit mutations ───────────────────────────────────────────

    /// Drop a new item at `position`.
    pub fn place_item(&mut self, position: ItemPosition) -> Result<Uuid, PlacementError> {
        match self.grid.add_item(position) {
            Ok(id) => {
                self.publish(TimelineEvent::ItemCreated { id, position });
                Ok(id)
            }
            Err(e) => {
                self.reject(None, Some(position), &e);
                Err(e)
            }
        }
    }

    pub fn move_item(&mut self, id: Uuid, position: ItemPosition) -> Result<(), PlacementError> {
        let from = self.position_or_reject(id)?;
        match self.grid.move_item(id, position) {
            Ok(()) => {
                self.publish(TimelineEvent::ItemMoved {
                    id,
                    from,
                    to: position,
                });
                Ok(())
            }
            Err(e) => {
                self.reject(Some(id), Some(position), &e);
                Err(e)
            }
        }
    }

    pub fn resize_item(&mut self, id: Uuid, position: ItemPosition) -> Result<(), PlacementError> {
        let from = self.position_or_reject(id)?;
        match self.grid.resize_item(id, position) {
            Ok(()) => {
                self.publish(TimelineEvent::ItemResized {
                    id,
                    from,
                    to: position,
                });
                Ok(())
            }
            Err(e) => {
                self.reject(Some(id), Some(position), &e);
                Err(e)
            }
        }
    }

    pub fn remove_item(&mut self, id: Uuid) -> Result<GridItem, PlacementError> {
        match self.grid.remove_item(id) {
            Ok(removed) => {
                self.publish(TimelineEvent::ItemRemoved { id });
                Ok(removed)
            }
            Err(e) => {
                self.reject(Some(id), None, &e);
                Err(e)
            }
        }
    }

    /// Drag end: offset the committed style by `(dx, dy)` pixels and snap.
    pub fn drag_item_by(&mut self, id: Uuid, dx: f64, dy: f64) -> Result<ItemPosition, PlacementError> {
        self.position_or_reject(id)?;
        let item = self.grid.item(id).ok_or(PlacementError::UnknownItem(id))?;
        let style = *item.style();
        let dims = *self.grid.dimensions();
        let target = item.position.at(GridCoord {
            row: ((style.top + dy) / dims.row_height).round() as i32,
            col: ((style.left + dx) / dims.col_width).round() as i32,
        });
        self.move_item(id, target)?;
        Ok(target)
    }

    /// Resize end: snap the page rectangle reported by the resize handle.
    pub fn resize_item_to_rect(&mut self, id: Uuid, rect: &Rectangle) -> Result<ItemPosition, PlacementError> {
        let target = pixel_to_item_position(rect, self.grid.dimensions(), self.settings.calendar_height);
        self.resize_item(id, target)?;
        Ok(target)
    }

    /// Current position of `id`; an unknown id is published as a rejection.
    fn position_or_reject(&mut self, id: Uuid) -> Result<ItemPosition, PlacementError> {
        match self.grid.item(id) {
            Some(item) => Ok(item.position),
            None => {
                let err = PlacementError::UnknownItem(id);
                self.reject(Some(id), None, &err);
                Err(err)
            }
        }
    }
}

/// `cols = main_cols_per_page * per_main`, `col_width = main_col_width / per_main`.
fn grid_dimensions(
    calendar: &CalendarService,
    settings: &TimelineSettings,
    mode: ViewMode,
) -> GridDimensions {
    let per_main = calendar.config(mode).sub_columns_per_main();
    GridDimensions {
        rows: settings.rows,
        cols: (calendar.main_cols_per_page() * per_main) as i32,
        row_height: settings.row_height,
        col_width: settings.main_col_width / f64::from(per_main),
    }
}
