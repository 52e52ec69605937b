use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use timegrid_core::{GridDimensions, TimelineCoordinator, ViewMode};

use super::{load_settings, today_or_now};

#[derive(Args)]
pub struct GridArgs {
    /// View mode (defaults to the configured default_view_mode)
    #[arg(long)]
    pub mode: Option<ViewMode>,
    /// Date the calendar is generated around (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ColumnView {
    col: i32,
    label: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    alternate: bool,
}

#[derive(Serialize)]
struct GridView {
    mode: ViewMode,
    dimensions: GridDimensions,
    snap: (f64, f64),
    columns: Vec<ColumnView>,
}

pub fn run(args: GridArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(None, None)?;
    let mut coordinator = TimelineCoordinator::new(settings, today_or_now(args.today))?;
    if let Some(mode) = args.mode {
        coordinator.on_view_mode_changed(mode);
    }

    let dimensions = *coordinator.dimensions();
    let window = coordinator.active_column_hierarchy();
    let columns = (0..dimensions.cols)
        .map(|col| {
            let sub = window.sub_column(col);
            ColumnView {
                col,
                label: sub.map(|s| s.label.clone()).unwrap_or_default(),
                start_date: sub.map(|s| s.start_date),
                end_date: sub.map(|s| s.end_date),
                alternate: coordinator.is_alternate_band(col),
            }
        })
        .collect();

    let view = GridView {
        mode: coordinator.view_mode(),
        dimensions,
        snap: coordinator.snap_grid(),
        columns,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&view)?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "{} grid: {} rows x {} cols, cell {:.2} x {:.2} px",
        view.mode, dimensions.rows, dimensions.cols, dimensions.col_width, dimensions.row_height
    );
    for column in &view.columns {
        let band = if column.alternate { "#" } else { " " };
        match (column.start_date, column.end_date) {
            (Some(start), Some(end)) => {
                println!("{band} {:>3}  {:<4} {} .. {}", column.col, column.label, start, end)
            }
            _ => println!("{band} {:>3}", column.col),
        }
    }
    Ok(())
}
