use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use timegrid_core::{CalendarWindow, SubColumn, ViewMode};

use super::{load_settings, today_or_now};

#[derive(Args)]
pub struct CalendarArgs {
    /// View mode: week, month, quarter_year, half_year or year
    #[arg(long, default_value = "week")]
    pub mode: ViewMode,
    /// Date to generate around (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,
    /// Buffer pages on each side of the current page
    #[arg(long)]
    pub pages: Option<u32>,
    /// Main columns per page
    #[arg(long)]
    pub per_page: Option<u32>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct MainColumnView<'a> {
    index: i32,
    code: &'a str,
    label: &'a str,
    sub_columns: Vec<SubColumnView<'a>>,
}

#[derive(Serialize)]
struct SubColumnView<'a> {
    column_number: i32,
    label: &'a str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    days: usize,
}

impl<'a> From<&'a SubColumn> for SubColumnView<'a> {
    fn from(sub: &'a SubColumn) -> Self {
        Self {
            column_number: sub.column_number,
            label: &sub.label,
            start_date: sub.start_date,
            end_date: sub.end_date,
            days: sub.day_count(),
        }
    }
}

#[derive(Serialize)]
struct WindowView<'a> {
    mode: ViewMode,
    anchor: NaiveDate,
    main_columns: Vec<MainColumnView<'a>>,
}

fn window_view(window: &CalendarWindow) -> WindowView<'_> {
    WindowView {
        mode: window.mode(),
        anchor: window.anchor(),
        main_columns: window
            .main_columns()
            .map(|main| MainColumnView {
                index: main.index,
                code: &main.code,
                label: &main.label,
                sub_columns: window.subs_of(main).map(SubColumnView::from).collect(),
            })
            .collect(),
    }
}

pub fn run(args: CalendarArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(args.per_page, args.pages)?;
    let today = today_or_now(args.today);
    let window = CalendarWindow::generate(args.mode, today, &settings.window)?;

    if args.json {
        let json = serde_json::to_string_pretty(&window_view(&window))?;
        println!("{json}");
        return Ok(());
    }

    println!("{} calendar around {} (anchor {})", args.mode, today, window.anchor());
    for main in window.main_columns() {
        println!("[{}] {} ({})", main.index, main.label, main.code);
        for sub in window.subs_of(main) {
            println!(
                "  {:>4}  {:<4} {} .. {}",
                sub.column_number, sub.label, sub.start_date, sub.end_date
            );
        }
    }
    Ok(())
}
