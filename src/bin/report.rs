use chrono::Local;
use clap::Parser;
use std::path::Path;

use wb_tracker::model::Placement;
use wb_tracker::report::{MISSING_POSITION, build_rows, write_csv};
use wb_tracker::storage::SnapshotStore;
use wb_tracker::utils::date_tag;

/// List advertised or organic products from today's analyses.
#[derive(Debug, Parser)]
#[command(name = "report")]
struct Args {
    /// Show organic products instead of advertised
    #[arg(long)]
    organic: bool,

    /// Base directory holding the ranks/ and analyses/ folders
    #[arg(long, default_value = ".")]
    data_dir: String,
}

fn main() {
    let args = Args::parse();
    let placement = if args.organic {
        Placement::Organic
    } else {
        Placement::Advertised
    };

    let store = match SnapshotStore::open(&args.data_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open storage: {}", e);
            std::process::exit(1);
        }
    };

    let today = date_tag(&Local::now());
    let (first, latest) = match store.first_and_latest_analyses(&today) {
        Ok(Some(pair)) => pair,
        Ok(None) => {
            println!("No analysis files found for today");
            return;
        }
        Err(e) => {
            eprintln!("Failed to read analyses: {}", e);
            std::process::exit(1);
        }
    };

    let rows = build_rows(&first, &latest, placement);

    let list_type = match placement {
        Placement::Advertised => "Advertised",
        Placement::Organic => "Organic",
    };
    println!(
        "\n{} Products - {}",
        list_type,
        latest.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}", "-".repeat(80));
    for row in &rows {
        let first_pos = match row.first_position {
            Some(p) => format!("[{}]", p),
            None => format!("[{}]", MISSING_POSITION),
        };
        println!("{:3} {:6} {:10} {}", row.position, first_pos, row.id, row.name);
    }

    let reports_dir = Path::new(&args.data_dir).join("reports");
    match write_csv(&rows, placement, &latest, &reports_dir) {
        Ok(path) => println!("\nReport saved to: {}", path.display()),
        Err(e) => {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
    }
}
