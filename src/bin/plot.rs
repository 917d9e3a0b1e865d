use chrono::Local;
use std::io::{self, Write};
use std::path::Path;

use wb_tracker::plot::{extract_positions, product_name, render};
use wb_tracker::storage::SnapshotStore;
use wb_tracker::utils::compact_timestamp;

fn main() {
    let product_id = match prompt_product_id() {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Invalid product ID: {}", e);
            std::process::exit(1);
        }
    };

    let store = match SnapshotStore::open(".") {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open storage: {}", e);
            std::process::exit(1);
        }
    };

    let records = match store.load_all_analyses() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to read analyses: {}", e);
            std::process::exit(1);
        }
    };
    if records.is_empty() {
        println!("No analysis files found");
        return;
    }

    let series = extract_positions(&records, product_id);
    if series.is_empty() {
        println!("Product {} not found in analyses", product_id);
        return;
    }

    let title = match product_name(&records, product_id) {
        Some(name) => format!("Position Movement - {}", name),
        None => format!("Position Movement - {}", product_id),
    };

    let plots_dir = Path::new("plots");
    if let Err(e) = std::fs::create_dir_all(plots_dir) {
        eprintln!("Failed to create plots directory: {}", e);
        std::process::exit(1);
    }
    let path = plots_dir.join(format!(
        "movement-{}-{}.png",
        product_id,
        compact_timestamp(&Local::now())
    ));

    match render(&path, &title, &series) {
        Ok(()) => println!("Plot saved to: {}", path.display()),
        Err(e) => {
            eprintln!("Failed to render plot: {}", e);
            std::process::exit(1);
        }
    }
}

fn prompt_product_id() -> Result<u64, Box<dyn std::error::Error>> {
    print!("Enter product ID to plot: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().parse()?)
}
