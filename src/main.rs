// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

use bills_manager::{import_from_csv, logging, Settings, Summary};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("summary") => match args.get(2) {
            Some(path) => run_summary(Path::new(path))?,
            None => {
                eprintln!("Usage: bills-manager summary FILE.csv");
                std::process::exit(2);
            }
        },
        Some("-h") | Some("--help") => print_usage(),
        // UI mode (default), optionally preloaded
        other => run_ui_mode(other.map(PathBuf::from))?,
    }

    Ok(())
}

fn print_usage() {
    println!("bills-manager {}", bills_manager::VERSION);
    println!();
    println!("Usage:");
    println!("  bills-manager [FILE.csv]        open the bills UI, optionally loading FILE.csv");
    println!("  bills-manager summary FILE.csv  print totals for FILE.csv");
}

fn run_summary(path: &Path) -> Result<()> {
    logging::init_stderr();
    let settings = Settings::load();

    let report = import_from_csv(path, settings.header_mode)?;
    let summary = Summary::compute(&report.bills);

    println!("📂 {} ({} bills)", path.display(), report.bills.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{}", summary.total_label());

    println!("\n📅 By date:");
    for (day, amount) in &summary.by_date {
        println!("  {:<12} {:>12.2}", day, amount);
    }

    println!("\n🏷️  By category:");
    for (category, amount, share) in summary.category_shares() {
        println!("  {:<16} {:>12.2}  {:>5.1}%", category, amount, share);
    }

    if !report.rejected.is_empty() {
        println!("\n⚠️  Rejected rows:");
        for row in &report.rejected {
            println!("  {}", row);
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(preload: Option<PathBuf>) -> Result<()> {
    let log_path = logging::init_file(&Settings::config_dir())?;
    tracing::info!("starting bills UI, logging to {}", log_path.display());

    // First run: leave an editable settings file behind
    let settings_path = Settings::config_path();
    if !settings_path.exists() {
        if let Err(e) = Settings::default().save_to(&settings_path) {
            tracing::warn!("could not write default settings: {:#}", e);
        }
    }

    let settings = Settings::load();
    let mut app = ui::App::new(bills_manager::BillStore::new(), settings);

    if let Some(path) = preload {
        app.import(&path);
    }

    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_preload: Option<PathBuf>) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print totals: bills-manager summary FILE.csv");
    std::process::exit(1);
}
