//! CLI tool for spangrid - repairs a table record stream
//!
//! Usage:
//!   spangrid_cli <records.json>              # Normalized records to stdout
//!   spangrid_cli <records.json> -o out.json  # Normalized records to file
//!
//! Set SPANGRID_LOG=debug to see every repair.

#![allow(clippy::exit)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use log::{LevelFilter, Metadata, Record};
use spangrid::codec::{read_tables, write_records, TableRecord};
use spangrid::{balance, Table};

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: spangrid_cli <records.json> [-o output.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(args[3].as_str())
    } else {
        None
    };

    if let Err(e) = run(input_path, output_path) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(input_path: &str, output_path: Option<&str>) -> spangrid::Result<()> {
    let data = fs::read_to_string(input_path)?;
    let records: Vec<TableRecord> = serde_json::from_str(&data)?;
    let tables = read_tables(&records)?;

    // Repair and re-emit
    let mut out: Vec<TableRecord> = Vec::new();
    for mut table in tables {
        let report = balance(&mut table);
        if table.is_empty() {
            eprintln!("table {}: removed (no rows or columns left)", table.id);
            continue;
        }
        eprintln!("{}", summary(&table));
        if !report.is_clean() {
            eprintln!("  repaired: {:?}", report);
        }
        out.extend(write_records(&table));
    }

    let json = serde_json::to_string_pretty(&out)?;
    match output_path {
        Some(path) => {
            fs::write(path, &json)?;
            eprintln!("Written: {}", path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

/// One header line plus a slot map: each slot shows the document-order
/// index of the cell covering it.
fn summary(table: &Table) -> String {
    let grid = table.occupancy();
    let mut text = format!(
        "table {}: {} rows x {} columns, {} cells",
        table.id,
        grid.rows(),
        grid.cols(),
        grid.placed().len()
    );
    let index_of = |row: usize, col: usize| {
        grid.owner(row, col)
            .and_then(|owner| grid.placed().iter().position(|p| p.key == owner.key))
    };
    for row in 0..grid.rows() {
        text.push_str("\n ");
        for col in 0..grid.cols() {
            match index_of(row, col) {
                Some(i) => text.push_str(&format!(" {i:>3}")),
                None => text.push_str("   ."),
            }
        }
    }
    text
}

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logging() {
    static LOGGER: SimpleLogger = SimpleLogger;
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log_level_from_env());
}

fn log_level_from_env() -> LevelFilter {
    match env::var("SPANGRID_LOG").as_deref() {
        Ok("error") => LevelFilter::Error,
        Ok("info") => LevelFilter::Info,
        Ok("debug") => LevelFilter::Debug,
        Ok("trace") => LevelFilter::Trace,
        Ok("off") => LevelFilter::Off,
        _ => LevelFilter::Warn,
    }
}
