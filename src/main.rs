// Entry point: parse flags, run the report once, print previews.
//
// The report runs as a single batch: load the storm table, rank event types
// by health and economic impact, write CSV/JSON/SVG outputs, then print a
// short markdown preview of each ranking to stdout.
use anyhow::Result;
use clap::Parser;
use storm_report::config::ReportConfig;
use storm_report::output::preview_table;
use storm_report::pipeline::{generate_report, ReportOutcome};
use storm_report::reports::preview_rows;
use storm_report::{logging, util};

fn print_outcome(config: &ReportConfig, outcome: &ReportOutcome) {
    let load = &outcome.load_report;
    println!(
        "Processing dataset... ({} rows read, {} event types)",
        util::format_int(load.total_rows),
        util::format_int(outcome.summary.distinct_event_types)
    );
    if load.skipped_rows > 0 {
        println!(
            "Note: {} rows skipped because they could not be decoded.",
            util::format_int(load.skipped_rows)
        );
    }
    if load.coerced_fields > 0 {
        println!(
            "Note: {} numeric fields could not be parsed and were counted as 0.",
            util::format_int(load.coerced_fields)
        );
        for w in &load.warnings {
            println!("  row {}: {} = {:?}", w.row, w.column, w.value);
        }
    }
    println!();

    println!("Report 1: Event Types Most Harmful to Population Health");
    println!("(Top {} by fatalities + injuries)\n", config.top);
    println!(
        "{}\n",
        preview_table(&preview_rows(&outcome.health, 0), config.preview_rows)
    );

    println!("Report 2: Event Types with the Greatest Economic Consequences");
    println!("(Top {} by property + crop damage, USD)\n", config.top);
    println!(
        "{}\n",
        preview_table(&preview_rows(&outcome.economic, 0), config.preview_rows)
    );

    println!("Outputs saved:");
    for path in &outcome.artifacts {
        println!("  {}", path.display());
    }
}

fn main() -> Result<()> {
    let config = ReportConfig::parse();
    logging::init(config.verbose);

    let outcome = generate_report(&config)?;
    print_outcome(&config, &outcome);
    Ok(())
}
