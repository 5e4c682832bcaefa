use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::Context;
use crate::error::Result;

pub fn run(ctx: &Context) -> Result<()> {
    let ds = ctx.dataset()?;

    println!("Data dir:      {}", ctx.data_dir.display());
    println!("Variant:       {}", ctx.settings.variant.key());
    println!("Fingerprint:   {}", ds.fingerprint);
    println!();
    println!("Files:         {}", ds.files);
    println!("Raw rows:      {}", ds.raw_rows);
    println!("Kept rows:     {}", ds.normalized_rows);
    println!("Chart rows:    {}", ds.aggregated.len());
    println!(
        "Merged groups: {}",
        ds.aggregated.iter().filter(|r| r.rows > 1).count()
    );
    println!("Scenarios:     {}", ds.scenarios().join(", "));
    println!("Effects:       {}", ds.choices.metrics.join(", "));
    println!("Scales:        {}", ds.choices.attributes.join(", "));

    if ds.choices.is_empty() {
        println!("\n{}", "No rows survive the metric and attribute filters.".yellow());
        return Ok(());
    }

    let missing = ds.misaligned();
    if missing.is_empty() {
        println!("\n{}", "Scenarios aligned.".green());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Effect", "Scale", "Industry", "Year", "Missing from"]);
    for m in &missing {
        table.add_row(vec![
            Cell::new(&m.metric),
            Cell::new(&m.attribute),
            Cell::new(&m.industry),
            Cell::new(&m.year.label),
            Cell::new(&m.missing_from),
        ]);
    }
    println!(
        "\n{}\n{table}",
        format!("{} combinations missing from a scenario", missing.len())
            .yellow()
            .bold()
    );
    Ok(())
}
