use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::Context;
use crate::error::Result;

pub fn run(ctx: &Context) -> Result<()> {
    let ds = ctx.dataset()?;
    let default = ds.selection(None, None).ok();

    let marker = |value: &str, chosen: Option<&str>| {
        if chosen == Some(value) {
            "*".to_string()
        } else {
            String::new()
        }
    };

    let mut effects = Table::new();
    effects.set_header(vec!["", "Select an Effect"]);
    for m in &ds.choices.metrics {
        let chosen = default.as_ref().map(|s| s.metric.as_str());
        effects.add_row(vec![Cell::new(marker(m, chosen)), Cell::new(m)]);
    }

    let mut scales = Table::new();
    scales.set_header(vec!["", "Select Scale of Effect"]);
    for a in &ds.choices.attributes {
        let chosen = default.as_ref().map(|s| s.attribute.as_str());
        scales.add_row(vec![Cell::new(marker(a, chosen)), Cell::new(a)]);
    }

    println!("{}\n{effects}\n\n{scales}", "Choices".bold());
    println!("Scenarios: {}", ds.scenarios().join(", "));
    Ok(())
}
