use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::cli::Context;
use crate::error::{ImpactError, Result};
use crate::fmt::{metric_value, plain_description};
use crate::models::ChartRow;

pub fn run(
    ctx: &Context,
    effect: Option<&str>,
    scale: Option<&str>,
    scenario: Option<&str>,
    year: Option<&str>,
) -> Result<()> {
    let ds = ctx.dataset()?;
    let selection = ds.selection(effect, scale)?;
    if let Some(label) = year {
        if ds.tables.period_by_label(label).is_none() {
            return Err(ImpactError::InvalidSelection {
                kind: "year",
                value: label.to_string(),
            });
        }
    }
    if let Some(name) = scenario {
        if !ds.scenarios().iter().any(|s| s == name) {
            return Err(ImpactError::MissingScenario(name.to_string()));
        }
    }

    let chart = ds.chart(&selection)?;
    let frames = ds.tables.frame_labels();
    let frame_pos = |label: &str| frames.iter().position(|f| *f == label).unwrap_or(usize::MAX);

    println!("{}", chart.spec.page_title.bold());
    println!(
        "{} {}   {} {}",
        "Effect:".dimmed(),
        selection.metric,
        "Scale:".dimmed(),
        selection.attribute
    );

    for panel in &chart.spec.panels {
        if let (Some(wanted), Some(own)) = (scenario, panel.scenario.as_deref()) {
            if wanted != own {
                continue;
            }
        }
        let mut rows: Vec<&ChartRow> = chart
            .rows
            .iter()
            .filter(|r| panel.scenario.as_deref().map_or(true, |s| r.scenario == s))
            .filter(|r| scenario.map_or(true, |s| r.scenario == s))
            .filter(|r| year.map_or(true, |y| r.year == y))
            .collect();
        rows.sort_by(|a, b| {
            frame_pos(&a.year)
                .cmp(&frame_pos(&b.year))
                .then_with(|| a.industry.cmp(&b.industry))
                .then_with(|| a.scenario.cmp(&b.scenario))
        });

        let grouped = panel.scenario.is_none();
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        let mut header = vec!["Year", "Industry"];
        if grouped {
            header.push("Scenario");
        }
        header.extend(["Value", "Example"]);
        table.set_header(header);

        for r in &rows {
            let mut cells = vec![Cell::new(&r.year), Cell::new(&r.industry)];
            if grouped {
                cells.push(Cell::new(&r.scenario));
            }
            cells.push(
                Cell::new(metric_value(&selection.metric, r.value))
                    .set_alignment(CellAlignment::Right),
            );
            cells.push(Cell::new(
                r.description.as_deref().map(plain_description).unwrap_or_default(),
            ));
            table.add_row(cells);
        }

        println!("\n{}", panel.title.cyan().bold());
        if rows.is_empty() {
            println!("(no rows for this selection)");
        } else {
            println!("{table}");
        }
    }
    Ok(())
}
