use std::path::PathBuf;

use crate::chart::write_export;
use crate::cli::Context;
use crate::error::Result;

fn default_dir(ctx: &Context) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    ctx.data_dir.join("exports").join(format!("chart-{date}"))
}

pub fn run(
    ctx: &Context,
    effect: Option<&str>,
    scale: Option<&str>,
    output: Option<String>,
) -> Result<()> {
    let ds = ctx.dataset()?;
    let selection = ds.selection(effect, scale)?;
    let chart = ds.chart(&selection)?;
    let dir = output.map(PathBuf::from).unwrap_or_else(|| default_dir(ctx));
    let (rows_path, spec_path) = write_export(&chart, &dir)?;
    println!("Wrote {} ({} rows)", rows_path.display(), chart.rows.len());
    println!("Wrote {}", spec_path.display());
    Ok(())
}
