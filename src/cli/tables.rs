use crate::cli::Context;
use crate::error::Result;

pub fn run(ctx: &Context) -> Result<()> {
    let tables = ctx.tables()?;
    println!("{}", serde_json::to_string_pretty(&tables)?);
    Ok(())
}
