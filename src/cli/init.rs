use crate::cli::Context;
use crate::error::Result;
use crate::settings::save_settings;

pub fn run(ctx: &Context) -> Result<()> {
    ctx.tables()?.validate()?;
    let path = save_settings(&ctx.settings)?;
    println!("Data dir:   {}", ctx.data_dir.display());
    println!("Variant:    {}", ctx.settings.variant.key());
    if let Some(tables) = &ctx.settings.tables {
        println!("Tables:     {tables}");
    }
    println!("Saved settings to {}", path.display());
    Ok(())
}
