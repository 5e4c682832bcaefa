mod adjust;
mod aggregate;
mod annotate;
mod chart;
mod cli;
mod error;
mod fmt;
mod loader;
mod models;
mod normalize;
mod pipeline;
mod scenario;
mod select;
mod settings;
mod tables;
mod tui;

use clap::Parser;
use tracing_subscriber::{fmt as log_fmt, EnvFilter};

use cli::{Cli, Commands, Context};

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = log_fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    let ctx = Context::resolve(&cli.global);

    let result = match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Init => cli::init::run(&ctx),
        Commands::Tables => cli::tables::run(&ctx),
        Commands::Choices => cli::choices::run(&ctx),
        Commands::Show {
            effect,
            scale,
            scenario,
            year,
        } => cli::show::run(
            &ctx,
            effect.as_deref(),
            scale.as_deref(),
            scenario.as_deref(),
            year.as_deref(),
        ),
        Commands::Check => cli::check::run(&ctx),
        Commands::Export {
            effect,
            scale,
            output,
        } => cli::export::run(&ctx, effect.as_deref(), scale.as_deref(), output),
        Commands::Dashboard => cli::dashboard::run(&ctx),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
