//! Darkroom: headless front-end for the photo-editing engine.
//!
//! Loads an image, applies an edit state, presets or partial adjustments,
//! renders through the GPU pipeline (or the reduced fallback) and writes
//! the result.

mod config;
mod render;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use darkroom_core::preset::builtin_presets;

#[derive(Debug, Parser)]
#[command(name = "darkroom")]
#[command(version, about = "Non-destructive photo editing from the command line", long_about = None)]
struct Cli {
    /// More logging; repeat for more. DARKROOM_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render an image with adjustments applied
    Render(render::RenderArgs),

    /// List the built-in presets
    Presets {
        /// Print the full preset definitions as JSON
        #[arg(long)]
        json: bool,
    },
}

fn install_tracing(verbose: u8) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter_layer = EnvFilter::try_from_env("DARKROOM_LOG").unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "darkroom_core=warn,darkroom_gpu=warn,darkroom=warn",
            1 => "darkroom_core=info,darkroom_gpu=info,darkroom=info",
            2 => "darkroom_core=debug,darkroom_gpu=debug,darkroom=debug",
            _ => "darkroom_core=trace,darkroom_gpu=trace,darkroom=trace,wgpu=info",
        })
    });

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
}

fn list_presets(json: bool) -> Result<()> {
    let presets = builtin_presets()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(());
    }
    for preset in presets {
        let category = format!("{:?}", preset.category).to_lowercase();
        println!("{:<16} {category:<8} {}", preset.name, preset.description);
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    install_tracing(cli.verbose)?;

    match cli.command {
        Command::Render(args) => render::run(&args),
        Command::Presets { json } => list_presets(json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_arguments() {
        let cli = Cli::try_parse_from([
            "darkroom",
            "-vv",
            "render",
            "in.jpg",
            "-o",
            "out.png",
            "--preset",
            "Kodak Portra",
            "--seed",
            "3",
            "--fallback",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.preset.as_deref(), Some("Kodak Portra"));
        assert_eq!(args.seed, 3.0);
        assert!(args.config.fallback);
        assert!(!args.preview);
    }

    #[test]
    fn test_render_requires_output() {
        assert!(Cli::try_parse_from(["darkroom", "render", "in.jpg"]).is_err());
    }
}
