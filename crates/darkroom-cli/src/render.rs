//! `darkroom render`: load, adjust, render and write one image.

use std::path::PathBuf;

use color_eyre::eyre::{Result, WrapErr, eyre};
use darkroom_core::preset::find_builtin;
use darkroom_core::{EditState, PartialAdjustments, Session};
use darkroom_gpu::select_renderer;

use crate::config::ConfigArgs;

#[derive(Debug, clap::Args)]
pub struct RenderArgs {
    /// Source image
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file; the format follows the extension
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Full edit state JSON to start from
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Built-in preset to apply, by name
    #[arg(short, long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Partial adjustment JSON merged last
    #[arg(long, value_name = "FILE")]
    pub adjust: Option<PathBuf>,

    /// Grain seed
    #[arg(long, default_value_t = 0.0)]
    pub seed: f32,

    /// Render the proxy without crop instead of the full-resolution export
    #[arg(long)]
    pub preview: bool,

    /// Write the final edit state JSON here
    #[arg(long, value_name = "FILE")]
    pub save_state: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Apply the state file, preset and adjustment file in that order, each as
/// its own history entry.
fn apply_edits(session: &mut Session, args: &RenderArgs) -> Result<()> {
    if let Some(path) = &args.state {
        let json = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        session.replace_state(EditState::from_json(&json)?, "Load edit state");
    }
    if let Some(name) = &args.preset {
        let preset = find_builtin(name)?.ok_or_else(|| eyre!("unknown preset {name:?}"))?;
        tracing::info!(preset = %preset.name, "applying preset");
        session.apply_preset(&preset.adjustments);
    }
    if let Some(path) = &args.adjust {
        let json = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        session.apply_preset(&PartialAdjustments::from_json(&json)?);
    }
    Ok(())
}

pub fn run(args: &RenderArgs) -> Result<()> {
    let mut session = Session::new(args.config.engine_config());
    session
        .import_image(&args.input)
        .wrap_err_with(|| format!("loading {}", args.input.display()))?;
    apply_edits(&mut session, args)?;

    let mut renderer = select_renderer(session.config());
    tracing::info!(mode = %renderer.mode(), "renderer selected");

    let result = if args.preview {
        session
            .bind_preview(renderer.as_mut())
            .and_then(|()| session.render_preview(renderer.as_mut(), args.seed))
    } else {
        session.export(renderer.as_mut(), args.seed)
    };
    renderer.release();
    let image = result?;

    image
        .save(&args.output)
        .wrap_err_with(|| format!("writing {}", args.output.display()))?;
    tracing::info!(
        width = image.width,
        height = image.height,
        "wrote {}",
        args.output.display()
    );

    if let Some(path) = &args.save_state {
        std::fs::write(path, session.edit_state().to_json()?)
            .wrap_err_with(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
