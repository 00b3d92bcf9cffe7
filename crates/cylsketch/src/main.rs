//! cylsketch: replay a sketch input script headlessly.
//!
//! Each frame of the script drives the camera and the drawing exactly as
//! live input would. Whenever a flatten completes, the unrolled drawing
//! is rendered and saved as the next `render<N>.png`.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin cylsketch -- [OPTIONS] <SCRIPT>
//! ```

mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cylsketch_core::{Session, SketchConfig};
use cylsketch_render::{
    RenderProgram, ResourceManager, SnapshotWriter, SoftwareRenderer, submit_frame,
};

/// Name the default program is cached under.
const PROGRAM_NAME: &str = "default";
const VERTEX_STAGE: &str = "programs/default.vertex.json";
const FRAGMENT_STAGE: &str = "programs/default.fragment.json";

/// Replay a sketch input script and save unrolled captures as PNG.
#[derive(Parser)]
#[command(name = "cylsketch", version)]
struct Cli {
    /// JSON replay script: an array of frame inputs with repeat counts.
    script: PathBuf,

    /// Directory snapshots are written to.
    #[arg(long, default_value = "renders")]
    renders: PathBuf,

    /// Resource root holding `programs/`. Defaults to the executable's
    /// directory.
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Render width in pixels.
    #[arg(long, default_value_t = 1920, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    width: u32,

    /// Render height in pixels.
    #[arg(long, default_value_t = 1080, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    height: u32,

    /// Cylinder radius (also the drawing distance).
    #[arg(long, default_value_t = SketchConfig::DEFAULT_RADIUS)]
    radius: f64,

    /// Height of the cylinder axis and the camera's home position.
    #[arg(long, default_value_t = SketchConfig::DEFAULT_AXIS_HEIGHT)]
    axis_height: f64,

    /// Degrees of turn per pixel of pointer motion.
    #[arg(long, default_value_t = SketchConfig::DEFAULT_MOUSE_SENSITIVITY)]
    mouse_sensitivity: f64,

    /// Full sketch config as a JSON string.
    ///
    /// When provided, the individual config flags are ignored. Missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Also save the final frame, whatever it shows.
    #[arg(long)]
    capture_last: bool,
}

fn config_from_cli(cli: &Cli) -> Result<SketchConfig> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).context("error parsing --config-json");
    }
    Ok(SketchConfig {
        radius: cli.radius,
        axis_height: cli.axis_height,
        mouse_sensitivity: cli.mouse_sensitivity,
        ..SketchConfig::default()
    })
}

fn resource_manager(cli: &Cli) -> ResourceManager {
    if let Some(dir) = &cli.resources {
        return ResourceManager::new(dir);
    }
    match std::env::current_exe() {
        Ok(exe) => ResourceManager::from_executable(&exe),
        Err(e) => {
            tracing::warn!("cannot locate executable ({e}); resolving resources from the working directory");
            ResourceManager::new(".")
        }
    }
}

/// Renders the session's current frame and writes it out. Write
/// failures are logged and the replay continues.
struct Capturer {
    renderer: SoftwareRenderer,
    program: Option<std::sync::Arc<RenderProgram>>,
    writer: SnapshotWriter,
    saved: usize,
}

impl Capturer {
    fn capture(&mut self, session: &Session) {
        let frame = session.render_frame(self.renderer.aspect());
        submit_frame(&mut self.renderer, &frame, self.program.as_deref());
        match self.writer.write(&self.renderer.to_image()) {
            Ok(_) => self.saved += 1,
            Err(e) => tracing::error!("snapshot not saved: {e}"),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config_from_cli(&cli)?;
    let mut session = Session::new(config).context("invalid sketch configuration")?;
    let steps = script::load(&cli.script)?;
    tracing::info!(
        "replaying {} steps ({} frames) from {}",
        steps.len(),
        script::frame_count(&steps),
        cli.script.display()
    );

    let mut resources = resource_manager(&cli);
    let program = resources.load_program(PROGRAM_NAME, VERTEX_STAGE, FRAGMENT_STAGE);
    if program.is_none() {
        tracing::warn!(
            "render program unavailable under {}; frames will be blank",
            resources.root().display()
        );
    }

    let renderer = SoftwareRenderer::new(cli.width, cli.height)
        .context("render target must have non-zero size")?;
    let mut capturer = Capturer {
        renderer,
        program,
        writer: SnapshotWriter::new(&cli.renders),
        saved: 0,
    };

    let mut frames = 0_u64;
    'replay: for step in &steps {
        for _ in 0..step.frames {
            let outcome = session.frame(&step.input);
            frames += 1;
            if outcome.capture {
                capturer.capture(&session);
            }
            if outcome.quit {
                tracing::info!("quit requested at frame {frames}");
                break 'replay;
            }
        }
    }

    if cli.capture_last {
        capturer.capture(&session);
    }

    tracing::info!(
        "ran {frames} frames, saved {} snapshots to {}",
        capturer.saved,
        capturer.writer.dir().display()
    );
    Ok(())
}
