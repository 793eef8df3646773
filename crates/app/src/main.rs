use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use clima_mandala_core::{
    provider::schema, render::svg::CAMERA_FALLBACK_BACKGROUND, AppConfig, CameraFeed,
    CameraStatus, ClimaMandalaError, FixedLocation, GeminiProvider, LocationSource,
    MandalaConfiguration, MandalaRenderer, NoCamera, NoGeolocation, Position, Recorder,
    RecordingSettings, Shell, Viewport, WeatherStats,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> clima_mandala_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Experience {
            lat,
            lng,
            config,
            out,
            frames,
            live_ms,
        } => {
            let position = lat.zip(lng).map(|(lat, lng)| Position::new(lat, lng));
            let config = AppConfig::load(config.as_deref())?;
            match position {
                Some(position) => {
                    run_experience(FixedLocation(position), config, out, frames, live_ms).await
                }
                None => run_experience(NoGeolocation, config, out, frames, live_ms).await,
            }
        }
        Commands::Render {
            mandala,
            width,
            height,
            out,
            frames,
            fps,
        } => run_render(&mandala, Viewport::new(width, height), out, frames, fps),
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&schema::response_schema())?);
            Ok(())
        }
    }
}

async fn run_experience<L: LocationSource>(
    location: L,
    config: AppConfig,
    out: Option<PathBuf>,
    frames: u32,
    live_ms: u64,
) -> clima_mandala_core::Result<()> {
    let provider = GeminiProvider::new(config.provider.clone())?;

    let mut camera = CameraFeed::new(NoCamera, config.camera.clone());
    let background = match camera.start().await {
        CameraStatus::Unavailable { title, hint } => {
            tracing::warn!(%title, %hint, "continuing without camera layer");
            Some(CAMERA_FALLBACK_BACKGROUND)
        }
        _ => None,
    };

    let shell = Shell::new(location, provider);
    let state = shell.start().await;
    let (Some(weather), Some(mandala)) = (&state.weather, &state.mandala) else {
        let message = state
            .error
            .unwrap_or_else(|| "session ended without a mandala".to_string());
        return Err(ClimaMandalaError::msg(message));
    };

    print!("{}", WeatherStats::new(weather, mandala));
    for source in shell.attribution() {
        let short: String = source.title.chars().take(12).collect();
        println!("  source: {short}... <{}>", source.uri);
    }

    let viewport = Viewport::new(config.render.width, config.render.height);
    let mut renderer = MandalaRenderer::new();

    if live_ms > 0 {
        if let Some(mut frames_rx) = renderer.present(mandala, viewport, config.render.frame_rate) {
            tokio::time::sleep(Duration::from_millis(live_ms)).await;
            let frame = frames_rx.borrow_and_update().clone();
            tracing::info!(
                elapsed_ms = frame.elapsed_ms,
                rotation_deg = frame.rotation_deg,
                "live animation preview"
            );
        }
    } else {
        renderer.mount(mandala, viewport);
    }

    if let (Some(out), Some(scene), Some(animator)) = (out, renderer.scene(), renderer.animator()) {
        let mut recorder = Recorder::new(RecordingSettings {
            output_dir: out,
            fps: config.render.frame_rate,
            frames,
        });
        if let Some(background) = background {
            recorder = recorder.with_background(background);
        }
        recorder.capture(scene, animator)?;
    }

    renderer.teardown();
    camera.stop();
    shell.reset();
    Ok(())
}

fn run_render(
    mandala: &PathBuf,
    viewport: Viewport,
    out: PathBuf,
    frames: u32,
    fps: u32,
) -> clima_mandala_core::Result<()> {
    tracing::info!(?mandala, ?out, "rendering mandala offline");

    let raw = std::fs::read_to_string(mandala)?;
    let config = MandalaConfiguration::from_json(&raw)?;
    if let Err(err) = config.validate() {
        tracing::warn!(error = %err, "configuration outside the expected ranges");
    }

    let mut renderer = MandalaRenderer::new();
    let scene = renderer.mount(&config, viewport).clone();
    let animator = renderer
        .animator()
        .cloned()
        .ok_or_else(|| ClimaMandalaError::msg("renderer has no animator after mount"))?;

    Recorder::new(RecordingSettings {
        output_dir: out,
        fps,
        frames,
    })
    .capture(&scene, &animator)?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Weather-driven mandala renderer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a full session: locate, ask the provider, render the mandala.
    Experience {
        /// Latitude in degrees. Without a position the session reports that
        /// geolocation is unavailable.
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude in degrees.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory that receives SVG frame snapshots.
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Number of frames to record.
        #[arg(long, default_value_t = 1)]
        frames: u32,
        /// Run the live animation timer for this many milliseconds.
        #[arg(long, default_value_t = 0)]
        live_ms: u64,
    },
    /// Render a mandala configuration file without contacting the provider.
    Render {
        /// Path to a JSON mandala configuration.
        mandala: PathBuf,
        /// Output directory for the SVG frames.
        out: PathBuf,
        #[arg(long, default_value_t = 1280.0)]
        width: f64,
        #[arg(long, default_value_t = 720.0)]
        height: f64,
        #[arg(long, default_value_t = 1)]
        frames: u32,
        #[arg(long, default_value_t = 30)]
        fps: u32,
    },
    /// Print the JSON schema the provider's structuring call must satisfy.
    Schema,
}
