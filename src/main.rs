use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use instant::Instant;

use deskpets::catalog::Catalog;
use deskpets::error::ConfigError;
use deskpets::platform;
use deskpets::render;
use deskpets::scheduler::Scheduler;
use deskpets::settings::{PetSpec, Settings};
use deskpets::sprite::{GifFrames, SizeBucket};

/// How long the main thread waits for a frame before re-checking for exit.
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "deskpets", version, about = "Desktop pets that walk, climb, and can be thrown around")]
struct Cli {
    /// Settings file (JSON). Every field is optional.
    #[arg(long, env = "DESKPETS_SETTINGS")]
    settings: Option<PathBuf>,

    /// State catalog (JSON)
    #[arg(long, env = "DESKPETS_CATALOG", default_value = "pets_data.json")]
    catalog: PathBuf,

    /// Directory asset paths in the catalog are relative to
    #[arg(long, env = "DESKPETS_ASSETS", default_value = ".")]
    assets: PathBuf,

    /// Pet to spawn as species:color (repeatable). Overrides the settings roster.
    #[arg(short, long = "pet", value_parser = PetSpec::parse)]
    pets: Vec<PetSpec>,

    /// Size bucket: very_small, small, original, medium, big, really_big
    #[arg(long)]
    size: Option<SizeBucket>,

    /// Base animation fps
    #[arg(long)]
    fps: Option<u32>,

    /// Seed for state selection, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Exit after this many seconds
    #[arg(long)]
    run_for: Option<f64>,
}

fn main() {
    env_logger::init();
    log::info!("DeskPets starting up");

    if let Err(e) = run(Cli::parse()) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> deskpets::Result<()> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(size) = cli.size {
        settings.size = size;
    }
    if let Some(fps) = cli.fps {
        settings.base_fps = fps;
    }
    if !cli.pets.is_empty() {
        settings.pets = cli.pets.clone();
    }
    settings.validate()?;

    let catalog = Arc::new(Catalog::load(&cli.catalog)?);
    if settings.pets.is_empty() {
        settings.pets = default_roster(&catalog);
    }

    let rng = match cli.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let (input, screen) = platform::native(&settings.screen);
    let (compositor, frames) = render::frame_queue(settings.frame_queue_depth);

    let mut scheduler = Scheduler::new(catalog, settings, Arc::new(GifFrames::new(&cli.assets)))
        .with_input(input)
        .with_screen(screen)
        .with_compositor(Box::new(compositor))
        .with_rng(Box::new(rng))
        .on_secondary_click(|req| {
            log::info!("Inbox requested by {}/{} ({:?})", req.species, req.color, req.agent);
        });

    if scheduler.spawn_roster() == 0 {
        return Err(ConfigError::invalid("no pets could be spawned").into());
    }
    let handle = scheduler.start()?;

    let started = Instant::now();
    let mut presented: u64 = 0;
    loop {
        if frames.recv_timeout(POLL_TIMEOUT).is_some() {
            presented += 1 + frames.drain().count() as u64;
        }

        // Poll ESC key (overlay never has keyboard focus)
        if platform::escape_pressed() {
            log::info!("ESC pressed, exiting");
            break;
        }
        if cli
            .run_for
            .is_some_and(|limit| started.elapsed().as_secs_f64() >= limit)
        {
            log::info!("Run time elapsed, exiting");
            break;
        }
    }

    handle.stop();
    log::info!(
        "Presented {presented} frames, dropped {}",
        frames.dropped()
    );
    Ok(())
}

/// First colour of every species in the catalog.
fn default_roster(catalog: &Catalog) -> Vec<PetSpec> {
    catalog
        .species()
        .filter_map(|species| {
            let color = catalog.colors(species).ok()?.first()?;
            Some(PetSpec::new(species, color.clone()))
        })
        .collect()
}
