//! Headless session runner.
//!
//! Walks a player around a small loop for a number of in-game hours, offering
//! memories from the catalog along the way, then prints the closing narrative.
//!
//! ```bash
//! RUST_LOG=life_core=debug cargo run -p life_core --bin life_sim -- --hours 48
//! ```

use anyhow::Context;
use clap::Parser;
use life_core::{OfferOutcome, Passage, Session};
use life_rules::{DefinitionId, LifeConfig, MemoryCatalog, Position};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_CATALOG: &str = include_str!("../../assets/memories.toml");
const SECONDS_PER_HOUR: f32 = 3600.0;

#[derive(Parser)]
/// Command line arguments for the simulation.
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// TOML memory catalog; the bundled one is used otherwise
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// In-game hours to simulate before the ending
    #[arg(long, default_value_t = 24.0)]
    hours: f32,
    /// Real seconds per simulation step
    #[arg(long, default_value_t = 0.5)]
    step: f32,
    /// In-game hours between memory offers
    #[arg(long, default_value_t = 3.0)]
    offer_every: f32,
    /// Print the ending as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LifeConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => LifeConfig::default(),
    };
    let catalog = match &cli.catalog {
        Some(path) => MemoryCatalog::from_file(path)
            .with_context(|| format!("loading catalog from {}", path.display()))?,
        None => MemoryCatalog::from_toml_str(DEFAULT_CATALOG).context("parsing bundled catalog")?,
    };
    anyhow::ensure!(cli.step > 0.0, "step must be positive");

    let offers: Vec<_> = catalog.iter().map(|d| d.id.clone()).collect();
    let time_scale = config.clock.time_scale;
    let mut session = Session::new(config)?.with_catalog(catalog);

    let seconds_per_hour = SECONDS_PER_HOUR / time_scale;
    let total_steps = (cli.hours * seconds_per_hour / cli.step).ceil() as u64;
    let steps_per_offer = ((cli.offer_every * seconds_per_hour / cli.step).ceil() as u64).max(1);
    let mut pushes = 0;
    let mut next_offer = offers.iter().cycle().take(offers.len() * 2);

    info!(steps = total_steps, memories = offers.len(), "simulation started");
    for step in 1..=total_steps {
        let elapsed = step as f32 * cli.step;
        if session.step(cli.step, walk(elapsed)).is_some() {
            pushes += 1;
        }

        if step % steps_per_offer == 0 {
            if let Some(id) = next_offer.next() {
                offer(&mut session, id.clone());
            }
        }
    }

    session.begin_ending();
    let passages = session.compose_ending().to_vec();
    info!(
        held = session.store().used_slots(),
        echoes = session.echoes().echoes().len(),
        pushes,
        hours = session.clock().now().total_hours(),
        time = %session.clock().formatted(),
        "simulation finished"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&passages)?);
    } else {
        print_passages(&passages);
    }
    Ok(())
}

/// Offer a memory, letting go of the faintest one when every slot is taken.
fn offer(session: &mut Session, id: DefinitionId) {
    match session.offer_by_id(id.clone()) {
        OfferOutcome::ChoiceRequired => {
            let faintest = session.store().iter().min_by(|a, b| {
                a.weighted_presence()
                    .partial_cmp(&b.weighted_presence())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let (Some(faintest), Some(definition)) =
                (faintest.map(|r| r.id), session.catalog().get(&id))
            else {
                return;
            };
            let kept = session.replace(faintest, definition).is_some();
            info!(%id, kept, "memory offered with every slot taken");
        }
        outcome => info!(%id, ?outcome, "memory offered"),
    }
}

/// A slow loop around the origin, pausing at the quarter points.
fn walk(elapsed: f32) -> Position {
    const LAP_SECONDS: f32 = 120.0;
    const RADIUS: f32 = 12.0;
    let lap = (elapsed % LAP_SECONDS) / LAP_SECONDS;
    let quarter = (lap * 4.0).floor();
    let within = lap * 4.0 - quarter;
    // First half of every quarter is spent standing still.
    let progress = (quarter + ((within - 0.5).max(0.0) * 2.0)) / 4.0;
    let angle = progress * std::f32::consts::TAU;
    Position::new(RADIUS * angle.cos(), 0.0, RADIUS * angle.sin())
}

fn print_passages(passages: &[Passage]) {
    for passage in passages {
        println!("[{:?}, {:.1}s]", passage.kind, passage.display_seconds);
        println!("{}\n", passage.text);
    }
}
