//! Kit command-line driver
//!
//! # Commands
//!
//! - `kit seed <DIR>` - Write the sample catalogs and a `kit.ron` into DIR
//! - `kit inspect <PART>` - Show a definition's bounds and interfaces
//! - `kit gadget` - Build the sample gadget and print its bill of materials

mod sample;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use kit_core::{
    Camera, GeometryHost, MemoryHost, QUALIFIED_NAME_SEPARATOR, Scene, SceneError, Shot,
    ShotLog, Viewport, format_camera,
};

#[derive(Parser)]
#[command(name = "kit")]
#[command(about = "Build and inspect kit assemblies", long_about = None)]
#[command(version)]
struct Cli {
    /// Kit configuration file
    #[arg(long, global = true, default_value = "kit.ron")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the sample catalogs and configuration into a directory
    Seed {
        #[arg(name = "DIR")]
        dir: PathBuf,
    },

    /// Show a part definition
    Inspect {
        /// Qualified part name, e.g. "Contraptor::angle-6"
        #[arg(name = "PART")]
        part: String,
    },

    /// Build the sample gadget
    Gadget {
        /// Print the bill of materials as JSON
        #[arg(long)]
        json: bool,

        /// Directory for the step files of every shot taken
        #[arg(long)]
        shots: Option<PathBuf>,
    },
}

/// Viewport that only reports what it would render
struct LogViewport;

impl Viewport for LogViewport {
    fn capture(&mut self, host: &MemoryHost, shot: &Shot<'_>) -> Result<(), SceneError> {
        let subject = match shot.subject {
            Some(entity) => host.entity_name(entity)?,
            None => "whole scene".to_string(),
        };
        tracing::info!(
            "Capture {} ({}x{}) of {} from {:?}",
            shot.file_stem,
            shot.width,
            shot.height,
            subject,
            shot.view.eye
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kit_core=info,kit_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Seed { dir } => {
            sample::seed(&dir)?;
            println!("Sample kit written to {}", dir.display());
            Ok(())
        }
        Commands::Inspect { part } => inspect(&cli.config, &part),
        Commands::Gadget { json, shots } => gadget(&cli.config, json, shots.as_deref()),
    }
}

fn inspect(config: &Path, part: &str) -> Result<()> {
    let config = sample::load_config(config)?;
    let catalogs = sample::catalogs_from(&config);
    let Some((catalog, name)) = part.split_once(QUALIFIED_NAME_SEPARATOR) else {
        bail!("expected <catalog>{QUALIFIED_NAME_SEPARATOR}<part>, got '{part}'");
    };
    let definition = catalogs.definition_for(catalog, name)?;

    let mut host = MemoryHost::new();
    let component = host.instantiate_definition(&definition)?;
    let edges = host.interface_edges(component)?;

    println!("{}", definition.qualified_name());
    println!("  bounds: {} .. {}", definition.bounds.min, definition.bounds.max);
    println!("  interfaces: {}", edges.len());
    for (index, edge) in edges.iter().enumerate() {
        println!(
            "    [{index}] origin {} normal {} height {}",
            edge.placement.origin(),
            edge.placement.z_axis(),
            edge.length()
        );
    }
    Ok(())
}

fn gadget(config: &Path, json: bool, shots: Option<&Path>) -> Result<()> {
    let config = sample::load_config(config)?;
    let catalogs = sample::catalogs_from(&config);
    let mut scene = Scene::new(MemoryHost::new(), catalogs, config.clone());
    let mut camera = Camera::new("Gadget", &config.camera);
    let mut log = ShotLog::new();

    let gadget = sample::build_gadget(&mut scene, &mut camera, &mut LogViewport, &mut log)
        .context("building the gadget")?;

    let bom = scene.bom(gadget.assembly)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&bom)?);
    } else {
        println!("{} ({} parts)", bom.assembly_name, bom.total_parts());
        for item in &bom.items {
            println!("  {:>3} x {}", item.quantity, item.part);
        }
        println!();
        for id in [gadget.long_angle, gadget.short_angle] {
            println!("{}", scene.dump_placement(id)?);
        }
        println!("{}", format_camera(camera.view()));
    }

    if let Some(dir) = shots {
        log.write_to(dir)?;
        println!("{} steps written to {}", log.len(), dir.display());
    }
    Ok(())
}
