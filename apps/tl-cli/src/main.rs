use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tl_graph::PhaseTable;
use tl_project::{ControllerFile, JunctionDef, ProjectResult, ValidationError, load};
use tracing::debug;

#[derive(Parser)]
#[command(name = "tl-cli")]
#[command(about = "Traffic-light controller CLI - inspect controller files and derived phases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a controller file and derive every junction's phases
    Validate {
        /// Path to the controller file (YAML, or JSON by extension)
        file: PathBuf,
    },
    /// List junctions in a controller file
    Junctions {
        /// Path to the controller file
        file: PathBuf,
    },
    /// Print the compatibility matrix and phase strings
    Phases {
        /// Path to the controller file
        file: PathBuf,
        /// Only this junction
        #[arg(short, long)]
        junction: Option<String>,
    },
}

fn main() -> ProjectResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Junctions { file } => cmd_junctions(&file),
        Commands::Phases { file, junction } => cmd_phases(&file, junction.as_deref()),
    }
}

fn cmd_validate(path: &Path) -> ProjectResult<()> {
    println!("Validating controller file: {}", path.display());
    let file = load(path)?;
    let registry = file.build_registry()?;
    println!("✓ Controller file is valid ({} junctions)", registry.len());
    Ok(())
}

fn cmd_junctions(path: &Path) -> ProjectResult<()> {
    let file = load(path)?;

    if file.junctions.is_empty() {
        println!("No junctions found in controller file");
    } else {
        println!("Junctions in {}:", file.name);
        for junction in &file.junctions {
            let table = junction.derive_phases()?;
            println!(
                "  {} ({} streams, {} signal heads, {:?})",
                junction.id,
                table.stream_count(),
                table.lane_index().incoming_count(),
                junction.resolution
            );
        }
    }
    Ok(())
}

fn cmd_phases(path: &Path, only: Option<&str>) -> ProjectResult<()> {
    let file = load(path)?;
    let selected = select(&file, only)?;

    for (n, junction) in selected.into_iter().enumerate() {
        if n > 0 {
            println!();
        }
        let table = junction.derive_phases()?;
        debug!(junction = %junction.id, phases = table.len(), "derived");
        println!("Junction {}", junction.id);
        print_table(&table);
    }
    Ok(())
}

fn select<'a>(
    file: &'a ControllerFile,
    only: Option<&str>,
) -> ProjectResult<Vec<&'a JunctionDef>> {
    match only {
        None => Ok(file.junctions.iter().collect()),
        Some(id) => file
            .junctions
            .iter()
            .find(|j| j.id == id)
            .map(|j| vec![j])
            .ok_or_else(|| {
                ValidationError::InvalidValue {
                    field: "--junction".to_string(),
                    value: id.to_string(),
                    reason: "no such junction in file".to_string(),
                }
                .into()
            }),
    }
}

fn print_table(table: &PhaseTable) {
    println!("  Streams:");
    for stream in table.streams() {
        println!(
            "    {:>3}  {} -> {} ({:?})",
            stream.index, stream.incoming_lane, stream.outgoing_lane, stream.direction
        );
    }

    println!("  Compatibility (L):");
    for (i, row) in table.compatibility().rows().enumerate() {
        let bits: String = row.iter().map(|&c| if c { '1' } else { '0' }).collect();
        println!("    {i:>3}  {bits}");
    }

    println!("  Phases:");
    for phase in table.phases() {
        let conflicts = table.conflicting_members(phase.index);
        if conflicts.is_empty() {
            println!("    {:>3}  {}", phase.index, phase.lights);
        } else {
            println!(
                "    {:>3}  {}  (conflicting members: {:?})",
                phase.index, phase.lights, conflicts
            );
        }
    }
}
