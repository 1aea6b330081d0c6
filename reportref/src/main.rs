use anyhow::{Context, Result};
use campusreport::reference::{self, Encoding, RegionIndex};
use campusreport::ReportConfig;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reportref")]
#[command(about = "Inspect the region and campus reference table")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Reference CSV file, overriding the configured path
    #[arg(short, long, value_name = "FILE")]
    reference: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List regions in file order
    Regions,
    /// List the campuses of one region
    Campuses {
        #[arg(value_name = "REGION")]
        region: String,
    },
    /// Summary counts of the table
    Stats,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[derive(Serialize)]
struct CampusList<'a> {
    region: &'a str,
    campuses: &'a [String],
    /// Select options as shown in the form, placeholder first
    options: Vec<String>,
}

#[derive(Serialize)]
struct ReferenceStats {
    path: String,
    encoding: &'static str,
    total_regions: usize,
    total_campuses: usize,
    file_size: u64,
    regions: Vec<RegionStats>,
}

#[derive(Serialize)]
struct RegionStats {
    name: String,
    campus_count: usize,
    percentage: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = ReportConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;
    let path = cli.reference.clone().unwrap_or(config.reference.path);
    let encoding = Encoding::parse(&config.reference.encoding).context("Invalid configuration")?;

    let index = reference::load(&path, encoding)
        .with_context(|| format!("Failed to load reference data from {}", path.display()))?;

    match &cli.command {
        Command::Regions => match cli.format {
            OutputFormat::Human => {
                println!("Regions:");
                for region in index.regions() {
                    println!("  {}", region);
                }
            }
            OutputFormat::Json => print_json(&index.regions())?,
        },
        Command::Campuses { region } => {
            let list = CampusList {
                region,
                campuses: index.campuses_for(region),
                options: index.campus_options(region),
            };
            match cli.format {
                OutputFormat::Human => print_campuses(&list),
                OutputFormat::Json => print_json(&list)?,
            }
        }
        Command::Stats => {
            let file_size = std::fs::metadata(&path)
                .with_context(|| "Failed to get file size")?
                .len();
            let stats = calculate_stats(&index, &path, encoding, file_size);
            match cli.format {
                OutputFormat::Human => print_stats(&stats),
                OutputFormat::Json => print_json(&stats)?,
            }
        }
    }

    Ok(())
}

fn calculate_stats(index: &RegionIndex, path: &Path, encoding: Encoding, file_size: u64) -> ReferenceStats {
    let total_campuses = index.campus_count();
    let regions = index
        .regions()
        .iter()
        .map(|region| {
            let campus_count = index.campuses_for(region).len();
            let percentage = if total_campuses > 0 {
                (campus_count as f64 / total_campuses as f64) * 100.0
            } else {
                0.0
            };
            RegionStats {
                name: region.clone(),
                campus_count,
                percentage,
            }
        })
        .collect();

    ReferenceStats {
        path: path.display().to_string(),
        encoding: encoding.as_str(),
        total_regions: index.region_count(),
        total_campuses,
        file_size,
        regions,
    }
}

fn print_campuses(list: &CampusList<'_>) {
    if list.campuses.is_empty() {
        println!("No campuses for region '{}'", list.region);
        return;
    }
    println!("Campuses of {}:", list.region);
    for campus in list.campuses {
        println!("  {}", campus);
    }
}

fn print_stats(stats: &ReferenceStats) {
    println!("Reference Statistics:");
    println!("  File: {} ({})", stats.path, stats.encoding);
    println!("  File Size: {} bytes", stats.file_size);
    println!("  Total Regions: {}", stats.total_regions);
    println!("  Total Campuses: {}", stats.total_campuses);

    if !stats.regions.is_empty() {
        println!("\nCampuses by Region:");
        for region in &stats.regions {
            println!(
                "  {}: {} campuses ({:.2}%)",
                region.name, region.campus_count, region.percentage
            );
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats() {
        let index = RegionIndex::from_pairs([
            ("North", "Alpha"),
            ("North", "Beta"),
            ("North", "Delta"),
            ("South", "Gamma"),
        ]);
        let stats = calculate_stats(&index, Path::new("campus.csv"), Encoding::Latin1, 64);

        assert_eq!(stats.total_regions, 2);
        assert_eq!(stats.total_campuses, 4);
        assert_eq!(stats.encoding, "ISO-8859-1");
        assert_eq!(stats.regions[0].campus_count, 3);
        assert_eq!(stats.regions[0].percentage, 75.0);
        assert_eq!(stats.regions[1].name, "South");
    }

    #[test]
    fn test_unknown_region_lists_placeholder_only() {
        let index = RegionIndex::from_pairs([("North", "Alpha")]);
        let list = CampusList {
            region: "East",
            campuses: index.campuses_for("East"),
            options: index.campus_options("East"),
        };
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["campuses"], serde_json::json!([]));
        assert_eq!(json["options"], serde_json::json!(["Select"]));
    }
}
