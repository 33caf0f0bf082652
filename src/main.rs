use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sector_scout::config::{get_config_path, load_config, validate_config, write_starter_config};
use sector_scout::output::{
    format_averages, format_explanation, format_json, format_ranked_table, format_ranked_tsv,
    format_score, format_score_map, indicator_label, named, should_use_colors,
};
use sector_scout::query::{explain_cell, score_map};
use sector_scout::{EngineError, EngineHandle, Mode, Query, QueryResponse};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_INVALID_ARGUMENT: i32 = 1;
const EXIT_DATA_LOAD: i32 = 2;
const EXIT_NOT_READY: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank provinces for a sector (Mod-1)
    Sector {
        /// Sector name (accents and case are ignored)
        name: String,
        /// How many provinces to show (defaults to output.top)
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// Rank sectors for a province (Mod-2)
    Province {
        /// Province name (accents, case and registered aliases are accepted)
        name: String,
        /// How many sectors to show (defaults to output.top)
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// Show the per-indicator breakdown of one province/sector score
    Explain { province: String, sector: String },
    /// Show every score for one sector or one province with its legend band
    Map {
        #[arg(long, conflicts_with = "province", required_unless_present = "province")]
        sector: Option<String>,
        #[arg(long)]
        province: Option<String>,
    },
    /// Average scores per sector and per province
    Summary {
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// List loaded names
    List {
        #[arg(value_enum)]
        what: ListKind,
    },
    /// Show dataset shapes
    Info,
    /// Write a starter config file
    Init {
        /// Where to write it (defaults to ~/.config/sector-scout/config.yaml)
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ListKind {
    Provinces,
    Sectors,
    Indicators,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "sector-scout")]
#[command(about = "Rank provinces for a sector and sectors for a province", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging. Repeat for more (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file (defaults to ~/.config/sector-scout/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Add a one-line narrative under each ranked row (table output only)
    #[arg(long, global = true)]
    narrative: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Serialize)]
struct Summary {
    sectors: Vec<(String, f64)>,
    provinces: Vec<(String, f64)>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }

    std::process::exit(EXIT_SUCCESS);
}

/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<EngineError>() {
        Some(EngineError::InvalidArgument(_)) => EXIT_INVALID_ARGUMENT,
        Some(EngineError::DataLoad(_)) => EXIT_DATA_LOAD,
        Some(EngineError::NotReady) => EXIT_NOT_READY,
        Some(EngineError::Configuration(_)) | None => EXIT_CONFIG,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        config: config_path,
        format,
        narrative,
        command,
        ..
    } = cli;

    // Init needs no existing config
    if let Commands::Init { path } = &command {
        let path = path.clone().unwrap_or_else(get_config_path);
        write_starter_config(&path)?;
        println!("Wrote starter config to {}", path.display());
        return Ok(());
    }

    let config = load_config(config_path)?;
    if let Err(errors) = validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let handle = EngineHandle::new();
    handle.initialize_from_paths(&config.data.source_paths(), config.effective_policy())?;

    let default_top = config.default_top();
    let reasons = config.reason_options();
    let use_colors = format == OutputFormat::Table && should_use_colors();

    match command {
        Commands::Sector { name, top } => {
            let query = Query {
                mode: Mode::SectorToProvince,
                subject: name,
                top_n: top.unwrap_or(default_top),
            };
            let response = handle.query(&query, &reasons)?;
            print_ranked(&response, format, use_colors, narrative)?;
        }
        Commands::Province { name, top } => {
            let query = Query {
                mode: Mode::ProvinceToSector,
                subject: name,
                top_n: top.unwrap_or(default_top),
            };
            let response = handle.query(&query, &reasons)?;
            print_ranked(&response, format, use_colors, narrative)?;
        }
        Commands::Explain { province, sector } => {
            let engine = handle.engine()?;
            let explanation = explain_cell(&engine, &province, &sector)?;
            match format {
                OutputFormat::Table => {
                    println!("{}", format_explanation(&explanation, use_colors))
                }
                OutputFormat::Tsv => {
                    for a in &explanation.attributions {
                        println!(
                            "{}\t{}\t{}\t{}\t{:.4}",
                            a.indicator,
                            a.weight,
                            format_score(a.normalized),
                            format_score(a.points),
                            a.share
                        );
                    }
                }
                OutputFormat::Json => println!("{}", format_json(&explanation)?),
            }
        }
        Commands::Map { sector, province } => {
            let (mode, subject) = match (sector, province) {
                (Some(sector), _) => (Mode::SectorToProvince, sector),
                (None, Some(province)) => (Mode::ProvinceToSector, province),
                (None, None) => {
                    return Err(EngineError::InvalidArgument(
                        "pass --sector or --province".to_string(),
                    )
                    .into())
                }
            };
            let engine = handle.engine()?;
            let map = score_map(&engine, mode, &subject)?;
            match format {
                OutputFormat::Table => println!("{}", format_score_map(&map, use_colors)),
                OutputFormat::Tsv => print_pairs_tsv(&map.scores),
                OutputFormat::Json => println!("{}", format_json(&map)?),
            }
        }
        Commands::Summary { top } => {
            let n = top.unwrap_or(default_top);
            if n == 0 {
                let err = EngineError::InvalidArgument("top-N must be at least 1".to_string());
                return Err(err.into());
            }
            let engine = handle.engine()?;
            let mut sector_avgs = engine.sector_averages();
            sector_avgs.truncate(n);
            let mut province_avgs = engine.province_averages();
            province_avgs.truncate(n);

            let summary = Summary {
                sectors: named(&sector_avgs, |s| engine.profile().sector_name(s).to_string()),
                provinces: named(&province_avgs, |p| {
                    engine.dataset().province_name(p).to_string()
                }),
            };
            match format {
                OutputFormat::Table => {
                    println!("{}", format_averages("Sector averages", &summary.sectors, use_colors));
                    println!();
                    println!(
                        "{}",
                        format_averages("Province averages", &summary.provinces, use_colors)
                    );
                }
                OutputFormat::Tsv => {
                    print_pairs_tsv(&summary.sectors);
                    print_pairs_tsv(&summary.provinces);
                }
                OutputFormat::Json => println!("{}", format_json(&summary)?),
            }
        }
        Commands::List { what } => {
            let engine = handle.engine()?;
            match what {
                ListKind::Provinces => print_names(engine.dataset().province_names(), format)?,
                ListKind::Sectors => print_names(engine.profile().sector_names(), format)?,
                ListKind::Indicators => {
                    let indicators = engine.dataset().indicators();
                    if format == OutputFormat::Json {
                        println!("{}", format_json(&indicators)?);
                    } else {
                        for indicator in indicators {
                            println!(
                                "{}\t{}\t{}",
                                indicator.id,
                                indicator.direction.as_str(),
                                indicator_label(&indicator.id, indicator.label.as_deref())
                            );
                        }
                    }
                }
            }
        }
        Commands::Info => {
            let engine = handle.engine()?;
            let shapes = engine.shapes();
            match format {
                OutputFormat::Json => println!("{}", format_json(&shapes)?),
                _ => {
                    println!("provinces:   {}", shapes.provinces);
                    println!("indicators:  {}", shapes.indicators);
                    println!("sectors:     {}", shapes.sectors);
                    println!("weight rows: {}", shapes.weight_rows);
                    println!("cells:       {}", shapes.cells);
                }
            }
        }
        Commands::Init { .. } => {}
    }

    Ok(())
}

fn print_ranked(
    response: &QueryResponse,
    format: OutputFormat,
    use_colors: bool,
    narrative: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => println!("{}", format_ranked_table(response, use_colors, narrative)),
        OutputFormat::Tsv => println!("{}", format_ranked_tsv(response)),
        OutputFormat::Json => println!("{}", format_json(response)?),
    }
    Ok(())
}

fn print_pairs_tsv(rows: &[(String, f64)]) {
    for (name, score) in rows {
        println!("{}\t{}", name, format_score(*score));
    }
}

fn print_names(names: &[String], format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", format_json(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}
