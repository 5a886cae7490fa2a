use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pedigree_sandwich::{
    config::Config,
    graph::PedigreeGraph,
    loader::PedigreeLoader,
    orchestrator::{OrchestratorConfig, PedigreeOrchestrator},
    pedigree::PedigreeBuilder,
    reports::{OutputFormat, ReportGenerator},
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pedigree-sandwich")]
#[command(about = "Pedigree layout through bounded-degree interval graph sandwiches")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a layout for every pedigree of an input file
    Solve {
        /// Pedigree file (.ped, .txt or .csv)
        input: PathBuf,

        /// Output format (json, markdown, text)
        #[arg(short, long)]
        output: Option<String>,

        /// Output file path (defaults to stdout)
        #[arg(short = 'f', long)]
        output_file: Option<PathBuf>,
    },

    /// Load and build pedigrees without solving them
    Validate {
        /// Pedigree file (.ped, .txt or .csv)
        input: PathBuf,
    },

    /// Initialize configuration file
    Init {
        /// Configuration file path
        #[arg(short, long, default_value = "pedigree-sandwich.yml")]
        config_file: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Solve {
            input,
            output,
            output_file,
        } => {
            let config = load_config(cli.config.as_deref()).await?;
            solve(input, output, output_file, config).await?;
        }

        Commands::Validate { input } => {
            validate(input)?;
        }

        Commands::Init { config_file, force } => {
            init_config(config_file, force).await?;
        }
    }

    Ok(())
}

/// Initialize tracing with the specified log level
fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .context("Failed to create env filter")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();

    Ok(())
}

/// Environment settings, overridden by the configuration file when one is given
async fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::load_from_env()?;

    if let Some(path) = config_path {
        if path.exists() {
            info!("Loading configuration from: {:?}", path);
            config.merge_with(Config::load_from_file(path).await?);
        } else {
            warn!("Configuration file not found: {:?}. Using defaults.", path);
        }
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn solve(
    input: PathBuf,
    output_format: Option<String>,
    output_file: Option<PathBuf>,
    config: Config,
) -> Result<()> {
    info!("Solving pedigrees from {:?}", input);

    let format = match output_format {
        Some(format) => format.parse::<OutputFormat>()?,
        None => config.output.format,
    };

    let loader = PedigreeLoader::new(&input)?;
    debug!("Reading {:?} as {:?} input", input, loader.format());
    let rows = loader.load_rows()?;
    let families = PedigreeBuilder::build(rows)
        .with_context(|| format!("Failed to build pedigrees from {:?}", input))?;

    let orchestrator = PedigreeOrchestrator::new(OrchestratorConfig::from(&config));
    let reports = orchestrator.solve_families(families).await?;

    let unsolved = reports.iter().filter(|report| !report.is_realized()).count();
    if unsolved > 0 {
        warn!("{} of {} pedigrees have no layout", unsolved, reports.len());
    }

    let content = ReportGenerator::new(config.output.include_intervals).generate(&reports, format)?;

    if let Some(file_path) = output_file {
        tokio::fs::write(&file_path, &content)
            .await
            .with_context(|| format!("Failed to write output to: {:?}", file_path))?;
        info!("Report written to: {:?}", file_path);
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn validate(input: PathBuf) -> Result<()> {
    info!("Validating pedigrees from {:?}", input);

    let rows = PedigreeLoader::new(&input)?.load_rows()?;
    let families = match PedigreeBuilder::build(rows) {
        Ok(families) => families,
        Err(e) => {
            error!("Pedigree validation failed: {}", e);
            println!("Invalid pedigree: {}", e);
            std::process::exit(1);
        }
    };

    for family in &families {
        let graph = PedigreeGraph::build(family);
        let mandatory = graph.mandatory_graph();

        println!("Pedigree {}", family.pedigree_id());
        println!(
            "  Individuals: {}  Mating units: {}  Sibship units: {}",
            family.individual_count(),
            family.mating_unit_count(),
            family.sibship_unit_count()
        );
        if let (Some(min), Some(max)) = (family.min_generation_rank(), family.max_generation_rank()) {
            println!("  Generations: {} to {}", min, max);
        }
        println!(
            "  Mandatory edges: {}  Forbidden edges: {}  Components: {}",
            mandatory.edge_count(),
            graph.forbidden_edges().len(),
            mandatory.component_count()
        );
    }

    info!("Validated {} pedigrees", families.len());
    Ok(())
}

/// Initialize configuration file
async fn init_config(config_file: PathBuf, force: bool) -> Result<()> {
    info!("Initializing configuration file: {:?}", config_file);

    if config_file.exists() && !force {
        warn!("Configuration file already exists: {:?}", config_file);
        println!("Configuration file already exists, use --force to overwrite it.");
        return Ok(());
    }

    Config::default()
        .save_to_file(&config_file)
        .await
        .with_context(|| format!("Failed to write configuration file: {:?}", config_file))?;

    info!("Configuration file created successfully: {:?}", config_file);
    println!("Configuration file created: {:?}", config_file);

    Ok(())
}
