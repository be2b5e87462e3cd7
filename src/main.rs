use anyhow::Context;
use chian_navi::config::AppConfig;
use chian_navi::data::load_dataset;
use chian_navi::lookup::AreaIndex;
use chian_navi::render::render_selection;
use chian_navi::stations::{Selection, STATIONS};
use chian_navi::server;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selectable stations
    Stations,
    /// Render the safety page for one station to an HTML file
    Render {
        #[arg(short, long)]
        station: String,
        /// Age bracket, e.g. 20代
        #[arg(short, long)]
        age: Option<String>,
        /// Gender, e.g. 女性
        #[arg(short, long)]
        gender: Option<String>,
        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Show the block and crime score at a coordinate
    Lookup {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Serve the interactive page
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Stations => {
            for station in STATIONS.iter() {
                println!("{}\t{}\t{:.6}\t{:.6}", station.name, station.ward, station.lat, station.lon);
            }
        }
        Commands::Render { station, age, gender, output } => {
            let app_config = AppConfig::load_from_file(&cli.config)?;
            let selection = Selection::parse(Some(station.as_str()), age.as_deref(), gender.as_deref())?;
            info!(station = selection.station.name, age = selection.age, gender = selection.gender, "rendering page");

            let page = render_selection(&app_config, &selection)?;
            match output {
                Some(path) => {
                    std::fs::write(path, page)
                        .with_context(|| format!("Failed to write page: {:?}", path))?;
                    info!(path = ?path, "page written");
                }
                None => println!("{page}"),
            }
        }
        Commands::Lookup { lat, lon } => {
            let app_config = AppConfig::load_from_file(&cli.config)?;
            let dataset = load_dataset(&app_config)?;
            let index = AreaIndex::build(&dataset.areas);
            match index.locate(&dataset.areas, *lat, *lon) {
                Some(area) => {
                    let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
                    println!("area:         {}", area.area_name.as_deref().unwrap_or("-"));
                    println!("crime total:  {}", show(area.score));
                    println!("linear score: {}", show(area.score_linear));
                    println!("log score:    {}", show(area.score_log));
                }
                None => println!("no block contains ({lat}, {lon})"),
            }
        }
        Commands::Serve => {
            let app_config = AppConfig::load_from_file(&cli.config)?;
            server::start_server(app_config).await?;
        }
    }

    Ok(())
}
