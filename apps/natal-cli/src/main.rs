use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use natal::{
    ChartAssembler, ChartOptions, ChartRequest, ChartService, CivilDateTime, EphemerisAdapter,
    GeoPosition, HouseSystem, Instant, LotFormula, NatalChart, TableEphemeris, TimezoneId,
    TzZoneRules,
};
use natal_config::NatalConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Natal chart calculator")]
struct Cli {
    /// Config file (default: configs/natal.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cast a chart and print it as JSON.
    Chart(ChartArgs),
    /// List the places known to the configured gazetteer.
    Places,
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// Birth date, YYYY-MM-DD.
    #[arg(long)]
    date: String,

    /// Local birth time, HH:MM (24 h).
    #[arg(long)]
    time: String,

    /// Place name looked up in the configured places.
    #[arg(long, conflicts_with_all = ["lat", "lon", "offset"])]
    place: Option<String>,

    /// Latitude in degrees, north positive.
    #[arg(long, allow_hyphen_values = true, requires_all = ["lon", "offset"])]
    lat: Option<f64>,

    /// Longitude in degrees, east positive.
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// Zone of the local time: a UTC offset (+02:00, UTC-5) or an IANA
    /// name (Europe/Paris).
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    offset: Option<String>,

    /// JSON position table (overrides [ephemeris].positions_file).
    #[arg(long)]
    positions: Option<PathBuf>,

    /// House system override, e.g. whole_sign or placidus.
    #[arg(long)]
    house_system: Option<HouseSystem>,

    /// Lot formula override: sect_aware or day_only.
    #[arg(long)]
    lot_formula: Option<LotFormula>,

    /// Seconds to wait for place and timezone lookups.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn table_ephemeris(path: &Path) -> anyhow::Result<Arc<dyn EphemerisAdapter>> {
    let table = TableEphemeris::from_path(path)
        .with_context(|| format!("Failed to load position table {}", path.display()))?;
    log::info!("using position table {}", path.display());
    Ok(Arc::new(table))
}

#[cfg(feature = "swisseph")]
fn live_ephemeris(config: &NatalConfig) -> anyhow::Result<Arc<dyn EphemerisAdapter>> {
    let adapter = natal::ephemeris::SwissEphemerisAdapter::new(config.ephemeris_dir())
        .context("Failed to initialize Swiss Ephemeris")?;
    log::info!("using Swiss Ephemeris at {}", adapter.ephemeris_path().display());
    Ok(Arc::new(adapter))
}

#[cfg(not(feature = "swisseph"))]
fn live_ephemeris(_config: &NatalConfig) -> anyhow::Result<Arc<dyn EphemerisAdapter>> {
    anyhow::bail!(
        "No ephemeris available: pass --positions, set [ephemeris].positions_file, \
         or build with --features swisseph"
    )
}

fn ephemeris(args: &ChartArgs, config: &NatalConfig) -> anyhow::Result<Arc<dyn EphemerisAdapter>> {
    match args.positions.clone().or_else(|| config.positions_path()) {
        Some(path) => table_ephemeris(&path),
        None => live_ephemeris(config),
    }
}

fn chart_options(args: &ChartArgs, config: &NatalConfig) -> ChartOptions {
    let mut options = config.chart.clone();
    if let Some(system) = args.house_system {
        options.house_system = system;
    }
    if let Some(formula) = args.lot_formula {
        options.lot_formula = formula;
    }
    options
}

async fn run_chart(args: ChartArgs, config: NatalConfig) -> anyhow::Result<NatalChart> {
    let ephemeris = ephemeris(&args, &config)?;
    let options = chart_options(&args, &config);

    if let Some(place) = &args.place {
        let gazetteer = Arc::new(config.gazetteer());
        let service = ChartService::new(
            gazetteer.clone(),
            gazetteer,
            Arc::new(TzZoneRules),
            ephemeris,
            options,
        )
        .with_timeout(Duration::from_secs(args.timeout_secs));
        let request = ChartRequest::new(&args.date, &args.time, place);
        return Ok(service.generate(&request).await?);
    }

    let (Some(lat), Some(lon), Some(zone)) = (args.lat, args.lon, args.offset.as_deref()) else {
        anyhow::bail!("Either --place or --lat, --lon and --offset are required");
    };
    let location = GeoPosition::new(lat, lon)?;
    let civil = CivilDateTime::parse(&args.date, &args.time)?;
    let instant = Instant::from_zone(&civil, &TimezoneId::new(zone), &TzZoneRules)
        .with_context(|| format!("Invalid --offset {zone:?}"))?;

    Ok(ChartAssembler::new(ephemeris.as_ref(), options).assemble(instant, location)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = natal_config::load_config_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Places => {
            for place in &config.places {
                println!(
                    "{:<24} {:>9.4} {:>10.4}  {}",
                    place.name, place.latitude, place.longitude, place.zone
                );
            }
        }
        Command::Chart(args) => {
            let pretty = args.pretty;
            let chart = run_chart(args, config).await?;
            for (field, err) in chart.failures() {
                log::warn!("{field}: {err}");
            }
            let json = if pretty {
                serde_json::to_string_pretty(&chart)?
            } else {
                serde_json::to_string(&chart)?
            };
            println!("{json}");
        }
    }
    Ok(())
}
