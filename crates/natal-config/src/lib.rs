use anyhow::Context;
use natal::{Body, ChartOptions, Gazetteer, HouseSystem, LotFormula, Place, TimezoneId};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Relative locations tried for `configs/natal.toml`, from the workspace root
/// and from a crate directory.
pub const CONFIG_PATHS: [&str; 2] = ["configs/natal.toml", "../../configs/natal.toml"];

/// Settings loaded from `natal.toml`.
#[derive(Debug, Clone, Default)]
pub struct NatalConfig {
    pub chart: ChartOptions,
    /// Swiss Ephemeris data directory
    pub ephemeris_path: Option<PathBuf>,
    /// JSON position table replayed instead of a live ephemeris
    pub positions_file: Option<PathBuf>,
    pub places: Vec<Place>,
    /// Directory the config was read from; relative paths resolve against it
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChartToml {
    #[serde(default)]
    house_system: Option<String>,
    #[serde(default)]
    lot_formula: Option<String>,
    #[serde(default)]
    bodies: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EphemerisToml {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    positions_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlaceToml {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default = "default_zone")]
    zone: String,
}

fn default_zone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    chart: Option<ChartToml>,
    #[serde(default)]
    ephemeris: Option<EphemerisToml>,
    #[serde(default)]
    places: Vec<PlaceToml>,
}

impl NatalConfig {
    pub fn gazetteer(&self) -> Gazetteer {
        Gazetteer::new(self.places.clone())
    }

    /// `positions_file`, resolved against the config directory when relative.
    pub fn positions_path(&self) -> Option<PathBuf> {
        self.positions_file.as_deref().map(|p| self.resolve(p))
    }

    pub fn ephemeris_dir(&self) -> Option<PathBuf> {
        self.ephemeris_path.as_deref().map(|p| self.resolve(p))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn chart_options(chart: ChartToml) -> anyhow::Result<ChartOptions> {
    let mut options = ChartOptions::default();
    if let Some(system) = chart.house_system {
        options.house_system = system
            .parse::<HouseSystem>()
            .with_context(|| "chart.house_system")?;
    }
    if let Some(formula) = chart.lot_formula {
        options.lot_formula = formula
            .parse::<LotFormula>()
            .map_err(|e| anyhow::anyhow!("chart.lot_formula: {e}"))?;
    }
    if let Some(bodies) = chart.bodies {
        let mut parsed = Vec::with_capacity(bodies.len());
        for name in &bodies {
            let body = name.parse::<Body>().with_context(|| "chart.bodies")?;
            if !parsed.contains(&body) {
                parsed.push(body);
            }
        }
        if parsed.is_empty() {
            anyhow::bail!("chart.bodies is empty; list at least one body or omit the key");
        }
        options.bodies = parsed;
    }
    Ok(options)
}

fn place(entry: PlaceToml) -> anyhow::Result<Place> {
    if entry.name.trim().is_empty() {
        anyhow::bail!("places entry with empty name");
    }
    natal::GeoPosition::new(entry.latitude, entry.longitude)
        .with_context(|| format!("place {:?}", entry.name))?;
    Ok(Place {
        name: entry.name,
        latitude: entry.latitude,
        longitude: entry.longitude,
        zone: TimezoneId::new(entry.zone),
    })
}

/// Parse and validate the text of a `natal.toml`.
pub fn parse_config(text: &str) -> anyhow::Result<NatalConfig> {
    let root: RootConfigToml =
        toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse natal.toml: {e}"))?;

    let chart = chart_options(root.chart.unwrap_or_default())?;
    let ephemeris = root.ephemeris.unwrap_or_default();
    let places = root
        .places
        .into_iter()
        .map(place)
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(NatalConfig {
        chart,
        ephemeris_path: ephemeris.path,
        positions_file: ephemeris.positions_file,
        places,
        base_dir: None,
    })
}

pub fn load_config_from(path: &Path) -> anyhow::Result<NatalConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Could not read config {}", path.display()))?;
    let mut config = parse_config(&text).with_context(|| format!("in {}", path.display()))?;
    config.base_dir = path.parent().map(Path::to_path_buf);
    log::debug!(
        "loaded {} with {} places, house system {}",
        path.display(),
        config.places.len(),
        config.chart.house_system
    );
    Ok(config)
}

/// Try the common relative paths for `configs/natal.toml`.
pub fn load_config() -> anyhow::Result<NatalConfig> {
    for p in &CONFIG_PATHS {
        let path = Path::new(p);
        if path.is_file() {
            return load_config_from(path);
        }
    }
    anyhow::bail!("Could not load natal.toml from {:?}", CONFIG_PATHS);
}

/// An explicit path must exist. Without one a missing file means defaults.
pub fn load_config_or_default(path: Option<&Path>) -> anyhow::Result<NatalConfig> {
    match path {
        Some(path) => load_config_from(path),
        None if CONFIG_PATHS.iter().any(|p| Path::new(p).is_file()) => load_config(),
        None => {
            log::info!("no natal.toml found, using default chart options");
            Ok(NatalConfig::default())
        }
    }
}
