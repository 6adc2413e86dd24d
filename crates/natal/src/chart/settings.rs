use crate::bodies::Body;
use crate::houses::HouseSystem;
use crate::western::LotFormula;
use serde::{Deserialize, Serialize};

/// Per-chart calculation choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub house_system: HouseSystem,
    pub lot_formula: LotFormula,
    /// Bodies requested from the ephemeris
    pub bodies: Vec<Body>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            house_system: HouseSystem::WholeSign,
            lot_formula: LotFormula::SectAware,
            bodies: Body::TRADITIONAL.to_vec(),
        }
    }
}
