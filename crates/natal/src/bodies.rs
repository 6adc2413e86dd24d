use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The seven traditional planets tracked in a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
}

impl Body {
    pub const TRADITIONAL: [Body; 7] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown body: {0}. Valid bodies: sun, moon, mercury, venus, mars, jupiter, saturn")]
pub struct UnknownBody(pub String);

impl FromStr for Body {
    type Err = UnknownBody;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Body::TRADITIONAL
            .iter()
            .copied()
            .find(|b| b.name() == lower)
            .ok_or_else(|| UnknownBody(s.to_string()))
    }
}

/// A point placed in the chart: the ascendant, a planet, or a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartPoint {
    Ascendant,
    Body(Body),
    LotOfFortune,
    LotOfSpirit,
}

impl fmt::Display for ChartPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartPoint::Ascendant => f.write_str("ascendant"),
            ChartPoint::Body(body) => write!(f, "{}", body),
            ChartPoint::LotOfFortune => f.write_str("lot_of_fortune"),
            ChartPoint::LotOfSpirit => f.write_str("lot_of_spirit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body_case_insensitive() {
        assert_eq!("Mars".parse::<Body>().unwrap(), Body::Mars);
        assert_eq!(" saturn ".parse::<Body>().unwrap(), Body::Saturn);
        assert!("pluto".parse::<Body>().is_err());
    }
}
