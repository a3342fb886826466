//! Coordinate reference system identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A coordinate reference system identified by its EPSG code.
///
/// The projection crate turns the code into actual projection math; to
/// everything else a `Crs` is an opaque, comparable tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Crs {
    epsg: u16,
}

impl Crs {
    /// WGS84 geographic (lon/lat in decimal degrees).
    pub const WGS84: Crs = Crs { epsg: 4326 };

    /// Web Mercator.
    pub const WEB_MERCATOR: Crs = Crs { epsg: 3857 };

    pub const fn from_epsg(epsg: u16) -> Self {
        Self { epsg }
    }

    pub fn epsg(&self) -> u16 {
        self.epsg
    }
}

impl Default for Crs {
    fn default() -> Self {
        Crs::WGS84
    }
}

impl FromStr for Crs {
    type Err = CrsParseError;

    /// Accepts `EPSG:4326`, `epsg:4326`, a bare `4326`, and `CRS:84`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        if normalized == "CRS:84" {
            return Ok(Crs::WGS84);
        }

        let code = normalized.strip_prefix("EPSG:").unwrap_or(&normalized);
        code.parse::<u16>()
            .map(Crs::from_epsg)
            .map_err(|_| CrsParseError::Unrecognized(s.to_string()))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

impl Serialize for Crs {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Crs {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unrecognized CRS: {0}. Expected 'EPSG:<code>'")]
    Unrecognized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!("EPSG:4326".parse::<Crs>().unwrap(), Crs::WGS84);
        assert_eq!("epsg:3857".parse::<Crs>().unwrap(), Crs::WEB_MERCATOR);
        assert_eq!("32633".parse::<Crs>().unwrap(), Crs::from_epsg(32633));
        assert_eq!("CRS:84".parse::<Crs>().unwrap(), Crs::WGS84);
        assert_eq!(" EPSG:4326 ".parse::<Crs>().unwrap(), Crs::WGS84);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("EPSG:".parse::<Crs>().is_err());
        assert!("WGS84".parse::<Crs>().is_err());
        assert!("EPSG:99999999".parse::<Crs>().is_err());
    }

    #[test]
    fn test_display_and_serde() {
        let crs = Crs::from_epsg(32633);
        assert_eq!(crs.to_string(), "EPSG:32633");

        let json = serde_json::to_string(&crs).unwrap();
        assert_eq!(json, "\"EPSG:32633\"");
        let back: Crs = serde_json::from_str(&json).unwrap();
        assert_eq!(back, crs);
    }
}
