//! Per-tile summary statistics and their global aggregate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use soc_common::{SocError, SocResult};

use crate::tile::Tile;

/// Summary of one tile's valid pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Number of pixels that were neither nodata nor NaN.
    pub valid_count: usize,
}

impl TileStats {
    /// Scan a band. Pixels equal to `nodata` and NaN pixels are skipped.
    ///
    /// Returns `None` when no valid pixel remains.
    pub fn compute(values: &[f64], nodata: Option<f64>) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut valid_count = 0usize;

        for &value in values {
            if value.is_nan() || nodata == Some(value) {
                continue;
            }
            min = min.min(value);
            max = max.max(value);
            sum += value;
            valid_count += 1;
        }

        if valid_count == 0 {
            return None;
        }

        Some(Self {
            min,
            max,
            mean: sum / valid_count as f64,
            valid_count,
        })
    }
}

/// Statistics across every tile in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlobalStats {
    pub min_soc: f64,
    pub max_soc: f64,
    pub mean_soc: f64,
}

/// How per-tile means are combined into `mean_soc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeanPolicy {
    /// Sum of tile means divided by the number of tiles in the registry,
    /// including tiles without valid pixels.
    #[default]
    AllTiles,
    /// Sum of tile means divided by the number of tiles that have stats.
    ContributingTiles,
    /// Mean of all valid pixels, i.e. tile means weighted by pixel count.
    PixelWeighted,
}

impl FromStr for MeanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all-tiles" => Ok(MeanPolicy::AllTiles),
            "contributing-tiles" => Ok(MeanPolicy::ContributingTiles),
            "pixel-weighted" => Ok(MeanPolicy::PixelWeighted),
            other => Err(format!(
                "unknown mean policy '{}': expected all-tiles, contributing-tiles or pixel-weighted",
                other
            )),
        }
    }
}

impl fmt::Display for MeanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeanPolicy::AllTiles => "all-tiles",
            MeanPolicy::ContributingTiles => "contributing-tiles",
            MeanPolicy::PixelWeighted => "pixel-weighted",
        };
        f.write_str(name)
    }
}

/// Aggregate the cached statistics of `tiles`.
pub fn aggregate(tiles: &[Tile], policy: MeanPolicy) -> SocResult<GlobalStats> {
    aggregate_stats(tiles.iter().map(Tile::stats), policy)
}

/// Aggregate per-tile statistics; `None` entries are tiles without valid pixels.
///
/// Tiles without stats never contribute to min, max or the mean's numerator.
/// Whether they count toward the divisor depends on `policy`.
pub fn aggregate_stats<'a, I>(stats: I, policy: MeanPolicy) -> SocResult<GlobalStats>
where
    I: IntoIterator<Item = Option<&'a TileStats>>,
{
    let mut tile_count = 0usize;
    let mut present: Vec<&TileStats> = Vec::new();
    for entry in stats {
        tile_count += 1;
        if let Some(s) = entry {
            present.push(s);
        }
    }

    if present.is_empty() {
        return Err(SocError::Aggregation(format!(
            "none of the {} tiles has valid pixels",
            tile_count
        )));
    }

    let min_soc = present.iter().map(|s| s.min).fold(f64::INFINITY, f64::min);
    let max_soc = present
        .iter()
        .map(|s| s.max)
        .fold(f64::NEG_INFINITY, f64::max);

    // Sum in a fixed order so the result does not depend on registry order.
    present.sort_by(|a, b| {
        a.mean
            .total_cmp(&b.mean)
            .then(a.valid_count.cmp(&b.valid_count))
    });

    let mean_soc = match policy {
        MeanPolicy::AllTiles => {
            present.iter().map(|s| s.mean).sum::<f64>() / tile_count as f64
        }
        MeanPolicy::ContributingTiles => {
            present.iter().map(|s| s.mean).sum::<f64>() / present.len() as f64
        }
        MeanPolicy::PixelWeighted => {
            let pixels: usize = present.iter().map(|s| s.valid_count).sum();
            present
                .iter()
                .map(|s| s.mean * s.valid_count as f64)
                .sum::<f64>()
                / pixels as f64
        }
    };

    Ok(GlobalStats {
        min_soc,
        max_soc,
        mean_soc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(min: f64, max: f64, mean: f64, valid_count: usize) -> TileStats {
        TileStats {
            min,
            max,
            mean,
            valid_count,
        }
    }

    #[test]
    fn test_compute_skips_nodata_and_nan() {
        let s = TileStats::compute(&[1.0, -1.0, f64::NAN, 3.0, 5.0], Some(-1.0)).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.valid_count, 3);
    }

    #[test]
    fn test_compute_without_nodata_keeps_every_finite_pixel() {
        let s = TileStats::compute(&[-1.0, 1.0], None).unwrap();
        assert_eq!(s.min, -1.0);
        assert_eq!(s.mean, 0.0);
    }

    #[test]
    fn test_compute_all_invalid_is_none() {
        assert_eq!(TileStats::compute(&[-1.0, -1.0], Some(-1.0)), None);
        assert_eq!(TileStats::compute(&[f64::NAN], None), None);
        assert_eq!(TileStats::compute(&[], None), None);
    }

    #[test]
    fn test_unweighted_mean_of_means() {
        let a = stats(1.0, 3.0, 2.0, 100);
        let b = stats(2.0, 10.0, 6.0, 1);
        let global = aggregate_stats([Some(&a), Some(&b)], MeanPolicy::AllTiles).unwrap();
        assert_eq!(
            global,
            GlobalStats {
                min_soc: 1.0,
                max_soc: 10.0,
                mean_soc: 4.0
            }
        );
    }

    #[test]
    fn test_empty_tile_divisor_by_policy() {
        let normal = stats(2.0, 6.0, 4.0, 10);

        // The empty tile counts toward the divisor...
        let all = aggregate_stats([None, Some(&normal)], MeanPolicy::AllTiles).unwrap();
        assert_eq!(all.mean_soc, 2.0);

        // ...unless only contributing tiles are counted.
        let contributing =
            aggregate_stats([None, Some(&normal)], MeanPolicy::ContributingTiles).unwrap();
        assert_eq!(contributing.mean_soc, 4.0);

        // Min and max ignore the empty tile either way.
        assert_eq!(all.min_soc, 2.0);
        assert_eq!(all.max_soc, 6.0);
    }

    #[test]
    fn test_pixel_weighted_mean() {
        let a = stats(1.0, 3.0, 2.0, 3);
        let b = stats(2.0, 10.0, 6.0, 1);
        let global = aggregate_stats([Some(&a), Some(&b)], MeanPolicy::PixelWeighted).unwrap();
        assert_eq!(global.mean_soc, 3.0);
    }

    #[test]
    fn test_aggregate_is_order_invariant() {
        let tiles = [
            stats(0.1, 0.7, 0.3, 5),
            stats(1.0, 9.0, 4.4, 7),
            stats(-2.0, 3.0, 0.7, 2),
            stats(5.0, 5.0, 5.0, 1),
        ];
        let forward = aggregate_stats(tiles.iter().map(Some), MeanPolicy::AllTiles).unwrap();
        let reverse =
            aggregate_stats(tiles.iter().rev().map(Some), MeanPolicy::AllTiles).unwrap();
        let rotated = aggregate_stats(
            tiles.iter().cycle().skip(2).take(4).map(Some),
            MeanPolicy::AllTiles,
        )
        .unwrap();
        assert_eq!(forward, reverse);
        assert_eq!(forward, rotated);
    }

    #[test]
    fn test_all_empty_is_an_aggregation_error() {
        let err = aggregate_stats([None, None], MeanPolicy::AllTiles).unwrap_err();
        assert!(matches!(err, SocError::Aggregation(_)));

        let err = aggregate_stats(std::iter::empty(), MeanPolicy::AllTiles).unwrap_err();
        assert!(matches!(err, SocError::Aggregation(_)));
    }

    #[test]
    fn test_mean_policy_parse_and_display() {
        for policy in [
            MeanPolicy::AllTiles,
            MeanPolicy::ContributingTiles,
            MeanPolicy::PixelWeighted,
        ] {
            assert_eq!(policy.to_string().parse::<MeanPolicy>().unwrap(), policy);
        }
        assert!("weighted".parse::<MeanPolicy>().is_err());
        assert_eq!(MeanPolicy::default(), MeanPolicy::AllTiles);
    }

    #[test]
    fn test_global_stats_json_shape() {
        let global = GlobalStats {
            min_soc: 1.0,
            max_soc: 10.0,
            mean_soc: 4.0,
        };
        let json = serde_json::to_value(global).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"min_soc": 1.0, "max_soc": 10.0, "mean_soc": 4.0})
        );
        assert_eq!(
            serde_json::to_value(MeanPolicy::ContributingTiles).unwrap(),
            "contributing-tiles"
        );
    }
}
