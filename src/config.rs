//! Run configuration for the region-growing, flood-fill and consensus engines.
//!
//! All structs are plain data with sensible defaults so a pipeline stage can
//! deserialize them from whatever settings file it already reads.

use serde::{Deserialize, Serialize};

use crate::region_error::RegionError;

/// Limits applied by [`RegionGrow`](crate::algs::region_grow::RegionGrow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GrowConfig {
    /// Popped ids whose accumulated cost exceeds this are closed but never
    /// expanded. `None` means unbounded.
    pub max_cost: Option<f64>,
    /// Maximum elevation a step may lose (seen from the grower), i.e. the
    /// gain water would need to flow back towards the seed. `None` disables
    /// the monotonic-elevation rule.
    pub max_elevation_gain: Option<f64>,
}

impl GrowConfig {
    /// Reject NaN or negative limits.
    pub fn validate(&self) -> Result<(), RegionError> {
        if let Some(c) = self.max_cost {
            if c.is_nan() || c < 0.0 {
                return Err(RegionError::InvalidConfig(format!("max_cost = {c}")));
            }
        }
        if let Some(g) = self.max_elevation_gain {
            if g.is_nan() || g < 0.0 {
                return Err(RegionError::InvalidConfig(format!(
                    "max_elevation_gain = {g}"
                )));
            }
        }
        Ok(())
    }
}

/// Limits and weights for [`propagate`](crate::algs::consensus::propagate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Stop after this many sweeps even if the last one changed something.
    pub max_sweeps: Option<usize>,
    /// Per-label vote multiplier, indexed by label ordinal. Missing entries
    /// weigh `1.0`.
    pub label_weights: Option<Vec<f64>>,
}

impl ConsensusConfig {
    /// Vote weight of `label`.
    #[inline]
    pub fn weight(&self, label: usize) -> f64 {
        self.label_weights
            .as_ref()
            .and_then(|w| w.get(label).copied())
            .unwrap_or(1.0)
    }

    pub fn validate(&self) -> Result<(), RegionError> {
        if let Some(ws) = &self.label_weights {
            if let Some((i, w)) = ws
                .iter()
                .enumerate()
                .find(|(_, w)| !w.is_finite() || **w < 0.0)
            {
                return Err(RegionError::InvalidConfig(format!(
                    "label_weights[{i}] = {w}"
                )));
            }
        }
        Ok(())
    }
}

/// Frontier discipline for [`FloodFill`](crate::algs::flood_fill::FloodFill).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FloodOrder {
    /// Explicit bounded stack.
    #[default]
    DepthFirst,
    /// Explicit bounded ring queue.
    BreadthFirst,
}

/// Behaviour of the y axis of a [`GridTopology`](crate::topology::grid::GridTopology).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VerticalWrap {
    /// Crossing a pole mirrors the row and shifts `x` by half the width.
    #[default]
    PoleReflect,
    /// Rows wrap modulo the height (torus).
    Torus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_config_rejects_negative_cap() {
        let cfg = GrowConfig {
            max_cost: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(RegionError::InvalidConfig(_))));
        assert!(GrowConfig::default().validate().is_ok());
    }

    #[test]
    fn consensus_weight_defaults_to_one() {
        let cfg = ConsensusConfig {
            label_weights: Some(vec![2.0]),
            ..Default::default()
        };
        assert_eq!(cfg.weight(0), 2.0);
        assert_eq!(cfg.weight(5), 1.0);
    }

    #[test]
    fn configs_deserialize_with_missing_fields() {
        let cfg: GrowConfig = serde_json::from_str(r#"{"max_cost": 3.5}"#).unwrap();
        assert_eq!(cfg.max_cost, Some(3.5));
        assert_eq!(cfg.max_elevation_gain, None);
        let order: FloodOrder = serde_json::from_str(r#""BreadthFirst""#).unwrap();
        assert_eq!(order, FloodOrder::BreadthFirst);
    }
}
