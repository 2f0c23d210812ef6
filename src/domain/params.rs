//! Generation parameters and their validation.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::{ConfigurationError, ConfigurationResult};

/// Minimum number of children of every gate.
pub const MIN_CHILDREN: usize = 2;

/// Upper bound for `reuse_p` and `reuse_g`.
pub const MAX_REUSE: f64 = 0.9;

/// Raw generation parameters as given by the user.
///
/// Counts are signed so that negative input survives parsing and is reported by
/// [`TreeParams::validate`] instead of failing as a parse error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TreeParams {
    /// Name of the fault tree
    pub ft_name: String,
    /// Name of the root gate
    pub root: String,
    /// Seed of the random number generator
    pub seed: u64,
    /// Number of unique primary events
    pub nprimary: i64,
    /// Average number of children per gate
    pub nchildren: i64,
    /// Primary events to gates ratio per new node
    pub ratio: f64,
    /// Probability of reusing an existing primary event
    pub reuse_p: f64,
    /// Reserved gate reuse ratio, validated but not used by the builder
    pub reuse_g: f64,
    /// Maximum probability for primary events
    pub maxprob: f64,
    /// Minimum probability for primary events
    pub minprob: f64,
    /// Minimal number of primary events under the root
    pub ptop: i64,
    /// Fixed number of children of the root, 0 for unset
    pub ctop: i64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            ft_name: "Autogenerated".into(),
            root: "root".into(),
            seed: 123,
            nprimary: 10,
            nchildren: 3,
            ratio: 2.0,
            reuse_p: 0.1,
            reuse_g: 0.1,
            maxprob: 0.1,
            minprob: 0.001,
            ptop: 0,
            ctop: 0,
        }
    }
}

/// Validated parameters in the form the builder consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeShape {
    pub root: String,
    pub seed: u64,
    pub nprimary: usize,
    pub min_children: usize,
    pub max_children: usize,
    pub ratio: f64,
    pub reuse_p: f64,
    pub minprob: f64,
    pub maxprob: f64,
    pub ptop: usize,
    pub ctop: Option<usize>,
}

impl TreeShape {
    /// Probability that a new child is a gate rather than a primary event.
    pub fn gate_probability(&self) -> f64 {
        1.0 / (1.0 + self.ratio)
    }
}

impl TreeParams {
    /// Check every input constraint, stopping at the first violation.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> ConfigurationResult<TreeShape> {
        let floats = [
            ("ratio", self.ratio),
            ("minprob", self.minprob),
            ("maxprob", self.maxprob),
            ("reuse_p", self.reuse_p),
            ("reuse_g", self.reuse_g),
        ];
        for (param, value) in floats {
            if !value.is_finite() {
                return Err(ConfigurationError::NotFinite { param, value });
            }
        }

        let negatives = [
            ("ctop", self.ctop as f64),
            ("ptop", self.ptop as f64),
            ("ratio", self.ratio),
            ("nchildren", self.nchildren as f64),
            ("nprimary", self.nprimary as f64),
            ("minprob", self.minprob),
            ("maxprob", self.maxprob),
            ("reuse_p", self.reuse_p),
            ("reuse_g", self.reuse_g),
        ];
        for (param, value) in negatives {
            if value < 0.0 {
                return Err(ConfigurationError::Negative { param, value });
            }
        }

        let limits = [
            ("reuse_p", self.reuse_p, MAX_REUSE),
            ("reuse_g", self.reuse_g, MAX_REUSE),
            ("maxprob", self.maxprob, 1.0),
            ("minprob", self.minprob, 1.0),
        ];
        for (param, value, limit) in limits {
            if value > limit {
                return Err(ConfigurationError::AboveLimit { param, value, limit });
            }
        }

        if self.maxprob < self.minprob {
            return Err(ConfigurationError::ProbabilityRange {
                minprob: self.minprob,
                maxprob: self.maxprob,
            });
        }
        if self.ptop > self.nprimary {
            return Err(ConfigurationError::PtopExceedsPrimary {
                ptop: self.ptop,
                nprimary: self.nprimary,
            });
        }
        if self.ctop > 0 && self.ptop > self.ctop {
            return Err(ConfigurationError::PtopExceedsCtop {
                ptop: self.ptop,
                ctop: self.ctop,
            });
        }

        if self.nchildren < MIN_CHILDREN as i64 {
            return Err(ConfigurationError::BranchingTooSmall(self.nchildren));
        }
        if self.nprimary < MIN_CHILDREN as i64 {
            return Err(ConfigurationError::TooFewPrimary(self.nprimary));
        }
        if self.ratio == 0.0 {
            return Err(ConfigurationError::ZeroRatio);
        }
        if self.ctop == 1 {
            return Err(ConfigurationError::SingleChildRoot);
        }

        let nchildren = to_count("nchildren", self.nchildren)?;
        let shape = TreeShape {
            root: self.root.clone(),
            seed: self.seed,
            nprimary: to_count("nprimary", self.nprimary)?,
            min_children: MIN_CHILDREN,
            max_children: nchildren.saturating_mul(2) - MIN_CHILDREN,
            ratio: self.ratio,
            reuse_p: self.reuse_p,
            minprob: self.minprob,
            maxprob: self.maxprob,
            ptop: to_count("ptop", self.ptop)?,
            ctop: match self.ctop {
                0 => None,
                ctop => Some(to_count("ctop", ctop)?),
            },
        };
        debug!(?shape, "parameters validated");
        Ok(shape)
    }
}

fn to_count(param: &'static str, value: i64) -> ConfigurationResult<usize> {
    usize::try_from(value).map_err(|_| ConfigurationError::Negative {
        param,
        value: value as f64,
    })
}
