//! Simulation parameters.
//!
//! [`SimulationParameters`] mirrors the JSON config file consumed by the
//! harness (keys keep their historical spelling, e.g. `N_spins`).
//! [`RunParameters::derive`] validates it and attaches the analytic constants
//! of the chosen landscape model:
//!
//! | model | β_c | energetic threshold | entropic attractor |
//! |---|---|---|---|
//! | EREM | 1 | −ln(N)/β_c | ln((2β_c−β)/β_c)/(β−β_c), valid for β_c<β<2β_c |
//! | GREM | √(2 ln 2) | −√(2N ln N) | −Nβ/2 |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HdspinError, MAX_SPINS, Result};

/// Stored in place of the entropic attractor when it is undefined. Finite so
/// that the parameter record stays JSON-serializable.
pub const INVALID_ATTRACTOR: f64 = 1e16;

/// Largest accepted `log10_N_timesteps`; 10^18 still fits an `i64` step index.
pub const MAX_LOG10_TIMESTEPS: u32 = 18;

/// Quenched-disorder model of the energy landscape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandscapeModel {
    /// Exponential random energy model.
    #[serde(rename = "EREM")]
    Erem,
    /// Gaussian random energy model.
    #[serde(rename = "GREM")]
    Grem,
}

impl LandscapeModel {
    #[must_use]
    pub fn beta_critical(self) -> f64 {
        match self {
            Self::Erem => 1.0,
            Self::Grem => (2.0 * std::f64::consts::LN_2).sqrt(),
        }
    }

    /// Energy below which a configuration counts as inside a basin.
    #[must_use]
    pub fn energetic_threshold(self, n_spins: u32) -> f64 {
        let n = f64::from(n_spins);
        match self {
            Self::Erem => -n.ln() / self.beta_critical(),
            Self::Grem => -(2.0 * n * n.ln()).sqrt(),
        }
    }

    /// Entropic attractor energy, or `None` where the closed form is undefined
    /// (EREM outside β_c < β < 2β_c).
    #[must_use]
    pub fn entropic_attractor(self, n_spins: u32, beta: f64) -> Option<f64> {
        let bc = self.beta_critical();
        match self {
            Self::Erem => {
                if beta <= bc || beta >= 2.0 * bc {
                    return None;
                }
                Some(((2.0 * bc - beta) / bc).ln() / (beta - bc))
            }
            Self::Grem => Some(-f64::from(n_spins) * beta / 2.0),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Erem => "EREM",
            Self::Grem => "GREM",
        }
    }
}

impl FromStr for LandscapeModel {
    type Err = HdspinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "EREM" => Ok(Self::Erem),
            "GREM" => Ok(Self::Grem),
            _ => Err(HdspinError::UnknownLandscape(s.to_string())),
        }
    }
}

impl fmt::Display for LandscapeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested dynamics. `Auto` is resolved against the landscape storage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicsSelector {
    Gillespie,
    Standard,
    #[default]
    Auto,
}

/// Dynamics actually run by a tracer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dynamics {
    Gillespie,
    Standard,
}

impl DynamicsSelector {
    /// `Auto` picks the continuous-time engine only when every neighbor lookup
    /// hits the dense array; with a cache each step would miss up to N times.
    #[must_use]
    pub const fn resolve(self, dense_storage: bool) -> Dynamics {
        match self {
            Self::Gillespie => Dynamics::Gillespie,
            Self::Standard => Dynamics::Standard,
            Self::Auto if dense_storage => Dynamics::Gillespie,
            Self::Auto => Dynamics::Standard,
        }
    }
}

impl FromStr for DynamicsSelector {
    type Err = HdspinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gillespie" => Ok(Self::Gillespie),
            "standard" => Ok(Self::Standard),
            "auto" => Ok(Self::Auto),
            _ => Err(HdspinError::UnknownDynamics(s.to_string())),
        }
    }
}

impl fmt::Display for Dynamics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gillespie => "gillespie",
            Self::Standard => "standard",
        })
    }
}

fn default_dynamics() -> String {
    "auto".to_string()
}

const fn default_memory() -> u64 {
    1 << 25
}

const fn default_tracers() -> u32 {
    10
}

const fn default_grid_size() -> u32 {
    100
}

const fn default_dw() -> f64 {
    0.5
}

/// Raw parameter record as loaded from the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    #[serde(rename = "log10_N_timesteps")]
    pub log10_n_timesteps: u32,
    #[serde(rename = "N_spins")]
    pub n_spins: u32,
    pub landscape: String,
    pub beta: f64,
    #[serde(default = "default_dynamics")]
    pub dynamics: String,
    /// Memory budget in bytes for the landscape store.
    #[serde(default = "default_memory")]
    pub memory: u64,
    #[serde(
        default = "default_tracers",
        rename = "n_tracers_per_MPI_rank",
        alias = "n_tracers_per_batch"
    )]
    pub n_tracers: u32,
    /// 0 seeds every tracer from OS entropy.
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    /// Aging window offset: the second aging time is t_w·(1 + dw).
    #[serde(default = "default_dw")]
    pub dw: f64,
    #[serde(default)]
    pub calculate_inherent_structure_observables: bool,
}

impl SimulationParameters {
    /// Parameters with every optional field at its default.
    #[must_use]
    pub fn new(log10_n_timesteps: u32, n_spins: u32, landscape: &str, beta: f64) -> Self {
        Self {
            log10_n_timesteps,
            n_spins,
            landscape: landscape.to_string(),
            beta,
            dynamics: default_dynamics(),
            memory: default_memory(),
            n_tracers: default_tracers(),
            seed: 0,
            grid_size: default_grid_size(),
            dw: default_dw(),
            calculate_inherent_structure_observables: false,
        }
    }
}

/// Validated parameters plus everything derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunParameters {
    #[serde(rename = "log10_N_timesteps")]
    pub log10_n_timesteps: u32,
    #[serde(rename = "N_timesteps")]
    pub n_timesteps: u64,
    #[serde(rename = "N_spins")]
    pub n_spins: u32,
    pub landscape: LandscapeModel,
    pub beta: f64,
    pub beta_critical: f64,
    pub dynamics: DynamicsSelector,
    pub memory: u64,
    pub energetic_threshold: f64,
    pub entropic_attractor: f64,
    pub valid_entropic_attractor: bool,
    pub grid_size: u32,
    pub dw: f64,
    #[serde(rename = "n_tracers_per_MPI_rank")]
    pub n_tracers: u32,
    pub use_manual_seed: bool,
    pub seed: u64,
    pub calculate_inherent_structure_observables: bool,
    #[serde(rename = "PRECISON")]
    pub precision: u32,
}

impl RunParameters {
    pub fn derive(p: &SimulationParameters) -> Result<Self> {
        let landscape: LandscapeModel = p.landscape.parse()?;
        let dynamics: DynamicsSelector = p.dynamics.parse()?;

        if p.n_spins == 0 {
            return Err(HdspinError::invalid("N_spins", "must be at least 1"));
        }
        if p.n_spins > MAX_SPINS {
            return Err(HdspinError::TooManySpins {
                n_spins: p.n_spins,
                max: MAX_SPINS,
            });
        }
        if !p.beta.is_finite() || p.beta <= 0.0 {
            return Err(HdspinError::invalid(
                "beta",
                format!("must be finite and positive, got {}", p.beta),
            ));
        }
        if p.log10_n_timesteps > MAX_LOG10_TIMESTEPS {
            return Err(HdspinError::invalid(
                "log10_N_timesteps",
                format!("must be at most {MAX_LOG10_TIMESTEPS}"),
            ));
        }
        if p.grid_size == 0 {
            return Err(HdspinError::invalid("grid_size", "must be at least 1"));
        }
        if !p.dw.is_finite() || p.dw < 0.0 {
            return Err(HdspinError::invalid(
                "dw",
                format!("must be finite and non-negative, got {}", p.dw),
            ));
        }
        if p.memory == 0 {
            return Err(HdspinError::invalid("memory", "budget must be non-zero"));
        }

        let attractor = landscape.entropic_attractor(p.n_spins, p.beta);
        Ok(Self {
            log10_n_timesteps: p.log10_n_timesteps,
            n_timesteps: 10u64.pow(p.log10_n_timesteps),
            n_spins: p.n_spins,
            landscape,
            beta: p.beta,
            beta_critical: landscape.beta_critical(),
            dynamics,
            memory: p.memory,
            energetic_threshold: landscape.energetic_threshold(p.n_spins),
            entropic_attractor: attractor.unwrap_or(INVALID_ATTRACTOR),
            valid_entropic_attractor: attractor.is_some(),
            grid_size: p.grid_size,
            dw: p.dw,
            n_tracers: p.n_tracers,
            use_manual_seed: p.seed > 0,
            seed: p.seed,
            calculate_inherent_structure_observables: p.calculate_inherent_structure_observables,
            precision: MAX_SPINS,
        })
    }

    /// Basin thresholds handed to the recorders.
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            energetic: self.energetic_threshold,
            entropic: self
                .valid_entropic_attractor
                .then_some(self.entropic_attractor),
        }
    }

    /// Seed for tracer `index`, or `None` when it must come from entropy.
    #[must_use]
    pub fn manual_tracer_seed(&self, index: u32) -> Option<u64> {
        self.use_manual_seed
            .then(|| self.seed.wrapping_add(u64::from(index)))
    }
}

/// Energy thresholds separating basins from ridges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub energetic: f64,
    /// Absent when the entropic attractor is undefined for these parameters.
    pub entropic: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erem_constants() {
        let mut p = SimulationParameters::new(3, 10, "EREM", 1.5);
        let rp = RunParameters::derive(&p).unwrap();
        assert_eq!(rp.beta_critical, 1.0);
        assert!((rp.energetic_threshold + 10f64.ln()).abs() < 1e-12);
        let expected = (0.5f64).ln() / 0.5;
        assert!((rp.entropic_attractor - expected).abs() < 1e-12);
        assert!(rp.valid_entropic_attractor);
        assert_eq!(rp.n_timesteps, 1000);

        // 2 < 2β_c fails at β = 2: the log argument is zero.
        p.beta = 2.0;
        let rp = RunParameters::derive(&p).unwrap();
        assert!((rp.energetic_threshold + 10f64.ln()).abs() < 1e-12);
        assert!(!rp.valid_entropic_attractor);
        assert_eq!(rp.entropic_attractor, INVALID_ATTRACTOR);
        assert_eq!(rp.thresholds().entropic, None);

        p.beta = 0.9;
        assert!(!RunParameters::derive(&p).unwrap().valid_entropic_attractor);
    }

    #[test]
    fn grem_constants() {
        let p = SimulationParameters::new(2, 16, "GREM", 2.0);
        let rp = RunParameters::derive(&p).unwrap();
        assert!((rp.beta_critical - 1.1774).abs() < 1e-4);
        assert!((rp.beta_critical - 1.177_410_022_515_475).abs() < 1e-12);
        assert!((rp.energetic_threshold + (32.0 * 16f64.ln()).sqrt()).abs() < 1e-12);
        assert!((rp.entropic_attractor + 16.0).abs() < 1e-12);
        assert!(rp.valid_entropic_attractor);
    }

    #[test]
    fn selectors_parse_case_insensitively() {
        assert_eq!("erem".parse::<LandscapeModel>().unwrap(), LandscapeModel::Erem);
        assert_eq!("GREM".parse::<LandscapeModel>().unwrap(), LandscapeModel::Grem);
        assert!(matches!(
            "SK".parse::<LandscapeModel>(),
            Err(HdspinError::UnknownLandscape(_))
        ));
        assert_eq!(
            "Gillespie".parse::<DynamicsSelector>().unwrap(),
            DynamicsSelector::Gillespie
        );
        assert!("metropolis".parse::<DynamicsSelector>().is_err());
    }

    #[test]
    fn auto_dynamics_follows_storage() {
        assert_eq!(DynamicsSelector::Auto.resolve(true), Dynamics::Gillespie);
        assert_eq!(DynamicsSelector::Auto.resolve(false), Dynamics::Standard);
        assert_eq!(DynamicsSelector::Standard.resolve(true), Dynamics::Standard);
    }

    #[test]
    fn validation_rejects_bad_input() {
        let base = SimulationParameters::new(3, 10, "EREM", 1.5);

        let mut p = base.clone();
        p.n_spins = 129;
        assert!(matches!(
            RunParameters::derive(&p),
            Err(HdspinError::TooManySpins { n_spins: 129, .. })
        ));

        let mut p = base.clone();
        p.landscape = "REM".into();
        assert!(matches!(
            RunParameters::derive(&p),
            Err(HdspinError::UnknownLandscape(_))
        ));

        let mut p = base.clone();
        p.beta = f64::NAN;
        assert!(RunParameters::derive(&p).is_err());

        let mut p = base.clone();
        p.n_spins = 0;
        assert!(RunParameters::derive(&p).is_err());

        let mut p = base;
        p.log10_n_timesteps = 19;
        assert!(RunParameters::derive(&p).is_err());
    }

    #[test]
    fn config_json_uses_historical_keys() {
        let json = r#"{
            "log10_N_timesteps": 4,
            "N_spins": 12,
            "landscape": "EREM",
            "beta": 1.5,
            "n_tracers_per_MPI_rank": 3,
            "seed": 7
        }"#;
        let p: SimulationParameters = serde_json::from_str(json).unwrap();
        assert_eq!(p.n_spins, 12);
        assert_eq!(p.n_tracers, 3);
        assert_eq!(p.dynamics, "auto");
        assert_eq!(p.memory, 1 << 25);
        assert_eq!(p.grid_size, 100);

        let rp = RunParameters::derive(&p).unwrap();
        assert!(rp.use_manual_seed);
        assert_eq!(rp.manual_tracer_seed(2), Some(9));
        let out = serde_json::to_value(&rp).unwrap();
        assert_eq!(out["N_timesteps"], 10_000);
        assert_eq!(out["landscape"], "EREM");
        assert_eq!(out["dynamics"], "auto");
        assert_eq!(out["PRECISON"], 128);
    }
}
