//! Simulation parameter structures.
//!
//! Parameters load from per-section JSON files with sensible defaults when
//! a file is absent, and are validated as a whole before the network is
//! built. All lengths are in reduced units of the bead interaction radius.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::kinetics::ParamError;
use crate::state::BrownianSettings;

/// Top-level parameters container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameters {
    /// Spatial grid layout
    pub grid: GridParameters,
    /// Bead/bond population
    pub population: PopulationParameters,
    /// Short-range repulsion between free bonds
    pub forces: ForceParameters,
    /// Stand-in Brownian integrator settings
    pub dynamics: DynamicsParameters,
}

impl Parameters {
    /// Load parameters from JSON files, or use defaults if files don't exist
    pub fn load_or_default() -> Self {
        Self::load_from_dir("data/parameters")
    }

    /// Load parameters from a specific directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            grid: GridParameters::load_or_default(dir.join("grid.json")),
            population: PopulationParameters::load_or_default(dir.join("population.json")),
            forces: ForceParameters::load_or_default(dir.join("forces.json")),
            dynamics: DynamicsParameters::load_or_default(dir.join("dynamics.json")),
        }
    }

    /// Check the whole configuration against its domain
    pub fn validate(&self) -> Result<(), ParamError> {
        self.grid.validate()?;
        self.population.validate()?;
        self.forces.validate(self.grid.cell_width)?;
        self.dynamics.validate()
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            grid: GridParameters::default(),
            population: PopulationParameters::default(),
            forces: ForceParameters::default(),
            dynamics: DynamicsParameters::default(),
        }
    }
}

fn load_json_or_default<T>(path: &Path, section: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(params) => {
                log::info!("loaded {} parameters from {:?}", section, path);
                params
            }
            Err(e) => {
                log::warn!("failed to parse {} parameters: {}, using defaults", section, e);
                T::default()
            }
        },
        Err(_) => {
            log::info!("{} parameters file not found, using defaults", section);
            T::default()
        }
    }
}

/// Spatial grid layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridParameters {
    /// Cells per axis; a z value of 1 selects the two-dimensional wiring
    pub cells_per_axis: [u32; 3],
    /// Fixed cell width (length units); must cover the repulsion cutoff
    /// and the largest event capture range
    pub cell_width: f32,
    /// Periodic wrap per axis
    pub periodic: [bool; 3],
}

impl GridParameters {
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path.as_ref(), "grid")
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        for axis in 0..3 {
            if self.cells_per_axis[axis] == 0 {
                return Err(ParamError::EmptyGrid);
            }
            if self.periodic[axis] && self.cells_per_axis[axis] < 3 {
                return Err(ParamError::PeriodicAxisTooSmall { axis });
            }
        }
        if !self.cell_width.is_finite() {
            return Err(ParamError::NotFinite {
                name: "cell width",
                value: self.cell_width,
            });
        }
        if self.cell_width <= 0.0 {
            return Err(ParamError::NonPositive {
                name: "cell width",
                value: self.cell_width,
            });
        }
        Ok(())
    }
}

impl Default for GridParameters {
    fn default() -> Self {
        Self {
            cells_per_axis: [10, 10, 10],
            cell_width: 2.0,
            periodic: [true, true, true],
        }
    }
}

/// Bead/bond population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationParameters {
    /// Number of free active bonds created at startup
    pub bond_count: u32,
    /// Initial head-to-tail bead spacing within one bond (length units)
    pub bond_extent: f32,
    /// RNG seed for reproducible runs
    pub seed: u64,
}

impl PopulationParameters {
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path.as_ref(), "population")
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        if !self.bond_extent.is_finite() {
            return Err(ParamError::NotFinite {
                name: "bond extent",
                value: self.bond_extent,
            });
        }
        if self.bond_extent <= 0.0 {
            return Err(ParamError::NonPositive {
                name: "bond extent",
                value: self.bond_extent,
            });
        }
        Ok(())
    }
}

impl Default for PopulationParameters {
    fn default() -> Self {
        Self {
            bond_count: 400,
            bond_extent: 0.5,
            seed: 42,
        }
    }
}

/// Short-range repulsion between free bonds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceParameters {
    /// Force coefficient `a` in F = a·(1/r − 1/r_c)
    pub repulsion_coefficient: f32,
    /// Cutoff radius r_c (length units)
    pub repulsion_cutoff: f32,
}

impl ForceParameters {
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path.as_ref(), "forces")
    }

    pub fn validate(&self, cell_width: f32) -> Result<(), ParamError> {
        if !self.repulsion_coefficient.is_finite() {
            return Err(ParamError::NotFinite {
                name: "repulsion coefficient",
                value: self.repulsion_coefficient,
            });
        }
        if self.repulsion_coefficient < 0.0 {
            return Err(ParamError::Negative {
                name: "repulsion coefficient",
                value: self.repulsion_coefficient,
            });
        }
        if !self.repulsion_cutoff.is_finite() {
            return Err(ParamError::NotFinite {
                name: "repulsion cutoff",
                value: self.repulsion_cutoff,
            });
        }
        if self.repulsion_cutoff <= 0.0 {
            return Err(ParamError::NonPositive {
                name: "repulsion cutoff",
                value: self.repulsion_cutoff,
            });
        }
        if self.repulsion_cutoff > cell_width {
            return Err(ParamError::CutoffExceedsCellWidth {
                cutoff: self.repulsion_cutoff,
                cell_width,
            });
        }
        Ok(())
    }
}

impl Default for ForceParameters {
    fn default() -> Self {
        Self {
            repulsion_coefficient: 25.0,
            repulsion_cutoff: 2.0,
        }
    }
}

/// Stand-in Brownian integrator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicsParameters {
    /// Timestep (time units)
    pub dt: f32,
    /// Bead mobility 1/γ
    pub mobility: f32,
    /// Thermal energy k_B·T; zero disables noise for reproducible runs
    pub kbt: f32,
}

impl DynamicsParameters {
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        load_json_or_default(path.as_ref(), "dynamics")
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        if self.dt <= 0.0 || !self.dt.is_finite() {
            return Err(ParamError::NonPositive {
                name: "timestep",
                value: self.dt,
            });
        }
        if self.mobility <= 0.0 || !self.mobility.is_finite() {
            return Err(ParamError::NonPositive {
                name: "mobility",
                value: self.mobility,
            });
        }
        if self.kbt < 0.0 || !self.kbt.is_finite() {
            return Err(ParamError::Negative {
                name: "thermal energy",
                value: self.kbt,
            });
        }
        Ok(())
    }

    /// View as the bead integrator's settings
    pub fn brownian(&self) -> BrownianSettings {
        BrownianSettings {
            dt: self.dt,
            mobility: self.mobility,
            kbt: self.kbt,
        }
    }
}

impl Default for DynamicsParameters {
    fn default() -> Self {
        Self {
            dt: 0.02,
            mobility: 1.0,
            kbt: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let params = Parameters::default();
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_cutoff_must_fit_cell_width() {
        let mut params = Parameters::default();
        params.forces.repulsion_cutoff = 2.5;
        assert!(matches!(
            params.validate(),
            Err(ParamError::CutoffExceedsCellWidth { .. })
        ));
    }

    #[test]
    fn test_periodic_two_cell_axis_rejected() {
        let mut params = Parameters::default();
        params.grid.cells_per_axis = [2, 10, 10];
        assert!(matches!(
            params.validate(),
            Err(ParamError::PeriodicAxisTooSmall { axis: 0 })
        ));
    }

    #[test]
    fn test_serialization_round_trip() {
        let params = Parameters::default();
        let json = serde_json::to_string_pretty(&params).unwrap();
        let parsed: Parameters = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.grid.cells_per_axis, params.grid.cells_per_axis);
        assert!((parsed.forces.repulsion_cutoff - params.forces.repulsion_cutoff).abs() < 1e-6);
    }
}
