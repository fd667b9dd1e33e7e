use crate::errors::SimulationError;

use meristem_building_blocks::{MorphogenSignal, Parameters};

use serde::{Deserialize, Serialize};

/// Initial cell which is placed into the tissue before the first step.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SeedCell {
    /// Center of the cell
    pub center: [f64; 2],
    /// Radius of the circle on which the wall nodes are placed
    pub radius: f64,
    /// Layer of the tissue
    #[serde(default)]
    pub layer: usize,
    /// Whether the cell lies on the boundary of the tissue
    #[serde(default)]
    pub boundary: bool,
    /// Whether the cell is a stem cell
    #[serde(default)]
    pub stem: bool,
    /// Fixed orientation of the division plane
    #[serde(default)]
    pub div_plane: Option<[f64; 2]>,
}

/// Everything needed to construct a [Tissue](crate::Tissue) and run it.
///
/// Missing fields are filled with their defaults when deserializing.
/// ```
/// # use meristem_core::Settings;
/// let settings = Settings::from_ron_str(
///     "(n_steps: 10, seed_cells: [(center: (0.0, 0.0), radius: 1.0)])"
/// )?;
/// assert_eq!(settings.n_steps, 10);
/// assert_eq!(settings.seed_cells.len(), 1);
/// # Ok::<(), meristem_core::SimulationError>(())
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Parameters shared by all cells
    pub parameters: Parameters,
    /// Source of the morphogen concentrations
    pub morphogens: MorphogenSignal,
    /// Cells present at the start
    pub seed_cells: Vec<SeedCell>,
    /// Number of steps performed by [Tissue::run](crate::Tissue::run)
    pub n_steps: usize,
    /// Seed of the random number generator
    pub rng_seed: u64,
    /// Display a progress bar while running
    pub show_progressbar: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parameters: Parameters::default(),
            morphogens: MorphogenSignal::default(),
            seed_cells: Vec::new(),
            n_steps: 1_000,
            rng_seed: 0,
            show_progressbar: false,
        }
    }
}

impl Settings {
    /// Parses settings in the [ron] format.
    pub fn from_ron_str(input: &str) -> Result<Self, SimulationError> {
        Ok(ron::de::from_str(input)?)
    }

    /// Parses settings in the json format.
    pub fn from_json_str(input: &str) -> Result<Self, SimulationError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Reads settings from a file.
    ///
    /// Files ending in `.json` are parsed as json and all other files as [ron].
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_ron_str(&contents),
        }
    }

    /// Serializes the settings in the [ron] format.
    pub fn to_ron_string(&self) -> Result<String, SimulationError> {
        let config = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .separate_tuple_members(false)
            .compact_arrays(true)
            .indentor("  ".to_owned());
        Ok(ron::ser::to_string_pretty(self, config)?)
    }
}
