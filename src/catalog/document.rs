use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// On-disk shape of the catalog: `species -> SpeciesDocument`.
pub type CatalogDocument = BTreeMap<String, SpeciesDocument>;

#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesDocument {
    /// Colour variants. When absent the keys of `states` are used.
    #[serde(default)]
    pub colors: Vec<String>,
    /// `color -> state name -> asset path`.
    pub states: BTreeMap<String, BTreeMap<String, PathBuf>>,
    #[serde(default)]
    pub defaults: BTreeMap<String, StateDefaults>,
    /// Explicit climb-chain flag. Inferred from the state set when absent.
    #[serde(default)]
    pub climber: Option<bool>,
    /// Pointer distance that triggers the calming state. Defaults to the
    /// agent's frame height.
    #[serde(default)]
    pub lie_radius: Option<f32>,
}

/// Per-state timing. Any missing key takes the engine fallback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateDefaults {
    #[serde(default)]
    pub hold: Option<u32>,
    #[serde(default, alias = "movementSpeed")]
    pub movement_speed: Option<f32>,
    #[serde(default, alias = "speedAnimation")]
    pub speed_animation: Option<f32>,
}
