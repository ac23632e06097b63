//! State Catalog: per-species, per-colour state tables.
//!
//! Loaded once from a JSON document and validated up front; lookups hand out
//! immutable [`StateTable`]s shared by reference.

pub mod document;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ConfigError, TickError};
use document::{CatalogDocument, SpeciesDocument, StateDefaults};

/// Transient state only ever entered by explicit chaining.
pub const WITH_BALL: &str = "with_ball";

/// Climb chain, in visiting order.
pub const CLIMB_CHAIN: [&str; 5] = ["wallclimb", "walldig", "wallgrab", "wallnap", "fall_from_grab"];

/// State that stays pinned to the wall: hitting a lateral boundary while in
/// it does not flip the agent's direction.
pub const BOUNDARY_ANCHORED: &str = "walldig";

/// Fallback movement speed for states without explicit defaults.
const DEFAULT_MOVEMENT_SPEED: f32 = 0.0;
/// Fallback animation multiplier for states without explicit defaults.
const DEFAULT_ANIMATION_SPEED: f32 = 1.0;

/// One behaviour state. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDescriptor {
    pub name: String,
    /// Frame Set reference, relative to the asset root.
    pub asset: PathBuf,
    /// Ticks one cycle of this state lasts. Always >= 1.
    pub hold: u32,
    /// Pixels per tick while the state is active.
    pub movement_speed: f32,
    /// Multiplier on the base fps. Zero freezes the first frame.
    pub animation_speed: f32,
}

impl StateDescriptor {
    /// Copy of this state with a different hold count.
    pub fn with_hold(&self, hold: u32) -> Self {
        Self {
            hold: hold.max(1),
            ..self.clone()
        }
    }
}

/// Every state available to one species/colour pairing.
#[derive(Debug, Clone)]
pub struct StateTable {
    species: String,
    color: String,
    states: BTreeMap<String, Arc<StateDescriptor>>,
    climber: bool,
    lie_radius: Option<f32>,
}

impl StateTable {
    pub fn species(&self) -> &str {
        &self.species
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn get(&self, name: &str) -> Option<&Arc<StateDescriptor>> {
        self.states.get(name)
    }

    /// Like [`get`](Self::get), but a missing state is a tick failure.
    pub fn require(&self, name: &str) -> Result<Arc<StateDescriptor>, TickError> {
        self.states.get(name).cloned().ok_or_else(|| TickError::MissingState {
            species: self.species.clone(),
            color: self.color.clone(),
            state: name.to_string(),
        })
    }

    /// All states, sorted by name.
    pub fn states(&self) -> impl Iterator<Item = &Arc<StateDescriptor>> {
        self.states.values()
    }

    pub fn is_climber(&self) -> bool {
        self.climber
    }

    pub fn lie_radius(&self) -> Option<f32> {
        self.lie_radius
    }
}

/// Validated catalog document.
#[derive(Debug, Clone)]
pub struct Catalog {
    species: CatalogDocument,
}

impl Catalog {
    /// Read and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: CatalogDocument =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_document(doc)?;
        log::info!(
            "Loaded catalog {} ({} species)",
            path.display(),
            catalog.species.len()
        );
        Ok(catalog)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let doc = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::from_document(doc)
    }

    /// Validate every species up front so bad data fails at load time, not
    /// at some later lookup.
    pub fn from_document(mut doc: CatalogDocument) -> Result<Self, ConfigError> {
        for (name, species) in doc.iter_mut() {
            if species.colors.is_empty() {
                species.colors = species.states.keys().cloned().collect();
            }
            for color in &species.colors {
                if !species.states.contains_key(color) {
                    return Err(ConfigError::UnknownColor {
                        species: name.clone(),
                        color: color.clone(),
                    });
                }
            }
            for (state, defaults) in &species.defaults {
                validate_defaults(name, state, defaults)?;
            }
            if let Some(r) = species.lie_radius {
                if !r.is_finite() || r < 0.0 {
                    return Err(ConfigError::BadDefaults {
                        species: name.clone(),
                        state: "lie".into(),
                        reason: format!("lie_radius must be >= 0, got {r}"),
                    });
                }
            }
        }
        Ok(Self { species: doc })
    }

    pub fn species(&self) -> impl Iterator<Item = &str> {
        self.species.keys().map(String::as_str)
    }

    pub fn colors(&self, species: &str) -> Result<&[String], ConfigError> {
        Ok(&self.entry(species)?.colors)
    }

    /// State table for one species/colour. States without explicit defaults
    /// hold for `base_fps` ticks, stand still and animate at 1x.
    pub fn lookup(&self, species: &str, color: &str, base_fps: u32) -> Result<Arc<StateTable>, ConfigError> {
        let entry = self.entry(species)?;
        let assets = entry
            .states
            .get(color)
            .ok_or_else(|| ConfigError::UnknownColor {
                species: species.to_string(),
                color: color.to_string(),
            })?;
        if assets.is_empty() {
            return Err(ConfigError::NoStates {
                species: species.to_string(),
                color: color.to_string(),
            });
        }

        let fallback = StateDefaults::default();
        let states: BTreeMap<_, _> = assets
            .iter()
            .map(|(name, asset)| {
                let d = entry.defaults.get(name).unwrap_or(&fallback);
                let desc = StateDescriptor {
                    name: name.clone(),
                    asset: asset.clone(),
                    hold: d.hold.unwrap_or(base_fps).max(1),
                    movement_speed: d.movement_speed.unwrap_or(DEFAULT_MOVEMENT_SPEED),
                    animation_speed: d.speed_animation.unwrap_or(DEFAULT_ANIMATION_SPEED),
                };
                (name.clone(), Arc::new(desc))
            })
            .collect();

        let has_chain = CLIMB_CHAIN.iter().all(|s| states.contains_key(*s));
        let climber = entry.climber.unwrap_or(has_chain);
        if climber {
            if let Some(missing) = CLIMB_CHAIN.iter().find(|s| !states.contains_key(**s)) {
                return Err(ConfigError::IncompleteClimbChain {
                    species: species.to_string(),
                    color: color.to_string(),
                    state: missing.to_string(),
                });
            }
        }

        Ok(Arc::new(StateTable {
            species: species.to_string(),
            color: color.to_string(),
            states,
            climber,
            lie_radius: entry.lie_radius,
        }))
    }

    fn entry(&self, species: &str) -> Result<&SpeciesDocument, ConfigError> {
        self.species
            .get(species)
            .ok_or_else(|| ConfigError::UnknownSpecies {
                species: species.to_string(),
            })
    }
}

fn validate_defaults(species: &str, state: &str, d: &StateDefaults) -> Result<(), ConfigError> {
    let bad = |reason: String| ConfigError::BadDefaults {
        species: species.to_string(),
        state: state.to_string(),
        reason,
    };
    if d.hold == Some(0) {
        return Err(bad("hold must be at least 1".into()));
    }
    if let Some(v) = d.movement_speed {
        if !v.is_finite() || v < 0.0 {
            return Err(bad(format!("movement_speed must be >= 0, got {v}")));
        }
    }
    if let Some(v) = d.speed_animation {
        if !v.is_finite() || v < 0.0 {
            return Err(bad(format!("speed_animation must be >= 0, got {v}")));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r#"{
        "dog": {
            "colors": ["brown", "black"],
            "states": {
                "brown": {
                    "idle": "media/dog/brown_idle_8fps.gif",
                    "walk": "media/dog/brown_walk_8fps.gif",
                    "lie": "media/dog/brown_lie_8fps.gif",
                    "swipe": "media/dog/brown_swipe_8fps.gif",
                    "with_ball": "media/dog/brown_with_ball_8fps.gif"
                },
                "black": {
                    "idle": "media/dog/black_idle_8fps.gif"
                }
            },
            "defaults": {
                "idle": {"hold": 8, "movement_speed": 0, "speed_animation": 0.5},
                "walk": {"hold": 24, "movement_speed": 3, "speed_animation": 1.0},
                "lie": {"hold": 8, "movement_speed": 0, "speed_animation": 1.0},
                "with_ball": {"hold": 16, "movement_speed": 0, "speed_animation": 1.0}
            }
        },
        "squirrel": {
            "colors": ["grey"],
            "states": {
                "grey": {
                    "idle": "media/squirrel/grey_idle_8fps.gif",
                    "walk": "media/squirrel/grey_walk_8fps.gif",
                    "wallclimb": "media/squirrel/grey_wallclimb_8fps.gif",
                    "walldig": "media/squirrel/grey_walldig_8fps.gif",
                    "wallgrab": "media/squirrel/grey_wallgrab_8fps.gif",
                    "wallnap": "media/squirrel/grey_wallnap_8fps.gif",
                    "fall_from_grab": "media/squirrel/grey_fall_from_grab_8fps.gif"
                }
            },
            "defaults": {
                "walk": {"hold": 24, "movementSpeed": 3, "speedAnimation": 1.0},
                "wallclimb": {"hold": 4, "movement_speed": 2}
            }
        }
    }"#;

    #[test]
    fn lookup_fills_fallback_defaults() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let table = catalog.lookup("dog", "brown", 12).unwrap();

        let walk = table.get("walk").unwrap();
        assert_eq!(walk.hold, 24);
        assert_eq!(walk.movement_speed, 3.0);

        // "swipe" has an asset but no defaults.
        let swipe = table.get("swipe").unwrap();
        assert_eq!(swipe.hold, 12);
        assert_eq!(swipe.movement_speed, 0.0);
        assert_eq!(swipe.animation_speed, 1.0);
        assert!(!table.is_climber());
    }

    #[test]
    fn camel_case_defaults_are_accepted() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let table = catalog.lookup("squirrel", "grey", 8).unwrap();
        assert_eq!(table.get("walk").unwrap().movement_speed, 3.0);
        // Partial defaults: missing keys still fall back.
        let climb = table.get("wallclimb").unwrap();
        assert_eq!((climb.hold, climb.animation_speed), (4, 1.0));
    }

    #[test]
    fn climber_is_inferred_from_chain() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert!(catalog.lookup("squirrel", "grey", 8).unwrap().is_climber());
    }

    #[test]
    fn unknown_species_and_color_fail() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert!(matches!(
            catalog.lookup("horse", "brown", 8),
            Err(ConfigError::UnknownSpecies { .. })
        ));
        assert!(matches!(
            catalog.lookup("dog", "green", 8),
            Err(ConfigError::UnknownColor { .. })
        ));
    }

    #[test]
    fn declared_climber_needs_full_chain() {
        let json = r#"{"cat": {"climber": true, "states": {"white": {
            "idle": "a.gif", "wallclimb": "b.gif"}}}}"#;
        let catalog = Catalog::from_json(json).unwrap();
        let err = catalog.lookup("cat", "white", 8).unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteClimbChain { ref state, .. } if state == "walldig"));
    }

    #[test]
    fn colors_default_to_state_keys() {
        let json = r#"{"fox": {"states": {"red": {"idle": "a.gif"}, "white": {"idle": "b.gif"}}}}"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.colors("fox").unwrap(), ["red", "white"]);
    }

    #[test]
    fn load_rejects_bad_documents() {
        let listed_but_missing = r#"{"fox": {"colors": ["red"], "states": {}}}"#;
        assert!(matches!(
            Catalog::from_json(listed_but_missing),
            Err(ConfigError::UnknownColor { .. })
        ));

        let zero_hold = r#"{"fox": {"states": {"red": {"idle": "a.gif"}},
            "defaults": {"idle": {"hold": 0}}}}"#;
        assert!(matches!(
            Catalog::from_json(zero_hold),
            Err(ConfigError::BadDefaults { .. })
        ));

        let negative_speed = r#"{"fox": {"states": {"red": {"idle": "a.gif"}},
            "defaults": {"idle": {"movement_speed": -1}}}}"#;
        assert!(Catalog::from_json(negative_speed).is_err());

        assert!(matches!(
            Catalog::from_json("{not json"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn empty_color_is_rejected_at_lookup() {
        let json = r#"{"fox": {"states": {"red": {}}}}"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert!(matches!(
            catalog.lookup("fox", "red", 8),
            Err(ConfigError::NoStates { .. })
        ));
    }

    #[test]
    fn require_reports_missing_state() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let table = catalog.lookup("dog", "black", 8).unwrap();
        assert!(table.require("idle").is_ok());
        assert!(matches!(
            table.require("lie"),
            Err(TickError::MissingState { .. })
        ));
    }
}
