use glam::Vec2;

use crate::catalog::Catalog;
use crate::ecs::components::*;
use crate::ecs::systems::{animation, behavior};
use crate::error::ConfigError;
use crate::platform::ScreenInfo;
use crate::rng::RandomSource;
use crate::settings::{PetSpec, Settings};
use crate::sprite::FrameSource;

/// Create one agent for `spec`, standing at the right edge on the floor in a
/// random non-transient state.
pub fn spawn(
    world: &mut hecs::World,
    catalog: &Catalog,
    spec: &PetSpec,
    settings: &Settings,
    screen: &ScreenInfo,
    frames: &dyn FrameSource,
    rng: &mut dyn RandomSource,
) -> Result<hecs::Entity, ConfigError> {
    let table = catalog.lookup(&spec.species, &spec.color, settings.base_fps)?;
    let state = behavior::choose_random_state(&table, &behavior::CREATION_EXCLUDED, rng);
    let facing = behavior::random_facing(rng);

    let pet = Pet {
        table,
        size: settings.size,
        base_fps: settings.base_fps,
    };
    let behavior = Behavior {
        state,
        counter: 0,
        immunity: false,
        climb_step: None,
        facing,
    };
    let mut anim = Animation::default();
    let mut extent = Extent(Vec2::ZERO);
    let mut cache = FrameCache::default();
    animation::enter_state(&pet, &behavior, &mut anim, &mut extent, &mut cache, frames);

    let bounds = screen.bounds();
    let pos = Vec2::new(bounds.max_x(extent.0.x), bounds.rest_y(extent.0.y));

    log::info!(
        "Spawned {}/{} in {} at ({:.0}, {:.0}), size {}",
        spec.species,
        spec.color,
        behavior.state.name,
        pos.x,
        pos.y,
        settings.size
    );

    Ok(world.spawn((
        pet,
        Position(pos),
        extent,
        Velocity::default(),
        Drag::default(),
        SecondaryClick::default(),
        behavior,
        anim,
        cache,
        bounds,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::SAMPLE;
    use crate::platform::{Taskbar, TaskbarEdge};
    use crate::rng::Scripted;
    use crate::sprite::SizeBucket;
    use crate::test_support::MemoryFrames;

    fn screen() -> ScreenInfo {
        ScreenInfo {
            width: 1000,
            height: 800,
            taskbar: Some(Taskbar {
                height: 40,
                autohide: false,
                edge: TaskbarEdge::Bottom,
            }),
        }
    }

    fn settings() -> Settings {
        Settings {
            size: SizeBucket::Original,
            base_fps: 8,
            ..Settings::default()
        }
    }

    #[test]
    fn spawns_at_right_edge_on_the_floor() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let mut world = hecs::World::new();
        let frames = MemoryFrames::new(3, 60, 40);
        let e = spawn(
            &mut world,
            &catalog,
            &PetSpec::new("dog", "brown"),
            &settings(),
            &screen(),
            &frames,
            &mut Scripted::default(),
        )
        .unwrap();

        let pos = world.get::<&Position>(e).unwrap().0;
        let extent = world.get::<&Extent>(e).unwrap().0;
        assert_eq!(extent, Vec2::new(60.0, 40.0));
        assert_eq!(pos, Vec2::new(940.0, 720.0));
    }

    #[test]
    fn creation_never_starts_in_a_transient_state() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let frames = MemoryFrames::new(1, 10, 10);
        for pick in 0..16 {
            let mut world = hecs::World::new();
            let e = spawn(
                &mut world,
                &catalog,
                &PetSpec::new("squirrel", "grey"),
                &settings(),
                &screen(),
                &frames,
                &mut Scripted::new([pick]),
            )
            .unwrap();
            let b = world.get::<&Behavior>(e).unwrap();
            assert!(!behavior::CREATION_EXCLUDED.contains(&b.state.name.as_str()));
            assert!(b.climb_step.is_none());
        }
    }

    #[test]
    fn unknown_pairing_is_a_config_error() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let mut world = hecs::World::new();
        let err = spawn(
            &mut world,
            &catalog,
            &PetSpec::new("dog", "purple"),
            &settings(),
            &screen(),
            &MemoryFrames::new(1, 10, 10),
            &mut Scripted::default(),
        );
        assert!(matches!(err, Err(ConfigError::UnknownColor { .. })));
        assert_eq!(world.len(), 0);
    }
}
