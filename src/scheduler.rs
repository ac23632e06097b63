use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use instant::Instant;

use crate::catalog::Catalog;
use crate::ecs::components::Pet;
use crate::ecs::systems::{self, TickContext};
use crate::error::Error;
use crate::Result;
use crate::input::{Buttons, InputSnapshot, InputSource, NoInput};
use crate::pet;
use crate::platform::{FixedScreen, ScreenBounds, ScreenInfo};
use crate::render::{Compositor, NullCompositor};
use crate::rng::RandomSource;
use crate::settings::Settings;
use crate::sprite::FrameSource;

/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How often to log tick stats (seconds).
const STATS_LOG_INTERVAL: f64 = 5.0;
/// Shortest sleep between loop iterations.
const MIN_SLEEP: f64 = 0.001;

// ---------------------------------------------------------------------------
// Tick timing
// ---------------------------------------------------------------------------

struct TickStats {
    tick_count: u64,
    last_log_time: Instant,
    cost_sum: f64,
    cost_max: f64,
    ticks_since_log: u32,
}

impl TickStats {
    fn new() -> Self {
        Self {
            tick_count: 0,
            last_log_time: Instant::now(),
            cost_sum: 0.0,
            cost_max: 0.0,
            ticks_since_log: 0,
        }
    }

    fn record_tick(&mut self, cost: f64, agents: usize, dropped: u64) {
        self.tick_count += 1;
        self.ticks_since_log += 1;
        self.cost_sum += cost;
        self.cost_max = self.cost_max.max(cost);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= STATS_LOG_INTERVAL {
            let avg_ms = (self.cost_sum / self.ticks_since_log as f64) * 1000.0;
            let rate = self.ticks_since_log as f64 / elapsed;
            log::info!(
                "Ticks: {:.1}/s | avg: {:.2}ms | max: {:.2}ms | agents: {} | dropped frames: {} | total ticks: {}",
                rate,
                avg_ms,
                self.cost_max * 1000.0,
                agents,
                dropped,
                self.tick_count,
            );
            self.last_log_time = Instant::now();
            self.cost_sum = 0.0;
            self.cost_max = 0.0;
            self.ticks_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Secondary click completed on an agent; handed to the inbox collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxRequest {
    pub agent: hecs::Entity,
    pub species: String,
    pub color: String,
}

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub ticked: usize,
    pub failed: usize,
    pub inbox_requests: usize,
    /// Agents that entered a new behaviour state.
    pub transitions: usize,
    /// Agents were despawned and respawned before ticking.
    pub refreshed: bool,
}

type InboxHook = Box<dyn FnMut(&InboxRequest) + Send>;

/// Owns every agent and ticks them at a fixed rate.
pub struct Scheduler {
    world: hecs::World,
    catalog: Arc<Catalog>,
    settings: Settings,
    input: Box<dyn InputSource>,
    screen: Box<dyn ScreenBounds>,
    frames: Arc<dyn FrameSource>,
    compositor: Box<dyn Compositor>,
    rng: Box<dyn RandomSource>,
    on_secondary_click: Option<InboxHook>,

    fullscreen: bool,
    prev_buttons: Buttons,
    // Reused each tick
    agents: Vec<hecs::Entity>,
    stats: TickStats,
}

impl Scheduler {
    /// Headless scheduler: no pointer, fixed screen from settings, frames
    /// discarded. Swap collaborators in with the `with_*` methods.
    pub fn new(catalog: Arc<Catalog>, settings: Settings, frames: Arc<dyn FrameSource>) -> Self {
        let screen = FixedScreen(ScreenInfo::from(&settings.screen));
        Self {
            world: hecs::World::new(),
            catalog,
            settings,
            input: Box::new(NoInput),
            screen: Box::new(screen),
            frames,
            compositor: Box::new(NullCompositor),
            rng: Box::new(fastrand::Rng::new()),
            on_secondary_click: None,
            fullscreen: false,
            prev_buttons: Buttons::default(),
            agents: Vec::new(),
            stats: TickStats::new(),
        }
    }

    pub fn with_input(mut self, input: Box<dyn InputSource>) -> Self {
        self.input = input;
        self
    }

    pub fn with_screen(mut self, screen: Box<dyn ScreenBounds>) -> Self {
        self.screen = screen;
        self
    }

    pub fn with_compositor(mut self, compositor: Box<dyn Compositor>) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn with_rng(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    /// Called once per completed secondary click on an agent.
    pub fn on_secondary_click(mut self, hook: impl FnMut(&InboxRequest) + Send + 'static) -> Self {
        self.on_secondary_click = Some(Box::new(hook));
        self
    }

    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    /// Spawn every pet in the roster against the current screen. Pairings
    /// that fail to resolve are logged and skipped.
    pub fn spawn_roster(&mut self) -> usize {
        let screen = self.screen.screen();
        let mut spawned = 0;
        for spec in &self.settings.pets {
            match pet::spawn(
                &mut self.world,
                &self.catalog,
                spec,
                &self.settings,
                &screen,
                self.frames.as_ref(),
                self.rng.as_mut(),
            ) {
                Ok(_) => spawned += 1,
                Err(e) => log::warn!("Skipping {}:{}: {e}", spec.species, spec.color),
            }
        }
        log::info!(
            "Spawned {spawned}/{} pets on {}x{}",
            self.settings.pets.len(),
            screen.width,
            screen.height
        );
        spawned
    }

    /// Drop every agent and its bitmaps.
    pub fn release(&mut self) {
        let count = self.world.len();
        self.world.clear();
        log::debug!("Released {count} agents");
    }

    /// Despawn and respawn the roster with fresh screen bounds.
    pub fn refresh(&mut self) -> usize {
        log::info!("Refreshing pets");
        self.release();
        self.spawn_roster()
    }

    /// One fixed step: poll input once, then tick every agent. A failing
    /// agent is logged and skipped; the others still tick.
    pub fn tick(&mut self, dt: f64) -> TickSummary {
        let started = Instant::now();
        let mut summary = TickSummary::default();

        let fullscreen = self.screen.fullscreen_active();
        if fullscreen != self.fullscreen {
            log::info!("Fullscreen {}", if fullscreen { "entered" } else { "left" });
            self.fullscreen = fullscreen;
            self.refresh();
            summary.refreshed = true;
        }

        let input = InputSnapshot::poll(self.input.as_mut());
        self.agents.clear();
        self.agents.extend(self.world.iter().map(|e| e.entity()));

        let mut ctx = TickContext {
            input: &input,
            previous: self.prev_buttons,
            dt,
            rng: self.rng.as_mut(),
            frames: self.frames.as_ref(),
            tuning: &self.settings.tuning,
        };

        for &entity in &self.agents {
            match systems::tick_agent(&mut self.world, entity, &mut ctx) {
                Ok(out) => {
                    summary.ticked += 1;
                    if out.state_changed {
                        summary.transitions += 1;
                    }
                    if out.inbox_requested {
                        summary.inbox_requests += 1;
                        if let Some(hook) = self.on_secondary_click.as_mut() {
                            if let Ok(pet) = self.world.get::<&Pet>(entity) {
                                hook(&InboxRequest {
                                    agent: entity,
                                    species: pet.table.species().to_string(),
                                    color: pet.table.color().to_string(),
                                });
                            }
                        }
                    }
                    self.compositor.present(out.frame);
                }
                Err(e) => {
                    summary.failed += 1;
                    log::warn!("Agent {entity:?} skipped this tick: {e}");
                }
            }
        }

        if summary.transitions > 0 {
            log::trace!("{} of {} agents changed state", summary.transitions, summary.ticked);
        }
        self.prev_buttons = input.buttons;
        self.stats
            .record_tick(started.elapsed().as_secs_f64(), self.agents.len(), self.compositor.dropped());
        summary
    }

    /// Move the scheduler onto its own thread and start ticking.
    pub fn start(mut self) -> Result<SchedulerHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let thread = std::thread::Builder::new()
            .name("deskpets-tick".into())
            .spawn(move || {
                self.run(&flag);
                self.release();
                log::info!("Scheduler stopped after {} ticks", self.stats.tick_count);
            })
            .map_err(Error::Thread)?;
        Ok(SchedulerHandle {
            running,
            thread: Some(thread),
        })
    }

    /// Fixed-timestep loop until `running` clears.
    fn run(&mut self, running: &AtomicBool) {
        let interval = self.settings.tick_interval();
        log::info!("Scheduler running at {:.1} Hz", self.settings.tick_rate_hz);

        let mut last = Instant::now();
        let mut accumulator = 0.0;
        while running.load(Ordering::Relaxed) {
            let now = Instant::now();
            accumulator += now.duration_since(last).as_secs_f64();
            last = now;

            if accumulator > MAX_ACCUMULATOR {
                accumulator = MAX_ACCUMULATOR;
            }

            while accumulator >= interval {
                self.tick(interval);
                accumulator -= interval;
            }

            std::thread::sleep(Duration::from_secs_f64((interval - accumulator).max(MIN_SLEEP)));
        }
    }
}

/// Running scheduler. Stopping (or dropping) joins the tick thread, after
/// which every agent has been released.
pub struct SchedulerHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Scheduler thread panicked");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use glam::Vec2;

    use super::*;
    use crate::catalog::tests::SAMPLE;
    use crate::ecs::components::{Behavior, Position, Velocity};
    use crate::input::ScriptedInput;
    use crate::render::frame_queue;
    use crate::rng::Scripted;
    use crate::settings::{PetSpec, ScreenSettings};
    use crate::sprite::SizeBucket;
    use crate::test_support::MemoryFrames;

    const DT: f64 = 1.0 / 30.0;

    fn settings(pets: &[(&str, &str)]) -> Settings {
        Settings {
            size: SizeBucket::Original,
            pets: pets.iter().map(|(s, c)| PetSpec::new(*s, *c)).collect(),
            screen: ScreenSettings {
                width: 1000,
                height: 800,
                taskbar_height: 0,
                taskbar_autohide: false,
            },
            ..Settings::default()
        }
    }

    fn scheduler(pets: &[(&str, &str)]) -> Scheduler {
        let catalog = Arc::new(Catalog::from_json(SAMPLE).unwrap());
        Scheduler::new(catalog, settings(pets), Arc::new(MemoryFrames::new(2, 60, 40)))
            .with_rng(Box::new(Scripted::default()))
    }

    #[test]
    fn bad_pairings_are_skipped_at_spawn() {
        let mut s = scheduler(&[("dog", "brown"), ("dog", "purple"), ("horse", "brown")]);
        assert_eq!(s.spawn_roster(), 1);
        assert_eq!(s.world().len(), 1);
    }

    #[test]
    fn failing_agent_does_not_stop_the_others() {
        let (tx, rx) = frame_queue(16);
        let mut s = scheduler(&[("dog", "brown"), ("dog", "black")]).with_compositor(Box::new(tx));
        s.spawn_roster();

        let broken = s.world().iter().next().unwrap().entity();
        s.world_mut().remove_one::<Velocity>(broken).unwrap();

        let summary = s.tick(DT);
        assert_eq!(summary.ticked, 1);
        assert_eq!(summary.failed, 1);

        let frames: Vec<_> = rx.drain().collect();
        assert_eq!(frames.len(), 1);
        assert_ne!(frames[0].agent, broken);
        assert!(frames[0].bitmap.is_some());
    }

    #[test]
    fn secondary_click_reaches_the_hook_once() {
        // dog/black only idles, so it stays put at (940, 760).
        let inside = Vec2::new(950.0, 770.0);
        let input = ScriptedInput::new([
            InputSnapshot::at(inside).secondary(),
            InputSnapshot::at(inside).secondary(),
            InputSnapshot::at(inside),
            InputSnapshot::at(inside),
        ]);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut s = scheduler(&[("dog", "black")])
            .with_input(Box::new(input))
            .on_secondary_click(move |req| {
                assert_eq!(req.species, "dog");
                assert_eq!(req.color, "black");
                seen.fetch_add(1, Ordering::Relaxed);
            });
        s.spawn_roster();

        let requests: usize = (0..4).map(|_| s.tick(DT).inbox_requests).sum();
        assert_eq!(requests, 1);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn drag_and_throw_pause_the_state_machine() {
        let input = ScriptedInput::new([
            InputSnapshot::at(Vec2::new(950.0, 770.0)).primary(),
            InputSnapshot::at(Vec2::new(900.0, 700.0)).primary(),
            InputSnapshot::at(Vec2::new(900.0, 700.0)),
        ]);
        let mut s = scheduler(&[("dog", "black")]).with_input(Box::new(input));
        s.spawn_roster();
        let e = s.world().iter().next().unwrap().entity();

        s.tick(DT);
        s.tick(DT);
        assert_eq!(s.world().get::<&Position>(e).unwrap().0, Vec2::new(890.0, 690.0));

        // Release: thrown, and the state counter stays frozen until it lands.
        s.tick(DT);
        let mut airborne_ticks = 0;
        while s.world().get::<&Velocity>(e).unwrap().0 != Vec2::ZERO {
            assert_eq!(s.world().get::<&Behavior>(e).unwrap().counter, 0);
            s.tick(DT);
            airborne_ticks += 1;
            assert!(airborne_ticks < 500);
        }
        assert!(airborne_ticks > 0);

        // Landed: the state machine resumes on the next tick.
        s.tick(DT);
        assert_eq!(s.world().get::<&Behavior>(e).unwrap().counter, 1);

        let pos = s.world().get::<&Position>(e).unwrap().0;
        assert!(pos.x >= 0.0 && pos.x <= 940.0);
        assert!(pos.y >= 0.0 && pos.y <= 760.0);
    }

    struct Toggle(Arc<AtomicBool>);

    impl ScreenBounds for Toggle {
        fn screen(&mut self) -> ScreenInfo {
            ScreenInfo {
                width: 1000,
                height: 800,
                taskbar: None,
            }
        }

        fn fullscreen_active(&mut self) -> bool {
            self.0.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn fullscreen_change_respawns_everyone() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut s = scheduler(&[("dog", "brown"), ("squirrel", "grey")])
            .with_screen(Box::new(Toggle(Arc::clone(&flag))));
        s.spawn_roster();
        let before: Vec<_> = s.world().iter().map(|e| e.entity()).collect();

        assert!(!s.tick(DT).refreshed);
        flag.store(true, Ordering::Relaxed);
        let summary = s.tick(DT);
        assert!(summary.refreshed);
        assert_eq!(summary.ticked, 2);

        let after: Vec<_> = s.world().iter().map(|e| e.entity()).collect();
        assert_eq!(after.len(), 2);
        assert!(before.iter().all(|e| !s.world().contains(*e)));

        // Stable flag: no further refresh.
        assert!(!s.tick(DT).refreshed);
    }

    #[test]
    fn state_changes_are_counted() {
        // dog/black idles with hold 8: the first cycle completes on tick 8.
        let mut s = scheduler(&[("dog", "black")]);
        s.spawn_roster();
        let transitions: Vec<usize> = (0..8).map(|_| s.tick(DT).transitions).collect();
        assert_eq!(transitions, [0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn release_clears_the_world() {
        let mut s = scheduler(&[("dog", "brown"), ("dog", "black")]);
        s.spawn_roster();
        s.release();
        assert_eq!(s.world().len(), 0);
    }

    #[test]
    fn started_scheduler_ticks_and_stops() {
        let (tx, rx) = frame_queue(256);
        let mut s = scheduler(&[("dog", "brown")]).with_compositor(Box::new(tx));
        s.spawn_roster();
        let handle = s.start().unwrap();
        let first = rx.recv_timeout(Duration::from_secs(2));
        handle.stop();
        assert!(first.is_some());
    }
}
