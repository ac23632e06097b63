//! DeskPets: behaviour and animation engine for draggable, throwable
//! on-screen pets.
//!
//! Each pet is an entity in a `hecs::World`. The [`scheduler::Scheduler`]
//! ticks every pet at a fixed rate (input, then physics, then state, then
//! animation) and hands one [`render::RenderFrame`] per pet to an external
//! compositor.

pub mod catalog;
pub mod ecs;
pub mod error;
pub mod input;
pub mod pet;
pub mod platform;
pub mod render;
pub mod rng;
pub mod scheduler;
pub mod settings;
pub mod sprite;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
