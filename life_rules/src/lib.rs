//! # Life Rules
//!
//! The authored vocabulary of Afterglow - memory definitions, experience
//! categories, identity traits, world time and the tunables of every service.
//! This crate holds no runtime state; `life_core` builds the simulation on top.

pub mod config;
pub mod definitions;
pub mod mechanics;
pub mod world_state;

pub use config::*;
pub use definitions::*;
pub use mechanics::*;
pub use world_state::*;
