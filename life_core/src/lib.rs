//! # Life Core
//!
//! The runtime half of Afterglow: a reactive life-state simulation in which
//! the player keeps a handful of memories, becomes someone because of them,
//! and leaves echoes in the places they mattered. When the session ends, the
//! final state is written up as a short closing narrative.
//!
//! ## Core Components
//!
//! - **memory_store**: The bounded set of kept memories and their fading vividness
//! - **clock**: Scales frame time into in-game hours, days and seasons
//! - **identity**: Trait profile shaped by what is held right now
//! - **echo_map**: Spatial echoes, linger detection and atmosphere pushes
//! - **narrator**: Deterministic ending composition and its playback sequencer
//! - **events**: The closed event set and the ordered bus
//! - **session**: Owns every service and delivers events between them
//!
//! ## Design Philosophy
//!
//! - **Explicit wiring**: Services are constructed by the session, never found at runtime
//! - **Ordered delivery**: Internal services observe an event before any external listener
//! - **Deferred choice**: A full store never evicts on its own; the player decides

pub mod clock;
pub mod echo_map;
pub mod events;
pub mod identity;
pub mod memory_store;
pub mod narrator;
pub mod presentation;
pub mod session;

pub use clock::*;
pub use echo_map::*;
pub use events::*;
pub use identity::*;
pub use memory_store::*;
pub use narrator::*;
pub use presentation::*;
pub use session::*;
