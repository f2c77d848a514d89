//! Town generation pipeline: decor, roads, blocks, parcels and buildings from one seed.
pub mod events;
pub mod runner;

pub use events::{EventSink, FnSink, MultiSink, TownEvent, TownEventKind, TownSummary, VecSink};
pub use runner::{generate_town, generate_town_with_events, Stage, Town, TownGenerator};
