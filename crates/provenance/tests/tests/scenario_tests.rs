#[path = "scenario/undo_redo.rs"]
mod undo_redo;

#[path = "scenario/irreversible.rs"]
mod irreversible;

#[path = "scenario/duplicates.rs"]
mod duplicates;

#[path = "scenario/reentrant_tracking.rs"]
mod reentrant_tracking;

#[path = "scenario/events_and_artifacts.rs"]
mod events_and_artifacts;
