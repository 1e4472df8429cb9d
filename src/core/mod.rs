// ConsoleWatch - core/mod.rs
//
// Core protocol logic: data model, escaping, the update step, and export.
// Must NOT depend on: ui, platform, app, or any network crate.

pub mod escape;
pub mod export;
pub mod model;
pub mod surface;
pub mod update;
