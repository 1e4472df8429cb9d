// ConsoleWatch - app/mod.rs
//
// Application layer: polling orchestration, transport, GUI state.
// Dependencies: core layer.
// Must NOT depend on: ui.

pub mod poller;
pub mod state;
pub mod transport;
