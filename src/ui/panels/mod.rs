// ConsoleWatch - ui/panels/mod.rs

pub mod about;
pub mod console;
pub mod status;
pub mod warnings;
