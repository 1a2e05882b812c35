// mapty-tui/src/app/mod.rs
mod actions;
mod input;
pub mod state;

pub use state::{ActiveModal, App, Focus};
