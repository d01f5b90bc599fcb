// src/commands/mod.rs
//! Command handlers for the next2expo CLI

mod analyze;
mod convert;
mod fix;
pub mod progress;
mod provider;

pub use analyze::cmd_analyze;
pub use convert::{ConvertArgs, cmd_convert};
pub use fix::cmd_fix;
pub use provider::{cmd_provider_select, cmd_provider_set_key, cmd_provider_setup, cmd_provider_show};
