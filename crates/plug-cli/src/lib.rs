//! plug library - command handlers shared by the binary and its tests

pub mod commands;
pub mod common;
pub mod errors;

pub use common::GlobalOpts;
