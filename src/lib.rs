//! Editor tab state and the commands that save and open files through a
//! bridge to a privileged host process.

pub mod action;
pub mod bridge;
pub mod command;
pub mod commands;
pub mod config;
pub mod host;
pub mod ipc;
pub mod pane;
pub mod persist;
pub mod shell;
pub mod state;
pub mod util;
pub mod widget;
