//! Microscopium CLI - serve the screen browser from the command line.
//!
//! This crate provides the `microscopium` binary: configuration loading,
//! logging setup, and the `serve`, `check` and `version` commands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
