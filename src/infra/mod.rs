//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, remote
//! transports, configuration files, and process termination.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod channel;
pub mod command_runner;
pub mod config;
pub mod terminator;
