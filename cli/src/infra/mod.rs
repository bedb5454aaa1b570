//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the
//! hosting platform and image builder CLIs, version control, filesystem
//! access, and HTTP.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod azure;
pub mod command_runner;
pub mod config;
pub mod docker;
pub mod fs;
pub mod git;
pub mod http;
pub mod state;
