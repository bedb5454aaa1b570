//! Integration tests for lens-deploy
//!
//! These tests spawn the actual binary and test end-to-end behavior that
//! stays local: argument parsing, validation, fingerprinting and planning.

mod cli_tests;
mod local_commands;
