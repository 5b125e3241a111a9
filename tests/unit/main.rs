//! Unit tests for mitamae-provisioner
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod channel;
mod helpers;
mod property_tests;
mod provision_command;
