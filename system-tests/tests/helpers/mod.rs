// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for pet-store system-tests.
// Purpose: Provide artifact utilities for live runs.
// Dependencies: petstore-harness
// ============================================================================

//! ## Overview
//! Shared helpers for pet-store system-tests.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
