//! Unit tests for the splitting and reassembly subsystem.
//!
//! Tests are split into focused submodules to keep each file short and easy
//! to navigate.

mod reassembler_tests;
