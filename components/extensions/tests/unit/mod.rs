//! Unit tests for the extensions crate

mod native_test;
