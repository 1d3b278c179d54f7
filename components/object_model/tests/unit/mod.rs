//! Unit tests for the object model
