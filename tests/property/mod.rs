//! Property-based tests for the emulated directory tree

mod tree_properties;
