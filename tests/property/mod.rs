//! Property-based tests

mod key_proptest;
