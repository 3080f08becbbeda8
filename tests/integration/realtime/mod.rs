//! Realtime integration tests
//!
//! Presence, fanout and delivery to live sessions

mod fanout_test;
mod scenarios_test;
