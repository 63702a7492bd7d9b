//! Kinetic video generation API adapter.
//!
//! Kinetic wraps everything in a `{code, msg, data}` envelope and issues a
//! single `taskId`. Result URLs hide inside `resultJson`, a JSON string
//! embedded in the response. Its callback payloads have shifted shape across
//! releases, so [`callback`] parses them with an ordered chain of extraction
//! strategies instead of one strict schema.

mod adapter;
mod api_types;
pub mod callback;
mod config;

pub use adapter::KineticProvider;
pub use config::KineticConfig;
