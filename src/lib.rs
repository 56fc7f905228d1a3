//! Generate a merged model/agent configuration document from provider
//! connection settings and a user-supplied base config.

pub mod cli;
pub mod config;
pub mod form;
pub mod logging;
pub mod merge;
pub mod providers;
pub mod server;

pub use merge::{merge, MergeError, MergedConfig, Payload};
