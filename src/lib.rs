pub mod cli;
pub mod collection;
pub mod compat;
pub mod dispatch;
pub mod engine;
pub mod engine_resolver;
pub mod flags;
pub mod schema;
pub mod settings;
pub mod version;
pub mod workflow;
