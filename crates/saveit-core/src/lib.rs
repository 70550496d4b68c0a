//! saveit-core library: the SaveIt knowledge-base engine.
//!
//! Layers, bottom up: [`model`] values, the [`collection`] of issues, the
//! snapshot [`history`], derived [`view`]s, the session [`manager`], the
//! [`command`] set and the [`logic`] dispatcher that ties them to raw input.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums in [`error`]; `anyhow::Result` at
//!   the config and storage seams.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod collection;
pub mod command;
pub mod config;
pub mod error;
pub mod history;
pub mod input_history;
pub mod logic;
pub mod manager;
pub mod model;
pub mod view;
