//! # beacon-profile
//!
//! The monitoring side of the bridge.
//!
//! This crate provides:
//! - [`MonitoringProfile`], which accepts resource bindings and attribute declarations
//! - [`SecondaryExporter`], the fallback for metrics of unknown kind
//! - [`InMemoryProfile`], an idempotent profile that can be polled for live values

mod memory;
mod profile;

pub use memory::{ExposedAttribute, InMemoryProfile};
pub use profile::{MonitoringProfile, SecondaryExporter};
