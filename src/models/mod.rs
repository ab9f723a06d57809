//! Domain models for the carmaker API.
//!
//! # Core Concepts
//!
//! - [`VehicleModel`] is the center of the graph: it optionally owns a
//!   [`Project`], points at a [`Manufacturer`] and a predecessor model, and
//!   carries a set of [`Engine`] options.
//! - [`Project`] has no life of its own. Outside the id-only view it is
//!   created and deleted only as a side effect of vehicle-model writes.
//! - [`Vehicle`] rows are concrete builds of a model and die with it.
//! - [`Engineer`] records reference the models they work on (many-to-many).
//!
//! Every entity carries an opaque numeric id assigned by the store.

mod engine;
mod engineer;
mod manufacturer;
mod project;
mod vehicle;
mod vehicle_model;

pub use engine::*;
pub use engineer::*;
pub use manufacturer::*;
pub use project::*;
pub use vehicle::*;
pub use vehicle_model::*;
