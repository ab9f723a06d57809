use serde::{Deserialize, Serialize};

/// An internal development project, owned exclusively by at most one
/// [`VehicleModel`](super::VehicleModel).
///
/// `code_name` is unique across all projects. Outside the id-only view,
/// projects are never written directly: the write-path orchestrator creates
/// and deletes them as a side effect of vehicle-model writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub code_name: String,
}

/// Input for creating a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub code_name: String,
}
