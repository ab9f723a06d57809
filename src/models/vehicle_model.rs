use serde::{Deserialize, Serialize};

/// A vehicle model and the ids of its related records.
///
/// Relations are stored as ids here; the nested graph codec decides per view
/// whether they are rendered as ids, natural keys, or embedded objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleModel {
    pub id: i64,
    pub model: String,
    pub year: i32,
    /// Exclusively owned project, if any. At most one live model points at a
    /// given project.
    pub project: Option<i64>,
    pub maker: Option<i64>,
    pub predecessor: Option<i64>,
    pub engine_options: Vec<i64>,
}

/// The project entry of a decoded vehicle-model document.
///
/// In the id-only view the caller supplies a raw id; in the nested and
/// natural-key views the codec carries the code name through unresolved and
/// the write-path orchestrator decides whether it means "create" or
/// "replace".
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProjectField {
    /// Field not present in the document; leave the association untouched.
    #[default]
    Absent,
    /// Explicit id (or null) supplied by the caller.
    Id(Option<i64>),
    /// Code name awaiting create-or-replace by the orchestrator.
    Pending(String),
}

/// Validated, partially-resolved output of a vehicle-model decode.
///
/// Scalar fields are `None` when absent (allowed only for partial updates).
/// Relation fields other than `project` are already resolved to reference
/// sets by the codec; `Some(None)` on a to-one relation means the caller
/// explicitly cleared it.
#[derive(Debug, Clone, Default)]
pub struct ModelDraft {
    pub model: Option<String>,
    pub year: Option<i32>,
    pub maker: Option<Option<i64>>,
    pub predecessor: Option<Option<i64>>,
    pub project: ProjectField,
    pub engine_options: Option<Vec<i64>>,
    /// Engineers to associate with the model (full-nested view only).
    pub engineers: Option<Vec<i64>>,
}
