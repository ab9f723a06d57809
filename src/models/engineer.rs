use serde::{Deserialize, Serialize};

/// An engineer and the set of vehicle models they work on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Engineer {
    pub id: i64,
    pub name: String,
    /// Ids of the models this engineer works on.
    pub works_on: Vec<i64>,
}

/// Input for creating an engineer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEngineerInput {
    pub name: String,
    #[serde(default)]
    pub works_on: Vec<i64>,
}

/// One arm of a "match any of these field combinations" engineer lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineerFilter {
    pub name: Option<String>,
}
