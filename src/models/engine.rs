use serde::{Deserialize, Serialize};

/// An engine available as an option on vehicle models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Engine {
    pub id: i64,
    pub name: String,
    pub displacement: f64,
}

/// Input for creating an engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEngineInput {
    pub name: String,
    pub displacement: f64,
}

/// One arm of a "match any of these field combinations" engine lookup.
///
/// All present fields must match (equality conjunction); arms are combined
/// with OR and the result is the union of every arm's matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineFilter {
    pub name: Option<String>,
    pub displacement: Option<f64>,
}
