use serde::{Deserialize, Serialize};

/// A vehicle manufacturer.
///
/// The name doubles as the natural key when nested writes resolve an
/// embedded or bare-string `maker` against the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
}

/// Input for creating a manufacturer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateManufacturerInput {
    pub name: String,
}
