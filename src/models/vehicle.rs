use serde::{Deserialize, Serialize};

/// A concrete build of a vehicle model, identified by VIN.
///
/// Vehicles are deleted when their model is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub id: i64,
    #[serde(rename = "VIN")]
    pub vin: String,
    pub model: i64,
}

/// Input for creating a vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVehicleInput {
    #[serde(rename = "VIN")]
    pub vin: String,
    pub model: i64,
}
