//! Flat entity codec: validating decode from raw JSON field maps.
//!
//! Encoding is each entity's serde `Serialize` impl (all declared fields,
//! primitive values only). This module owns the write direction: type
//! coercion and required-field checks, with every offending field reported
//! in one aggregated `ValidationError`. No relation traversal happens here.

use serde_json::{Map, Value};

use crate::error::{Error, FieldError, Result};
use crate::models::*;

/// Walks a JSON object collecting field errors instead of failing fast.
///
/// Accessors return placeholder values on error; `finish` fails whenever any
/// placeholder was handed out, so placeholders never escape a successful
/// decode.
pub(crate) struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    pub fn new(value: &'a Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::validation("body", "expected a JSON object"))?;
        Ok(Self {
            map,
            errors: Vec::new(),
        })
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn has(&self, field: &str) -> bool {
        self.map.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field)
    }

    pub fn require_str(&mut self, field: &str) -> String {
        match self.map.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                self.error(field, "expected a string");
                String::new()
            }
            None => {
                self.error(field, "field is required");
                String::new()
            }
        }
    }

    /// Required integer; numeric strings are coerced.
    pub fn require_i64(&mut self, field: &str) -> i64 {
        match self.map.get(field) {
            Some(value) => self.coerce_i64(field, value).unwrap_or(0),
            None => {
                self.error(field, "field is required");
                0
            }
        }
    }

    /// Required 32-bit integer; values outside the i32 range are rejected
    /// rather than truncated.
    pub fn require_i32(&mut self, field: &str) -> i32 {
        let value = self.require_i64(field);
        match i32::try_from(value) {
            Ok(i) => i,
            Err(_) => {
                self.error(field, "expected a 32-bit integer");
                0
            }
        }
    }

    /// Required float; integers and numeric strings are coerced.
    pub fn require_f64(&mut self, field: &str) -> f64 {
        match self.map.get(field) {
            Some(value) => self.coerce_f64(field, value).unwrap_or(0.0),
            None => {
                self.error(field, "field is required");
                0.0
            }
        }
    }

    /// Optional to-one reference id. Absent and null both decode to `None`.
    pub fn opt_id(&mut self, field: &str) -> Option<i64> {
        match self.map.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.coerce_i64(field, value),
        }
    }

    /// Id array for a many-to-many reference set; absent means empty.
    pub fn id_array(&mut self, field: &str) -> Vec<i64> {
        match self.map.get(field) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| self.coerce_i64(field, item))
                .collect(),
            Some(_) => {
                self.error(field, "expected an array of ids");
                Vec::new()
            }
        }
    }

    fn coerce_i64(&mut self, field: &str, value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(i),
                None => {
                    self.error(field, "expected an integer");
                    None
                }
            },
            Value::String(s) => match s.parse::<i64>() {
                Ok(i) => Some(i),
                Err(_) => {
                    self.error(field, "expected an integer");
                    None
                }
            },
            _ => {
                self.error(field, "expected an integer");
                None
            }
        }
    }

    fn coerce_f64(&mut self, field: &str, value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(f) => Some(f),
                None => {
                    self.error(field, "expected a number");
                    None
                }
            },
            Value::String(s) => match s.parse::<f64>() {
                Ok(f) => Some(f),
                Err(_) => {
                    self.error(field, "expected a number");
                    None
                }
            },
            _ => {
                self.error(field, "expected a number");
                None
            }
        }
    }

    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self.errors))
        }
    }
}

pub fn decode_manufacturer(value: &Value) -> Result<CreateManufacturerInput> {
    let mut r = FieldReader::new(value)?;
    let name = r.require_str("name");
    r.finish()?;
    Ok(CreateManufacturerInput { name })
}

pub fn decode_engine(value: &Value) -> Result<CreateEngineInput> {
    let mut r = FieldReader::new(value)?;
    let name = r.require_str("name");
    let displacement = r.require_f64("displacement");
    r.finish()?;
    Ok(CreateEngineInput { name, displacement })
}

pub fn decode_project(value: &Value) -> Result<CreateProjectInput> {
    let mut r = FieldReader::new(value)?;
    let code_name = r.require_str("code_name");
    r.finish()?;
    Ok(CreateProjectInput { code_name })
}

pub fn decode_vehicle(value: &Value) -> Result<CreateVehicleInput> {
    let mut r = FieldReader::new(value)?;
    let vin = r.require_str("VIN");
    let model = r.require_i64("model");
    r.finish()?;
    Ok(CreateVehicleInput { vin, model })
}

pub fn decode_engineer(value: &Value) -> Result<CreateEngineerInput> {
    let mut r = FieldReader::new(value)?;
    let name = r.require_str("name");
    let works_on = r.id_array("works_on");
    r.finish()?;
    Ok(CreateEngineerInput { name, works_on })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_engine_accepts_valid_input() {
        let input = decode_engine(&json!({"name": "V6", "displacement": 3.0})).unwrap();
        assert_eq!(input.name, "V6");
        assert_eq!(input.displacement, 3.0);
    }

    #[test]
    fn decode_engine_coerces_numeric_strings() {
        let input = decode_engine(&json!({"name": "V8", "displacement": "4.4"})).unwrap();
        assert_eq!(input.displacement, 4.4);
    }

    #[test]
    fn decode_engine_aggregates_all_field_errors() {
        let err = decode_engine(&json!({"displacement": "not a number"})).unwrap_err();
        match err {
            crate::error::Error::Validation(fields) => {
                let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["name", "displacement"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn require_i32_rejects_out_of_range_values() {
        let value = json!({"year": 9_999_999_999i64});
        let mut r = FieldReader::new(&value).unwrap();
        r.require_i32("year");
        assert!(r.finish().is_err());
    }

    #[test]
    fn decode_rejects_non_object() {
        assert!(decode_manufacturer(&json!("Saab")).is_err());
    }

    #[test]
    fn decode_vehicle_uses_wire_field_names() {
        let input = decode_vehicle(&json!({"VIN": "YS3DD55H123456789", "model": 7})).unwrap();
        assert_eq!(input.vin, "YS3DD55H123456789");
        assert_eq!(input.model, 7);
    }

    #[test]
    fn decode_engineer_defaults_to_empty_works_on() {
        let input = decode_engineer(&json!({"name": "Nilsson"})).unwrap();
        assert!(input.works_on.is_empty());
    }
}
