//! Serialization layer: the flat entity codec and the nested graph codec.

pub mod flat;
mod nested;

pub use nested::{decode_model, encode_model, Exposure, FieldSpec, ModelView, ViewConfig};
