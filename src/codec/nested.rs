//! Nested graph codec for vehicle models.
//!
//! One configurable encoder/decoder, parameterized by a declared
//! field-exposure table. Each supported document shape is a fixed
//! [`ViewConfig`] naming, per relation, how it appears on the wire
//! (embedded object, bare natural key, or raw id) and whether it accepts
//! writes. The synthetic `project_code_name` field of the natural-key view
//! is just the `project` entry's wire name, so the rename is bidirectional
//! by construction.
//!
//! Encoding is pure and non-destructive. Decoding performs store reads only
//! (natural-key resolution) and raises an aggregated `ValidationError`
//! before any lookup, so a rejected document never touches the store.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::flat::FieldReader;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::*;

/// How a relation is rendered on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exposure {
    /// Full embedded object(s).
    Embed,
    /// Bare natural-key value (manufacturer name, project code name).
    NaturalKey,
    /// Raw store id(s).
    IdOnly,
}

/// One relation's entry in a view's exposure table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name in the JSON document.
    pub wire: &'static str,
    pub exposure: Exposure,
    pub writable: bool,
}

/// Declared exposure of every vehicle-model relation for one view.
pub struct ViewConfig {
    pub maker: FieldSpec,
    pub project: FieldSpec,
    pub engine_options: FieldSpec,
    /// Reverse vehicle set; present only in the full-nested view, read-only.
    pub vehicles: Option<FieldSpec>,
    /// Reverse engineer set; present only in the full-nested view.
    pub engineers: Option<FieldSpec>,
}

/// Default shape: no relation expansion, everything round-trips as ids.
/// The project is caller-supplied and never auto-managed.
const ID_ONLY: ViewConfig = ViewConfig {
    maker: FieldSpec {
        wire: "maker",
        exposure: Exposure::IdOnly,
        writable: true,
    },
    project: FieldSpec {
        wire: "project",
        exposure: Exposure::IdOnly,
        writable: true,
    },
    engine_options: FieldSpec {
        wire: "engine_options",
        exposure: Exposure::IdOnly,
        writable: true,
    },
    vehicles: None,
    engineers: None,
};

/// Every relation embedded as full objects, including the reverse sets.
const NESTED: ViewConfig = ViewConfig {
    maker: FieldSpec {
        wire: "maker",
        exposure: Exposure::Embed,
        writable: true,
    },
    project: FieldSpec {
        wire: "project",
        exposure: Exposure::Embed,
        writable: true,
    },
    engine_options: FieldSpec {
        wire: "engine_options",
        exposure: Exposure::Embed,
        writable: true,
    },
    vehicles: Some(FieldSpec {
        wire: "vehicles",
        exposure: Exposure::Embed,
        writable: false,
    }),
    engineers: Some(FieldSpec {
        wire: "engineers_responsible",
        exposure: Exposure::Embed,
        writable: true,
    }),
};

/// Natural-key projection: maker as its bare name, project as the synthetic
/// `project_code_name` string, everything else as ids.
const NAMES: ViewConfig = ViewConfig {
    maker: FieldSpec {
        wire: "maker",
        exposure: Exposure::NaturalKey,
        writable: true,
    },
    project: FieldSpec {
        wire: "project_code_name",
        exposure: Exposure::NaturalKey,
        writable: true,
    },
    engine_options: FieldSpec {
        wire: "engine_options",
        exposure: Exposure::IdOnly,
        writable: true,
    },
    vehicles: None,
    engineers: None,
};

/// Which document shape a request wants, selected by the `view` query
/// parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelView {
    #[default]
    Ids,
    Nested,
    Names,
}

impl ModelView {
    pub fn config(self) -> &'static ViewConfig {
        match self {
            ModelView::Ids => &ID_ONLY,
            ModelView::Nested => &NESTED,
            ModelView::Names => &NAMES,
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::Internal(e.into()))
}

// ============================================================
// Encode
// ============================================================

/// Serialize a model and the declared subset of its relations into one
/// JSON document.
pub fn encode_model(db: &Database, m: &VehicleModel, view: ModelView) -> Result<Value> {
    let cfg = view.config();
    let mut doc = Map::new();
    doc.insert("id".into(), m.id.into());
    doc.insert("model".into(), m.model.clone().into());
    doc.insert("year".into(), m.year.into());
    // The self-reference is never expanded; a document embedding its whole
    // predecessor chain would be unbounded.
    doc.insert("predecessor".into(), to_json(&m.predecessor)?);

    let maker = match cfg.maker.exposure {
        Exposure::IdOnly => to_json(&m.maker)?,
        Exposure::Embed => match m.maker {
            Some(id) => match db.get_manufacturer(id)? {
                Some(maker) => to_json(&maker)?,
                None => Value::Null,
            },
            None => Value::Null,
        },
        Exposure::NaturalKey => match m.maker {
            Some(id) => db
                .get_manufacturer(id)?
                .map_or(Value::Null, |maker| maker.name.into()),
            None => Value::Null,
        },
    };
    doc.insert(cfg.maker.wire.into(), maker);

    let project = match cfg.project.exposure {
        Exposure::IdOnly => to_json(&m.project)?,
        Exposure::Embed => match m.project {
            Some(id) => match db.get_project(id)? {
                Some(project) => to_json(&project)?,
                None => Value::Null,
            },
            None => Value::Null,
        },
        Exposure::NaturalKey => match m.project {
            Some(id) => db
                .get_project(id)?
                .map_or(Value::Null, |project| project.code_name.into()),
            None => Value::Null,
        },
    };
    doc.insert(cfg.project.wire.into(), project);

    let engines = match cfg.engine_options.exposure {
        Exposure::Embed => {
            let mut embedded = Vec::with_capacity(m.engine_options.len());
            for id in &m.engine_options {
                if let Some(engine) = db.get_engine(*id)? {
                    embedded.push(to_json(&engine)?);
                }
            }
            Value::Array(embedded)
        }
        _ => to_json(&m.engine_options)?,
    };
    doc.insert(cfg.engine_options.wire.into(), engines);

    if let Some(spec) = &cfg.vehicles {
        let vehicles = db.get_vehicles_for_model(m.id)?;
        doc.insert(spec.wire.into(), to_json(&vehicles)?);
    }
    if let Some(spec) = &cfg.engineers {
        let engineers = db.get_engineers_for_model(m.id)?;
        doc.insert(spec.wire.into(), to_json(&engineers)?);
    }

    Ok(Value::Object(doc))
}

// ============================================================
// Decode
// ============================================================

/// Parse and validate a vehicle-model document into a [`ModelDraft`].
///
/// `partial` relaxes the scalar required-field checks for PATCH requests.
/// Shape errors are aggregated first; natural-key resolution (store reads)
/// runs only on a structurally valid document.
pub fn decode_model(
    db: &Database,
    value: &Value,
    view: ModelView,
    partial: bool,
) -> Result<ModelDraft> {
    let cfg = view.config();
    let mut r = FieldReader::new(value)?;
    let mut draft = ModelDraft::default();

    if r.has("model") || !partial {
        draft.model = Some(r.require_str("model"));
    }
    if r.has("year") || !partial {
        draft.year = Some(r.require_i32("year"));
    }
    if r.has("predecessor") {
        draft.predecessor = Some(r.opt_id("predecessor"));
    }

    // Relation payloads are shape-checked here and resolved after finish().
    let mut maker_name: Option<String> = None;
    if cfg.maker.writable {
        match (cfg.maker.exposure, r.get(cfg.maker.wire)) {
            (_, None) => {}
            (_, Some(Value::Null)) => draft.maker = Some(None),
            (Exposure::IdOnly, Some(_)) => draft.maker = Some(r.opt_id(cfg.maker.wire)),
            (Exposure::Embed, Some(Value::Object(sub))) => match sub.get("name") {
                Some(Value::String(name)) => maker_name = Some(name.clone()),
                _ => r.error(cfg.maker.wire, "embedded manufacturer requires a name"),
            },
            (Exposure::Embed, Some(_)) => r.error(cfg.maker.wire, "expected an object"),
            (Exposure::NaturalKey, Some(Value::String(name))) => maker_name = Some(name.clone()),
            (Exposure::NaturalKey, Some(_)) => r.error(cfg.maker.wire, "expected a string"),
        }
    }

    if cfg.project.writable {
        match (cfg.project.exposure, r.get(cfg.project.wire)) {
            (_, None) => {}
            (_, Some(Value::Null)) => draft.project = ProjectField::Id(None),
            (Exposure::IdOnly, Some(_)) => {
                draft.project = ProjectField::Id(r.opt_id(cfg.project.wire));
            }
            (Exposure::Embed, Some(Value::Object(sub))) => match sub.get("code_name") {
                Some(Value::String(code_name)) => {
                    draft.project = ProjectField::Pending(code_name.clone());
                }
                _ => r.error(cfg.project.wire, "embedded project requires a code_name"),
            },
            (Exposure::Embed, Some(_)) => r.error(cfg.project.wire, "expected an object"),
            (Exposure::NaturalKey, Some(Value::String(code_name))) => {
                draft.project = ProjectField::Pending(code_name.clone());
            }
            (Exposure::NaturalKey, Some(_)) => r.error(cfg.project.wire, "expected a string"),
        }
    }

    let mut engine_filters: Option<Vec<EngineFilter>> = None;
    if cfg.engine_options.writable && r.has(cfg.engine_options.wire) {
        match cfg.engine_options.exposure {
            Exposure::Embed => {
                engine_filters = Some(read_filter_array(
                    &mut r,
                    cfg.engine_options.wire,
                    read_engine_filter,
                ));
            }
            _ => draft.engine_options = Some(r.id_array(cfg.engine_options.wire)),
        }
    }

    let mut engineer_filters: Option<Vec<EngineerFilter>> = None;
    if let Some(spec) = cfg.engineers {
        if spec.writable && r.has(spec.wire) {
            engineer_filters = Some(read_filter_array(&mut r, spec.wire, read_engineer_filter));
        }
    }
    // The reverse vehicle set is read-only; anything supplied for it is
    // ignored on write.

    r.finish()?;

    // Resolution phase: store reads only.
    if let Some(name) = maker_name {
        draft.maker = Some(Some(resolve_maker(db, &name)?));
    }
    if let Some(filters) = engine_filters {
        let engines = db.filter_engines(&filters)?;
        draft.engine_options = Some(engines.into_iter().map(|e| e.id).collect());
    }
    if let Some(filters) = engineer_filters {
        let engineers = db.filter_engineers(&filters)?;
        draft.engineers = Some(engineers.into_iter().map(|e| e.id).collect());
    }

    Ok(draft)
}

/// Strict to-one natural-key resolution: exactly one match or `NotFound`.
/// Zero matches and ambiguous names both fail; a lookup never guesses.
fn resolve_maker(db: &Database, name: &str) -> Result<i64> {
    let matches = db.find_manufacturers_by_name(name)?;
    match matches.as_slice() {
        [maker] => Ok(maker.id),
        [] => Err(Error::not_found(format!("manufacturer '{name}' not found"))),
        _ => Err(Error::not_found(format!(
            "manufacturer '{name}' is ambiguous"
        ))),
    }
}

fn read_filter_array<T>(
    r: &mut FieldReader,
    field: &str,
    read_one: impl Fn(&Map<String, Value>) -> Option<T>,
) -> Vec<T> {
    let Some(Value::Array(items)) = r.get(field) else {
        r.error(field, "expected an array of objects");
        return Vec::new();
    };
    let mut filters = Vec::with_capacity(items.len());
    for item in items {
        match item.as_object().and_then(&read_one) {
            Some(filter) => filters.push(filter),
            None => r.error(field, "each entry must be an object with known fields"),
        }
    }
    filters
}

fn read_engine_filter(sub: &Map<String, Value>) -> Option<EngineFilter> {
    let mut filter = EngineFilter::default();
    if let Some(Value::String(name)) = sub.get("name") {
        filter.name = Some(name.clone());
    }
    if let Some(displacement) = sub.get("displacement").and_then(Value::as_f64) {
        filter.displacement = Some(displacement);
    }
    if filter.name.is_none() && filter.displacement.is_none() {
        return None;
    }
    Some(filter)
}

fn read_engineer_filter(sub: &Map<String, Value>) -> Option<EngineerFilter> {
    match sub.get("name") {
        Some(Value::String(name)) => Some(EngineerFilter {
            name: Some(name.clone()),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_defaults_to_ids() {
        assert_eq!(ModelView::default(), ModelView::Ids);
    }

    #[test]
    fn names_view_uses_synthetic_project_field() {
        let cfg = ModelView::Names.config();
        assert_eq!(cfg.project.wire, "project_code_name");
        assert_eq!(cfg.project.exposure, Exposure::NaturalKey);
    }

    #[test]
    fn nested_view_keeps_vehicle_set_read_only() {
        let cfg = ModelView::Nested.config();
        let vehicles = cfg.vehicles.expect("nested view embeds vehicles");
        assert!(!vehicles.writable);
    }
}
