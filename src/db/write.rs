//! Write path for vehicle models.
//!
//! A model write can carry side effects a flat row write cannot: creating
//! the dependent project, replacing it on rename, and rewriting the
//! many-to-many join sets. Each operation here runs inside one transaction
//! so a failure partway (most often a project code-name collision) leaves
//! no orphaned project and no partially-updated model.

use rusqlite::Transaction;

use super::{get_model_on, get_project_on, Database};
use crate::error::{Error, Result};
use crate::models::{ModelDraft, ProjectField, VehicleModel};

impl Database {
    /// Create a vehicle model from a validated draft.
    ///
    /// A pending project (embedded sub-map or bare code name) is created
    /// first and the model references the new row. All other relations
    /// arrive already resolved to id sets.
    pub fn create_vehicle_model(&self, draft: ModelDraft) -> Result<VehicleModel> {
        let model = draft
            .model
            .ok_or_else(|| Error::validation("model", "field is required"))?;
        let year = draft
            .year
            .ok_or_else(|| Error::validation("year", "field is required"))?;

        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let project_id = match draft.project {
            ProjectField::Absent => None,
            ProjectField::Id(id) => {
                if let Some(id) = id {
                    ensure_project_exists(&tx, id)?;
                }
                id
            }
            ProjectField::Pending(code_name) => Some(insert_project(&tx, &code_name)?),
        };

        tx.execute(
            "INSERT INTO vehicle_models (model, year, project_id, maker_id, predecessor_id)
             VALUES (?, ?, ?, ?, ?)",
            (
                &model,
                year,
                project_id,
                draft.maker.flatten(),
                draft.predecessor.flatten(),
            ),
        )?;
        let id = tx.last_insert_rowid();

        if let Some(engines) = &draft.engine_options {
            replace_engine_set(&tx, id, engines)?;
        }
        if let Some(engineers) = &draft.engineers {
            replace_engineer_set(&tx, id, engineers)?;
        }

        let created = get_model_on(&tx, id)?
            .ok_or_else(|| Error::Internal(anyhow::anyhow!("created model {id} missing")))?;
        tx.commit()?;
        Ok(created)
    }

    /// Apply a validated draft to an existing model.
    ///
    /// A pending project whose code name differs from the current one is
    /// replaced wholesale: the old project row is deleted and a fresh one
    /// created, since projects expose no independent update path. An equal
    /// code name performs no project write at all.
    pub fn update_vehicle_model(
        &self,
        existing: VehicleModel,
        draft: ModelDraft,
    ) -> Result<VehicleModel> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let project_id = match draft.project {
            ProjectField::Absent => existing.project,
            ProjectField::Id(id) => {
                if let Some(id) = id {
                    ensure_project_exists(&tx, id)?;
                }
                id
            }
            ProjectField::Pending(code_name) => {
                let current = match existing.project {
                    Some(id) => get_project_on(&tx, id)?,
                    None => None,
                };
                match current {
                    Some(current) if current.code_name == code_name => Some(current.id),
                    current => {
                        if let Some(current) = current {
                            // ON DELETE SET NULL clears the model's pointer;
                            // the UPDATE below repoints it at the new row.
                            tx.execute("DELETE FROM projects WHERE id = ?", [current.id])?;
                        }
                        Some(insert_project(&tx, &code_name)?)
                    }
                }
            }
        };

        let model = draft.model.unwrap_or(existing.model);
        let year = draft.year.unwrap_or(existing.year);
        let maker = draft.maker.unwrap_or(existing.maker);
        let predecessor = draft.predecessor.unwrap_or(existing.predecessor);

        tx.execute(
            "UPDATE vehicle_models
             SET model = ?, year = ?, project_id = ?, maker_id = ?, predecessor_id = ?
             WHERE id = ?",
            (&model, year, project_id, maker, predecessor, existing.id),
        )?;

        if let Some(engines) = &draft.engine_options {
            replace_engine_set(&tx, existing.id, engines)?;
        }
        if let Some(engineers) = &draft.engineers {
            replace_engineer_set(&tx, existing.id, engineers)?;
        }

        let updated = get_model_on(&tx, existing.id)?.ok_or_else(|| {
            Error::Internal(anyhow::anyhow!("updated model {} missing", existing.id))
        })?;
        tx.commit()?;
        Ok(updated)
    }
}

fn ensure_project_exists(tx: &Transaction, id: i64) -> Result<()> {
    if get_project_on(tx, id)?.is_none() {
        return Err(Error::not_found(format!("project {id} not found")));
    }
    Ok(())
}

fn insert_project(tx: &Transaction, code_name: &str) -> Result<i64> {
    tx.execute("INSERT INTO projects (code_name) VALUES (?)", [code_name])?;
    Ok(tx.last_insert_rowid())
}

fn replace_engine_set(tx: &Transaction, model_id: i64, engine_ids: &[i64]) -> Result<()> {
    tx.execute("DELETE FROM model_engines WHERE model_id = ?", [model_id])?;
    for engine_id in engine_ids {
        tx.execute(
            "INSERT OR IGNORE INTO model_engines (model_id, engine_id) VALUES (?, ?)",
            (model_id, engine_id),
        )?;
    }
    Ok(())
}

fn replace_engineer_set(tx: &Transaction, model_id: i64, engineer_ids: &[i64]) -> Result<()> {
    tx.execute("DELETE FROM engineer_models WHERE model_id = ?", [model_id])?;
    for engineer_id in engineer_ids {
        tx.execute(
            "INSERT OR IGNORE INTO engineer_models (engineer_id, model_id) VALUES (?, ?)",
            (engineer_id, model_id),
        )?;
    }
    Ok(())
}
