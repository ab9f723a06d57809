mod schema;
mod write;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use rusqlite::Connection;

use crate::error::Result;
use crate::models::*;

/// The entity store.
///
/// All access goes through a single SQLite connection behind a mutex;
/// multi-step writes (the vehicle-model orchestrator in [`write`]) take the
/// lock once and run inside one transaction.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent).map_err(anyhow::Error::from)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        if let Ok(path) = std::env::var("CARMAKER_DB") {
            return Self::open(PathBuf::from(path));
        }
        let dirs = directories::ProjectDirs::from("", "", "carmaker")
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("carmaker.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)?;
        Ok(())
    }

    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    // ============================================================
    // Manufacturer operations
    // ============================================================

    pub fn get_all_manufacturers(&self) -> Result<Vec<Manufacturer>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, name FROM manufacturers ORDER BY id")?;
        let makers = stmt
            .query_map([], |row| {
                Ok(Manufacturer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(makers)
    }

    pub fn get_manufacturer(&self, id: i64) -> Result<Option<Manufacturer>> {
        let conn = self.lock();
        get_manufacturer_on(&conn, id).map_err(Into::into)
    }

    /// Natural-key lookup: every manufacturer whose name matches exactly.
    pub fn find_manufacturers_by_name(&self, name: &str) -> Result<Vec<Manufacturer>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT id, name FROM manufacturers WHERE name = ? ORDER BY id")?;
        let makers = stmt
            .query_map([name], |row| {
                Ok(Manufacturer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(makers)
    }

    pub fn create_manufacturer(&self, input: CreateManufacturerInput) -> Result<Manufacturer> {
        let conn = self.lock();
        conn.execute("INSERT INTO manufacturers (name) VALUES (?)", [&input.name])?;
        Ok(Manufacturer {
            id: conn.last_insert_rowid(),
            name: input.name,
        })
    }

    pub fn delete_manufacturer(&self, id: i64) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM manufacturers WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Engine operations
    // ============================================================

    pub fn get_all_engines(&self) -> Result<Vec<Engine>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, name, displacement FROM engines ORDER BY id")?;
        let engines = stmt
            .query_map([], engine_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(engines)
    }

    pub fn get_engine(&self, id: i64) -> Result<Option<Engine>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, name, displacement FROM engines WHERE id = ?")?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(engine_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// "Match any of these field combinations": each filter arm is an
    /// equality conjunction over its present fields, arms are ORed together,
    /// and the union of matches is returned. Arms that match nothing (or
    /// carry no fields) contribute nothing; no arm-count validation happens
    /// here.
    pub fn filter_engines(&self, filters: &[EngineFilter]) -> Result<Vec<Engine>> {
        let mut arms = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        for filter in filters {
            let mut conj = Vec::new();
            if let Some(name) = &filter.name {
                conj.push("name = ?");
                params.push(Box::new(name.clone()));
            }
            if let Some(displacement) = filter.displacement {
                conj.push("displacement = ?");
                params.push(Box::new(displacement));
            }
            if !conj.is_empty() {
                arms.push(format!("({})", conj.join(" AND ")));
            }
        }

        if arms.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock();
        let sql = format!(
            "SELECT id, name, displacement FROM engines WHERE {} ORDER BY id",
            arms.join(" OR ")
        );
        let mut stmt = conn.prepare(&sql)?;
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let engines = stmt
            .query_map(params_ref.as_slice(), engine_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(engines)
    }

    pub fn create_engine(&self, input: CreateEngineInput) -> Result<Engine> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO engines (name, displacement) VALUES (?, ?)",
            (&input.name, input.displacement),
        )?;
        Ok(Engine {
            id: conn.last_insert_rowid(),
            name: input.name,
            displacement: input.displacement,
        })
    }

    pub fn delete_engine(&self, id: i64) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM engines WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_all_projects(&self) -> Result<Vec<Project>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, code_name FROM projects ORDER BY id")?;
        let projects = stmt
            .query_map([], |row| {
                Ok(Project {
                    id: row.get(0)?,
                    code_name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let conn = self.lock();
        get_project_on(&conn, id).map_err(Into::into)
    }

    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO projects (code_name) VALUES (?)",
            [&input.code_name],
        )?;
        Ok(Project {
            id: conn.last_insert_rowid(),
            code_name: input.code_name,
        })
    }

    pub fn delete_project(&self, id: i64) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Vehicle model operations
    // ============================================================

    pub fn get_all_models(&self) -> Result<Vec<VehicleModel>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, model, year, project_id, maker_id, predecessor_id
             FROM vehicle_models ORDER BY id",
        )?;
        let mut models = stmt
            .query_map([], model_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for model in &mut models {
            model.engine_options = load_engine_ids(&conn, model.id)?;
        }
        Ok(models)
    }

    pub fn get_model(&self, id: i64) -> Result<Option<VehicleModel>> {
        let conn = self.lock();
        get_model_on(&conn, id).map_err(Into::into)
    }

    pub fn delete_model(&self, id: i64) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM vehicle_models WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // Vehicle-model creates and updates carry cross-entity side effects and
    // live in `write.rs`.

    // ============================================================
    // Vehicle operations
    // ============================================================

    pub fn get_all_vehicles(&self) -> Result<Vec<Vehicle>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, vin, model_id FROM vehicles ORDER BY id")?;
        let vehicles = stmt
            .query_map([], vehicle_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(vehicles)
    }

    pub fn get_vehicle(&self, id: i64) -> Result<Option<Vehicle>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, vin, model_id FROM vehicles WHERE id = ?")?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(vehicle_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_vehicles_for_model(&self, model_id: i64) -> Result<Vec<Vehicle>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT id, vin, model_id FROM vehicles WHERE model_id = ? ORDER BY id")?;
        let vehicles = stmt
            .query_map([model_id], vehicle_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(vehicles)
    }

    pub fn create_vehicle(&self, input: CreateVehicleInput) -> Result<Vehicle> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO vehicles (vin, model_id) VALUES (?, ?)",
            (&input.vin, input.model),
        )?;
        Ok(Vehicle {
            id: conn.last_insert_rowid(),
            vin: input.vin,
            model: input.model,
        })
    }

    pub fn delete_vehicle(&self, id: i64) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM vehicles WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Engineer operations
    // ============================================================

    pub fn get_all_engineers(&self) -> Result<Vec<Engineer>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, name FROM engineers ORDER BY id")?;
        let mut engineers = stmt
            .query_map([], |row| {
                Ok(Engineer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    works_on: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for engineer in &mut engineers {
            engineer.works_on = load_works_on(&conn, engineer.id)?;
        }
        Ok(engineers)
    }

    pub fn get_engineer(&self, id: i64) -> Result<Option<Engineer>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, name FROM engineers WHERE id = ?")?;
        let mut rows = stmt.query([id])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut engineer = Engineer {
            id: row.get(0)?,
            name: row.get(1)?,
            works_on: Vec::new(),
        };
        drop(rows);
        drop(stmt);
        engineer.works_on = load_works_on(&conn, engineer.id)?;
        Ok(Some(engineer))
    }

    /// Engineers associated with a model, each with their full `works_on` set.
    pub fn get_engineers_for_model(&self, model_id: i64) -> Result<Vec<Engineer>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT e.id, e.name FROM engineers e
             JOIN engineer_models em ON em.engineer_id = e.id
             WHERE em.model_id = ? ORDER BY e.id",
        )?;
        let mut engineers = stmt
            .query_map([model_id], |row| {
                Ok(Engineer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    works_on: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for engineer in &mut engineers {
            engineer.works_on = load_works_on(&conn, engineer.id)?;
        }
        Ok(engineers)
    }

    /// Same "match any of" union semantics as [`Database::filter_engines`].
    pub fn filter_engineers(&self, filters: &[EngineerFilter]) -> Result<Vec<Engineer>> {
        let names: Vec<&String> = filters.iter().filter_map(|f| f.name.as_ref()).collect();
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock();
        let placeholders = vec!["name = ?"; names.len()].join(" OR ");
        let sql = format!("SELECT id, name FROM engineers WHERE {placeholders} ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let params_ref: Vec<&dyn rusqlite::ToSql> =
            names.iter().map(|n| n as &dyn rusqlite::ToSql).collect();
        let mut engineers = stmt
            .query_map(params_ref.as_slice(), |row| {
                Ok(Engineer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    works_on: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        for engineer in &mut engineers {
            engineer.works_on = load_works_on(&conn, engineer.id)?;
        }
        Ok(engineers)
    }

    pub fn create_engineer(&self, input: CreateEngineerInput) -> Result<Engineer> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute("INSERT INTO engineers (name) VALUES (?)", [&input.name])?;
        let id = tx.last_insert_rowid();
        for model_id in &input.works_on {
            tx.execute(
                "INSERT OR IGNORE INTO engineer_models (engineer_id, model_id) VALUES (?, ?)",
                (id, model_id),
            )?;
        }
        tx.commit()?;
        Ok(Engineer {
            id,
            name: input.name,
            works_on: input.works_on,
        })
    }

    pub fn delete_engineer(&self, id: i64) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM engineers WHERE id = ?", [id])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

// ============================================================
// Row mapping and shared loaders
//
// These take a plain `&Connection` so the orchestrator can reuse them on a
// transaction while the mutex is held.
// ============================================================

fn engine_from_row(row: &rusqlite::Row) -> rusqlite::Result<Engine> {
    Ok(Engine {
        id: row.get(0)?,
        name: row.get(1)?,
        displacement: row.get(2)?,
    })
}

fn vehicle_from_row(row: &rusqlite::Row) -> rusqlite::Result<Vehicle> {
    Ok(Vehicle {
        id: row.get(0)?,
        vin: row.get(1)?,
        model: row.get(2)?,
    })
}

fn model_from_row(row: &rusqlite::Row) -> rusqlite::Result<VehicleModel> {
    Ok(VehicleModel {
        id: row.get(0)?,
        model: row.get(1)?,
        year: row.get(2)?,
        project: row.get(3)?,
        maker: row.get(4)?,
        predecessor: row.get(5)?,
        engine_options: Vec::new(),
    })
}

fn load_engine_ids(conn: &Connection, model_id: i64) -> rusqlite::Result<Vec<i64>> {
    let mut stmt =
        conn.prepare("SELECT engine_id FROM model_engines WHERE model_id = ? ORDER BY engine_id")?;
    let ids = stmt
        .query_map([model_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

fn load_works_on(conn: &Connection, engineer_id: i64) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn
        .prepare("SELECT model_id FROM engineer_models WHERE engineer_id = ? ORDER BY model_id")?;
    let ids = stmt
        .query_map([engineer_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

pub(crate) fn get_model_on(conn: &Connection, id: i64) -> rusqlite::Result<Option<VehicleModel>> {
    let mut stmt = conn.prepare(
        "SELECT id, model, year, project_id, maker_id, predecessor_id
         FROM vehicle_models WHERE id = ?",
    )?;
    let mut rows = stmt.query([id])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    let mut model = model_from_row(row)?;
    drop(rows);
    drop(stmt);
    model.engine_options = load_engine_ids(conn, id)?;
    Ok(Some(model))
}

pub(crate) fn get_project_on(conn: &Connection, id: i64) -> rusqlite::Result<Option<Project>> {
    let mut stmt = conn.prepare("SELECT id, code_name FROM projects WHERE id = ?")?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(Project {
            id: row.get(0)?,
            code_name: row.get(1)?,
        })),
        None => Ok(None),
    }
}

pub(crate) fn get_manufacturer_on(
    conn: &Connection,
    id: i64,
) -> rusqlite::Result<Option<Manufacturer>> {
    let mut stmt = conn.prepare("SELECT id, name FROM manufacturers WHERE id = ?")?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(Manufacturer {
            id: row.get(0)?,
            name: row.get(1)?,
        })),
        None => Ok(None),
    }
}
