#![forbid(unsafe_code)]

mod error;
mod organizations;
mod requests;

pub use error::StoreError;
pub use requests::*;

use od_core::hierarchy;
use od_core::model::{Activity, ActivityLink, Building};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE: &str = "directory.db";

#[derive(Debug)]
pub struct DirectoryStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl DirectoryStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;\n\
             PRAGMA synchronous = NORMAL;\n\
             PRAGMA foreign_keys = ON;",
        )?;

        install_schema(&conn)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn create_building(
        &mut self,
        request: CreateBuildingRequest,
    ) -> Result<Building, StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO buildings(address, latitude, longitude) VALUES (?1, ?2, ?3)",
            params![request.address, request.latitude, request.longitude],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Building {
            id,
            address: request.address,
            latitude: request.latitude,
            longitude: request.longitude,
        })
    }

    pub fn list_buildings(&self) -> Result<Vec<Building>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, address, latitude, longitude FROM buildings ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Building {
                id: row.get(0)?,
                address: row.get(1)?,
                latitude: row.get(2)?,
                longitude: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Creates an activity, assigning its level from the parent inside the
    /// same transaction. The level invariant is enforced here before any row
    /// is written; the schema CHECK backs it up.
    pub fn create_activity(
        &mut self,
        request: CreateActivityRequest,
    ) -> Result<Activity, StoreError> {
        let tx = self.conn.transaction()?;

        let level = match request.parent_id {
            None => hierarchy::ROOT_LEVEL,
            Some(parent_id) => {
                let parent_level = tx
                    .query_row(
                        "SELECT level FROM activities WHERE id=?1",
                        params![parent_id],
                        |row| row.get::<_, i64>(0),
                    )
                    .optional()?;
                let Some(parent_level) = parent_level else {
                    return Err(StoreError::UnknownParentActivity);
                };
                hierarchy::child_level(parent_level)
                    .map_err(|_| StoreError::ActivityDepthExceeded)?
            }
        };

        tx.execute(
            "INSERT INTO activities(name, parent_id, level) VALUES (?1, ?2, ?3)",
            params![request.name, request.parent_id, level],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Activity {
            id,
            name: request.name,
            parent_id: request.parent_id,
            level,
        })
    }

    /// All activities ordered by (level, id), a stable listing contract.
    pub fn list_activities(&self) -> Result<Vec<Activity>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id, level FROM activities ORDER BY level ASC, id ASC",
        )?;
        let rows = stmt.query_map([], activity_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Activities whose name equals `name` case-insensitively. Names are not
    /// unique across branches.
    pub fn activities_by_name(&self, name: &str) -> Result<Vec<Activity>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id, level FROM activities \
             WHERE lower(name) = lower(?1) \
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![name], activity_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The full parent-pointer table, the input for descendant closures.
    pub fn activity_links(&self) -> Result<Vec<ActivityLink>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, parent_id FROM activities ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(ActivityLink {
                id: row.get(0)?,
                parent_id: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn activity_from_row(row: &rusqlite::Row<'_>) -> Result<Activity, rusqlite::Error> {
    Ok(Activity {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_id: row.get(2)?,
        level: row.get(3)?,
    })
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS buildings (
          id INTEGER PRIMARY KEY,
          address TEXT NOT NULL,
          latitude REAL NOT NULL,
          longitude REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_buildings_address ON buildings(address);

        CREATE TABLE IF NOT EXISTS activities (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          parent_id INTEGER,
          level INTEGER NOT NULL,
          FOREIGN KEY(parent_id) REFERENCES activities(id) ON DELETE SET NULL,
          CHECK(level BETWEEN 1 AND 3)
        );

        CREATE INDEX IF NOT EXISTS idx_activities_name ON activities(name);
        CREATE INDEX IF NOT EXISTS idx_activities_parent ON activities(parent_id);

        CREATE TABLE IF NOT EXISTS organizations (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          building_id INTEGER NOT NULL,
          FOREIGN KEY(building_id) REFERENCES buildings(id) ON DELETE RESTRICT
        );

        CREATE INDEX IF NOT EXISTS idx_organizations_name ON organizations(name);
        CREATE INDEX IF NOT EXISTS idx_organizations_building ON organizations(building_id);

        CREATE TABLE IF NOT EXISTS phones (
          id INTEGER PRIMARY KEY,
          number TEXT NOT NULL,
          organization_id INTEGER NOT NULL,
          FOREIGN KEY(organization_id) REFERENCES organizations(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_phones_organization ON phones(organization_id);

        CREATE TABLE IF NOT EXISTS organization_activity (
          organization_id INTEGER NOT NULL,
          activity_id INTEGER NOT NULL,
          PRIMARY KEY(organization_id, activity_id),
          FOREIGN KEY(organization_id) REFERENCES organizations(id) ON DELETE CASCADE,
          FOREIGN KEY(activity_id) REFERENCES activities(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_organization_activity_activity
          ON organization_activity(activity_id);
        "#,
    )?;

    Ok(())
}
