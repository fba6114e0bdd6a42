#![forbid(unsafe_code)]

use super::{CreateOrganizationRequest, DirectoryStore, StoreError};
use od_core::geo::BoundingBox;
use od_core::model::{Activity, Building, Organization, OrganizationRecord, Phone};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Transaction, params};
use std::collections::BTreeSet;

impl DirectoryStore {
    pub fn get_organization(
        &self,
        organization_id: i64,
    ) -> Result<Option<OrganizationRecord>, StoreError> {
        hydrate_organization(&self.conn, organization_id)
    }

    /// Case-insensitive substring match on the organization name, ordered by
    /// id. LIKE wildcards in the fragment keep their meaning.
    pub fn search_organizations_by_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<OrganizationRecord>, StoreError> {
        let pattern = format!("%{}%", fragment.to_lowercase());
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM organizations WHERE lower(name) LIKE ?1 ORDER BY id ASC")?;
        let ids = collect_ids(stmt.query(params![pattern])?)?;
        self.hydrate_all(ids)
    }

    pub fn organizations_in_building(
        &self,
        building_id: i64,
    ) -> Result<Vec<OrganizationRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM organizations WHERE building_id=?1 ORDER BY id ASC")?;
        let ids = collect_ids(stmt.query(params![building_id])?)?;
        self.hydrate_all(ids)
    }

    /// Organizations linked to any activity in the given set, deduplicated
    /// and ordered by id. The caller passes a descendant closure here.
    pub fn organizations_by_activities(
        &self,
        activity_ids: &BTreeSet<i64>,
    ) -> Result<Vec<OrganizationRecord>, StoreError> {
        let mut organization_ids = BTreeSet::new();
        let mut stmt = self
            .conn
            .prepare("SELECT organization_id FROM organization_activity WHERE activity_id=?1")?;
        for activity_id in activity_ids {
            let mut rows = stmt.query(params![activity_id])?;
            while let Some(row) = rows.next()? {
                organization_ids.insert(row.get::<_, i64>(0)?);
            }
        }
        self.hydrate_all(organization_ids)
    }

    /// Organizations whose building lies inside the box, both axes inclusive.
    pub fn organizations_in_box(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<OrganizationRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT o.id FROM organizations o \
             JOIN buildings b ON b.id = o.building_id \
             WHERE b.latitude >= ?1 AND b.latitude <= ?2 \
               AND b.longitude >= ?3 AND b.longitude <= ?4 \
             ORDER BY o.id ASC",
        )?;
        let ids = collect_ids(stmt.query(params![
            bbox.min_lat,
            bbox.max_lat,
            bbox.min_lon,
            bbox.max_lon
        ])?)?;
        self.hydrate_all(ids)
    }

    /// Creates the organization, its phones, and its activity associations
    /// as one transaction; nothing is observable until commit.
    ///
    /// The building reference is not pre-checked: a missing building
    /// surfaces as the foreign-key failure of the first insert. Unknown
    /// activity ids are dropped; phones keep request order and duplicates.
    pub fn create_organization(
        &mut self,
        request: CreateOrganizationRequest,
    ) -> Result<OrganizationRecord, StoreError> {
        let tx = self.conn.transaction()?;

        let insert = tx.execute(
            "INSERT INTO organizations(name, building_id) VALUES (?1, ?2)",
            params![request.name, request.building_id],
        );
        if let Err(err) = insert {
            return Err(map_building_reference(err));
        }
        let organization_id = tx.last_insert_rowid();

        for number in &request.phone_numbers {
            tx.execute(
                "INSERT INTO phones(number, organization_id) VALUES (?1, ?2)",
                params![number, organization_id],
            )?;
        }

        for activity_id in existing_activity_ids_tx(&tx, &request.activity_ids)? {
            tx.execute(
                "INSERT INTO organization_activity(organization_id, activity_id) VALUES (?1, ?2)",
                params![organization_id, activity_id],
            )?;
        }

        tx.commit()?;

        hydrate_organization(&self.conn, organization_id)?
            .ok_or(StoreError::InvalidInput("created organization row is missing"))
    }

    fn hydrate_all(
        &self,
        ids: impl IntoIterator<Item = i64>,
    ) -> Result<Vec<OrganizationRecord>, StoreError> {
        let mut out = Vec::new();
        for id in ids {
            let Some(record) = hydrate_organization(&self.conn, id)? else {
                return Err(StoreError::InvalidInput("organization row is missing"));
            };
            out.push(record);
        }
        Ok(out)
    }
}

fn collect_ids(mut rows: rusqlite::Rows<'_>) -> Result<Vec<i64>, StoreError> {
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get::<_, i64>(0)?);
    }
    Ok(ids)
}

fn hydrate_organization(
    conn: &Connection,
    organization_id: i64,
) -> Result<Option<OrganizationRecord>, StoreError> {
    let head = conn
        .query_row(
            "SELECT o.id, o.name, o.building_id, b.address, b.latitude, b.longitude \
             FROM organizations o \
             JOIN buildings b ON b.id = o.building_id \
             WHERE o.id=?1",
            params![organization_id],
            |row| {
                Ok((
                    Organization {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        building_id: row.get(2)?,
                    },
                    Building {
                        id: row.get(2)?,
                        address: row.get(3)?,
                        latitude: row.get(4)?,
                        longitude: row.get(5)?,
                    },
                ))
            },
        )
        .optional()?;

    let Some((organization, building)) = head else {
        return Ok(None);
    };

    let phones = phones_for(conn, organization.id)?;
    let activities = activities_for(conn, organization.id)?;

    Ok(Some(OrganizationRecord {
        organization,
        building,
        phones,
        activities,
    }))
}

fn phones_for(conn: &Connection, organization_id: i64) -> Result<Vec<Phone>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, number, organization_id FROM phones WHERE organization_id=?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![organization_id], |row| {
        Ok(Phone {
            id: row.get(0)?,
            number: row.get(1)?,
            organization_id: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn activities_for(conn: &Connection, organization_id: i64) -> Result<Vec<Activity>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.name, a.parent_id, a.level \
         FROM activities a \
         JOIN organization_activity oa ON oa.activity_id = a.id \
         WHERE oa.organization_id=?1 \
         ORDER BY a.level ASC, a.id ASC",
    )?;
    let rows = stmt.query_map(params![organization_id], |row| {
        Ok(Activity {
            id: row.get(0)?,
            name: row.get(1)?,
            parent_id: row.get(2)?,
            level: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn existing_activity_ids_tx(
    tx: &Transaction<'_>,
    ids: &[i64],
) -> Result<BTreeSet<i64>, StoreError> {
    let mut known = BTreeSet::new();
    let mut stmt = tx.prepare("SELECT 1 FROM activities WHERE id=?1")?;
    for id in ids {
        let exists = stmt
            .query_row(params![id], |row| row.get::<_, i64>(0))
            .optional()?
            .is_some();
        if exists {
            known.insert(*id);
        }
    }
    Ok(known)
}

fn map_building_reference(err: rusqlite::Error) -> StoreError {
    if is_foreign_key_violation(&err) {
        return StoreError::UnknownBuilding;
    }
    StoreError::Sql(err)
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                && message
                    .as_deref()
                    .is_none_or(|value| value.contains("FOREIGN KEY"))
        }
        _ => false,
    }
}
