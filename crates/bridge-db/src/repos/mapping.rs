//! Mapping store: which target row a source entity currently owns.
//!
//! A row exists iff the last successful sync for that source entity was an
//! upsert. Keyed on `(source_type, source_id)`, so repeated upserts never
//! duplicate.

use chrono::Utc;

use bridge_core::entities::SyncMapping;
use bridge_core::enums::{SourceEntity, TargetEntity};

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum};

fn row_to_mapping(row: &libsql::Row) -> Result<SyncMapping, DatabaseError> {
    Ok(SyncMapping {
        source_type: parse_enum(&row.get::<String>(0)?)?,
        source_id: row.get::<String>(1)?,
        target_type: parse_enum(&row.get::<String>(2)?)?,
        target_id: row.get::<String>(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

/// Mapping store bound to a connection or an open transaction.
#[derive(Clone, Copy)]
pub struct MappingStore<'c> {
    conn: &'c libsql::Connection,
}

impl<'c> MappingStore<'c> {
    #[must_use]
    pub const fn new(conn: &'c libsql::Connection) -> Self {
        Self { conn }
    }

    /// Insert or refresh a mapping. `created_at` survives refreshes.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the write fails.
    pub async fn upsert(
        &self,
        source_type: SourceEntity,
        source_id: &str,
        target_type: TargetEntity,
        target_id: &str,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO sync_mapping (source_type, source_id, target_type, target_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(source_type, source_id) DO UPDATE SET
                     target_type = excluded.target_type,
                     target_id = excluded.target_id,
                     updated_at = excluded.updated_at",
                libsql::params![
                    source_type.as_str(),
                    source_id,
                    target_type.as_str(),
                    target_id,
                    now
                ],
            )
            .await?;
        Ok(())
    }

    /// Target id currently mapped to a source entity.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn lookup(
        &self,
        source_type: SourceEntity,
        source_id: &str,
    ) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT target_id FROM sync_mapping WHERE source_type = ?1 AND source_id = ?2",
                libsql::params![source_type.as_str(), source_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    /// Remove a mapping. Absent mappings are a no-op; returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn delete(&self, source_type: SourceEntity, source_id: &str) -> Result<bool, DatabaseError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM sync_mapping WHERE source_type = ?1 AND source_id = ?2",
                libsql::params![source_type.as_str(), source_id],
            )
            .await?;
        Ok(affected > 0)
    }

    /// All mappings, optionally restricted to one source type.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list(&self, source_type: Option<SourceEntity>) -> Result<Vec<SyncMapping>, DatabaseError> {
        let mut rows = match source_type {
            Some(st) => {
                self.conn
                    .query(
                        "SELECT source_type, source_id, target_type, target_id, created_at, updated_at
                         FROM sync_mapping WHERE source_type = ?1 ORDER BY source_id",
                        [st.as_str()],
                    )
                    .await?
            }
            None => {
                self.conn
                    .query(
                        "SELECT source_type, source_id, target_type, target_id, created_at, updated_at
                         FROM sync_mapping ORDER BY source_type, source_id",
                        (),
                    )
                    .await?
            }
        };

        let mut mappings = Vec::new();
        while let Some(row) = rows.next().await? {
            mappings.push(row_to_mapping(&row)?);
        }
        Ok(mappings)
    }

    /// Row counts grouped by target type.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_by_type(&self) -> Result<Vec<(TargetEntity, i64)>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT target_type, COUNT(*) FROM sync_mapping GROUP BY target_type ORDER BY target_type",
                (),
            )
            .await?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next().await? {
            counts.push((parse_enum(&row.get::<String>(0)?)?, row.get::<i64>(1)?));
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::BridgeDb;

    #[tokio::test]
    async fn upsert_twice_keeps_one_row() {
        let db = BridgeDb::open_local(":memory:").await.unwrap();
        let store = MappingStore::new(db.conn());

        store
            .upsert(SourceEntity::User, "alice", TargetEntity::User, "usr_alice")
            .await
            .unwrap();
        store
            .upsert(SourceEntity::User, "alice", TargetEntity::User, "usr_alice")
            .await
            .unwrap();

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].target_id, "usr_alice");
        assert_eq!(
            store.lookup(SourceEntity::User, "alice").await.unwrap(),
            Some("usr_alice".to_string())
        );
    }

    #[tokio::test]
    async fn delete_absent_is_noop() {
        let db = BridgeDb::open_local(":memory:").await.unwrap();
        let store = MappingStore::new(db.conn());

        assert!(!store.delete(SourceEntity::Organization, "org_none").await.unwrap());
        assert_eq!(store.lookup(SourceEntity::Organization, "org_none").await.unwrap(), None);
    }

    #[tokio::test]
    async fn counts_group_by_target_type() {
        let db = BridgeDb::open_local(":memory:").await.unwrap();
        let store = MappingStore::new(db.conn());
        store
            .upsert(SourceEntity::Organization, "org_a", TargetEntity::Group, "grp_org_a")
            .await
            .unwrap();
        store
            .upsert(SourceEntity::User, "u1", TargetEntity::User, "usr_u1")
            .await
            .unwrap();
        store
            .upsert(SourceEntity::User, "u2", TargetEntity::User, "usr_u2")
            .await
            .unwrap();

        assert_eq!(
            store.count_by_type().await.unwrap(),
            vec![(TargetEntity::Group, 1), (TargetEntity::User, 2)]
        );
        assert_eq!(store.list(Some(SourceEntity::User)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn team_mappings_are_rejected() {
        let db = BridgeDb::open_local(":memory:").await.unwrap();
        let store = MappingStore::new(db.conn());
        let result = store
            .upsert(SourceEntity::Team, "team_backend", TargetEntity::Group, "grp_team_backend")
            .await;
        assert!(result.is_err());
    }
}
