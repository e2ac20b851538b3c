//! Organization repository: source CRUD that fires the organization handler.

use chrono::Utc;

use bridge_core::entities::Organization;

use crate::dispatcher::SyncReport;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_json, parse_string_list, to_json_text};
use crate::service::SyncService;

const SELECT_COLUMNS: &str = "id, alias, budget_id, models, spend, metadata, created_at, updated_at, created_by, updated_by";

fn row_to_organization(row: &libsql::Row) -> Result<Organization, DatabaseError> {
    Ok(Organization {
        id: row.get::<String>(0)?,
        alias: get_opt_string(row, 1)?,
        budget_id: get_opt_string(row, 2)?,
        models: parse_string_list(&row.get::<String>(3)?)?,
        spend: row.get::<f64>(4)?,
        metadata: parse_json(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
        created_by: get_opt_string(row, 8)?,
        updated_by: get_opt_string(row, 9)?,
    })
}

pub(crate) async fn find(conn: &libsql::Connection, id: &str) -> Result<Option<Organization>, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLUMNS} FROM organizations WHERE id = ?1"), [id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_organization(&row)?)),
        None => Ok(None),
    }
}

async fn count_members(conn: &libsql::Connection, id: &str) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("SELECT COUNT(*) FROM users WHERE organization_id = ?1", [id])
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)?)
}

async fn write(conn: &libsql::Connection, org: &Organization) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO organizations (id, alias, budget_id, models, spend, metadata, created_at, updated_at, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(id) DO UPDATE SET
             alias = excluded.alias,
             budget_id = excluded.budget_id,
             models = excluded.models,
             spend = excluded.spend,
             metadata = excluded.metadata,
             updated_at = excluded.updated_at,
             updated_by = excluded.updated_by",
        libsql::params![
            org.id.as_str(),
            org.alias.as_deref(),
            org.budget_id.as_deref(),
            to_json_text(&org.models)?,
            org.spend,
            to_json_text(&org.metadata)?,
            org.created_at.to_rfc3339(),
            org.updated_at.to_rfc3339(),
            org.created_by.as_deref(),
            org.updated_by.as_deref()
        ],
    )
    .await?;
    Ok(())
}

impl SyncService {
    /// Insert an organization and sync its group.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the id is taken, or any
    /// source database failure. A failed target write is not an error.
    pub async fn create_organization(&self, org: &Organization) -> Result<SyncReport, DatabaseError> {
        let (_gate, tx) = self.begin().await?;
        let result = async {
            if find(&tx, &org.id).await?.is_some() {
                return Err(DatabaseError::InvalidState(format!(
                    "organization '{}' already exists",
                    org.id
                )));
            }
            write(&tx, org).await?;
            self.handlers().organization.on_insert(&tx, org).await
        }
        .await;
        Self::finish(tx, result).await
    }

    /// Overwrite an organization's fields. `created_at` is preserved.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the organization does not exist.
    pub async fn update_organization(&self, org: &Organization) -> Result<SyncReport, DatabaseError> {
        let (_gate, tx) = self.begin().await?;
        let result = async {
            let before = find(&tx, &org.id).await?.ok_or_else(|| DatabaseError::NotFound {
                entity: "organization",
                id: org.id.clone(),
            })?;
            let mut after = org.clone();
            after.created_at = before.created_at;
            after.updated_at = Utc::now();
            write(&tx, &after).await?;
            self.handlers().organization.on_update(&tx, &before, &after).await
        }
        .await;
        Self::finish(tx, result).await
    }

    /// Delete an organization and its group.
    ///
    /// Users still pointing at the organization are left alone.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the organization does not exist.
    pub async fn delete_organization(&self, id: &str) -> Result<SyncReport, DatabaseError> {
        let (_gate, tx) = self.begin().await?;
        let result = async {
            let before = find(&tx, id).await?.ok_or_else(|| DatabaseError::NotFound {
                entity: "organization",
                id: id.to_string(),
            })?;
            let members = count_members(&tx, id).await?;
            if members > 0 {
                tracing::warn!(record_id = %id, members, "deleting organization that still has users");
            }
            tx.execute("DELETE FROM organizations WHERE id = ?1", [id]).await?;
            self.handlers().organization.on_delete(&tx, &before).await
        }
        .await;
        Self::finish(tx, result).await
    }

    pub async fn get_organization(&self, id: &str) -> Result<Organization, DatabaseError> {
        find(self.db().conn(), id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "organization",
                id: id.to_string(),
            })
    }

    pub async fn list_organizations(&self, limit: u32) -> Result<Vec<Organization>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM organizations ORDER BY id LIMIT ?1"),
                [limit],
            )
            .await?;
        let mut orgs = Vec::new();
        while let Some(row) = rows.next().await? {
            orgs.push(row_to_organization(&row)?);
        }
        Ok(orgs)
    }

    /// Re-dispatch an existing organization (audited as `SYNC_ORG`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the organization does not exist.
    pub async fn resync_organization(&self, id: &str) -> Result<SyncReport, DatabaseError> {
        let (_gate, tx) = self.begin().await?;
        let result = async {
            let org = find(&tx, id).await?.ok_or_else(|| DatabaseError::NotFound {
                entity: "organization",
                id: id.to_string(),
            })?;
            self.handlers().organization.on_insert(&tx, &org).await
        }
        .await;
        Self::finish(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use bridge_core::enums::{SourceEntity, SyncOperation, SyncState};

    use crate::repos::mapping::MappingStore;
    use crate::test_support::helpers::test_service;

    use super::*;

    #[tokio::test]
    async fn create_and_get() {
        let (svc, target) = test_service().await;
        let mut org = Organization::new("org_tech", "Technology Corp");
        org.models = vec!["gpt-4".into(), "claude-3".into()];
        org.metadata = json!({"region": "us"});

        let report = svc.create_organization(&org).await.unwrap();
        assert_eq!(report.operation, SyncOperation::SyncOrg);
        assert_eq!(report.state, SyncState::RecordedSuccess);

        let stored = svc.get_organization("org_tech").await.unwrap();
        assert_eq!(stored.alias.as_deref(), Some("Technology Corp"));
        assert_eq!(stored.models, org.models);
        assert_eq!(stored.metadata, json!({"region": "us"}));

        let group = target.get_group("grp_org_tech").await.unwrap().unwrap();
        assert_eq!(group.meta["models"], json!(["gpt-4", "claude-3"]));
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected_without_audit() {
        let (svc, _target) = test_service().await;
        let org = Organization::new("org_a", "A");
        svc.create_organization(&org).await.unwrap();

        let err = svc.create_organization(&org).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
        assert_eq!(svc.query_audit(&Default::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_preserves_created_at() {
        let (svc, _target) = test_service().await;
        let org = Organization::new("org_a", "A");
        svc.create_organization(&org).await.unwrap();
        let created = svc.get_organization("org_a").await.unwrap().created_at;

        let mut changed = org.clone();
        changed.alias = Some("Renamed".into());
        changed.created_at = Utc::now() + chrono::Duration::days(1);
        svc.update_organization(&changed).await.unwrap();

        let stored = svc.get_organization("org_a").await.unwrap();
        assert_eq!(stored.alias.as_deref(), Some("Renamed"));
        assert_eq!(stored.created_at, created);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let (svc, _target) = test_service().await;
        let err = svc
            .update_organization(&Organization::new("ghost", "Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_removes_row_mapping_and_group() {
        let (svc, target) = test_service().await;
        svc.create_organization(&Organization::new("org_a", "A")).await.unwrap();

        let report = svc.delete_organization("org_a").await.unwrap();

        assert_eq!(report.operation, SyncOperation::DeleteOrg);
        assert!(report.succeeded());
        assert!(matches!(
            svc.get_organization("org_a").await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(target.get_group("grp_org_a").await.unwrap().is_none());
        assert_eq!(
            MappingStore::new(svc.db().conn())
                .lookup(SourceEntity::Organization, "org_a")
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn resync_missing_is_not_found() {
        let (svc, _target) = test_service().await;
        assert!(matches!(
            svc.resync_organization("ghost").await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn list_is_ordered_and_limited() {
        let (svc, _target) = test_service().await;
        for id in ["org_c", "org_a", "org_b"] {
            svc.create_organization(&Organization::new(id, id)).await.unwrap();
        }
        let ids: Vec<_> = svc
            .list_organizations(2)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec!["org_a", "org_b"]);
    }
}
