//! User repository: source CRUD that fires the user handler.

use chrono::Utc;

use bridge_core::entities::User;

use crate::dispatcher::SyncReport;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_json, parse_string_list, to_json_text};
use crate::service::SyncService;

const SELECT_COLUMNS: &str = "id, alias, team_id, organization_id, email, role, sso_user_id, teams, \
     max_budget, spend, models, metadata, created_at, updated_at";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get::<String>(0)?,
        alias: get_opt_string(row, 1)?,
        team_id: get_opt_string(row, 2)?,
        organization_id: get_opt_string(row, 3)?,
        email: get_opt_string(row, 4)?,
        role: parse_enum(&row.get::<String>(5)?)?,
        sso_user_id: get_opt_string(row, 6)?,
        teams: parse_string_list(&row.get::<String>(7)?)?,
        max_budget: row.get::<Option<f64>>(8)?,
        spend: row.get::<f64>(9)?,
        models: parse_string_list(&row.get::<String>(10)?)?,
        metadata: parse_json(&row.get::<String>(11)?)?,
        created_at: parse_datetime(&row.get::<String>(12)?)?,
        updated_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

pub(crate) async fn find(conn: &libsql::Connection, id: &str) -> Result<Option<User>, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLUMNS} FROM users WHERE id = ?1"), [id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_user(&row)?)),
        None => Ok(None),
    }
}

async fn write(conn: &libsql::Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, alias, team_id, organization_id, email, role, sso_user_id, teams,
                            max_budget, spend, models, metadata, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
         ON CONFLICT(id) DO UPDATE SET
             alias = excluded.alias,
             team_id = excluded.team_id,
             organization_id = excluded.organization_id,
             email = excluded.email,
             role = excluded.role,
             sso_user_id = excluded.sso_user_id,
             teams = excluded.teams,
             max_budget = excluded.max_budget,
             spend = excluded.spend,
             models = excluded.models,
             metadata = excluded.metadata,
             updated_at = excluded.updated_at",
        libsql::params![
            user.id.as_str(),
            user.alias.as_deref(),
            user.team_id.as_deref(),
            user.organization_id.as_deref(),
            user.email.as_deref(),
            user.role.as_str(),
            user.sso_user_id.as_deref(),
            to_json_text(&user.teams)?,
            user.max_budget,
            user.spend,
            to_json_text(&user.models)?,
            to_json_text(&user.metadata)?,
            user.created_at.to_rfc3339(),
            user.updated_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

fn not_found(id: &str) -> DatabaseError {
    DatabaseError::NotFound {
        entity: "user",
        id: id.to_string(),
    }
}

impl SyncService {
    /// Insert a user and sync its target row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the id is taken, or any
    /// source database failure. A failed target write is not an error.
    pub async fn create_user(&self, user: &User) -> Result<SyncReport, DatabaseError> {
        let (_gate, tx) = self.begin().await?;
        let result = async {
            if find(&tx, &user.id).await?.is_some() {
                return Err(DatabaseError::InvalidState(format!("user '{}' already exists", user.id)));
            }
            write(&tx, user).await?;
            self.handlers().user.on_insert(&tx, user).await
        }
        .await;
        Self::finish(tx, result).await
    }

    /// Overwrite a user's fields. `created_at` is preserved.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the user does not exist.
    pub async fn update_user(&self, user: &User) -> Result<SyncReport, DatabaseError> {
        let (_gate, tx) = self.begin().await?;
        let result = async {
            let before = find(&tx, &user.id).await?.ok_or_else(|| not_found(&user.id))?;
            let mut after = user.clone();
            after.created_at = before.created_at;
            after.updated_at = Utc::now();
            write(&tx, &after).await?;
            self.handlers().user.on_update(&tx, &before, &after).await
        }
        .await;
        Self::finish(tx, result).await
    }

    /// Delete a user and its target row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the user does not exist.
    pub async fn delete_user(&self, id: &str) -> Result<SyncReport, DatabaseError> {
        let (_gate, tx) = self.begin().await?;
        let result = async {
            let before = find(&tx, id).await?.ok_or_else(|| not_found(id))?;
            tx.execute("DELETE FROM users WHERE id = ?1", [id]).await?;
            self.handlers().user.on_delete(&tx, &before).await
        }
        .await;
        Self::finish(tx, result).await
    }

    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        find(self.db().conn(), id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn list_users(&self, limit: u32) -> Result<Vec<User>, DatabaseError> {
        self.query_users(
            &format!("SELECT {SELECT_COLUMNS} FROM users ORDER BY id LIMIT ?1"),
            libsql::params![limit],
        )
        .await
    }

    /// Users whose primary team is `team_id`.
    pub async fn list_team_members(&self, team_id: &str) -> Result<Vec<User>, DatabaseError> {
        self.query_users(
            &format!("SELECT {SELECT_COLUMNS} FROM users WHERE team_id = ?1 ORDER BY id"),
            libsql::params![team_id],
        )
        .await
    }

    async fn query_users(&self, sql: &str, params: impl libsql::params::IntoParams) -> Result<Vec<User>, DatabaseError> {
        let mut rows = self.db().conn().query(sql, params).await?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    /// Re-dispatch an existing user (audited as `SYNC_USER`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the user does not exist.
    pub async fn resync_user(&self, id: &str) -> Result<SyncReport, DatabaseError> {
        let (_gate, tx) = self.begin().await?;
        let result = async {
            let user = find(&tx, id).await?.ok_or_else(|| not_found(id))?;
            self.handlers().user.on_insert(&tx, &user).await
        }
        .await;
        Self::finish(tx, result).await
    }

    /// Re-dispatch every member of a team, one unit of work per user.
    ///
    /// Used after a team alias change, which does not cascade by itself.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the team does not exist, or the
    /// first source database failure.
    pub async fn resync_team_members(&self, team_id: &str) -> Result<Vec<SyncReport>, DatabaseError> {
        self.get_team(team_id).await?;
        let members = self.list_team_members(team_id).await?;
        let mut reports = Vec::with_capacity(members.len());
        for member in members {
            reports.push(self.resync_user(&member.id).await?);
        }
        Ok(reports)
    }
}
