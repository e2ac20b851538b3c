//! Team repository.
//!
//! Teams are never synchronized themselves; they only contribute their alias
//! to member display names. Team CRUD therefore bypasses the handlers.

use chrono::Utc;

use bridge_core::entities::Team;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_string_list, to_json_text};
use crate::service::SyncService;

const SELECT_COLUMNS: &str =
    "id, alias, organization_id, members, max_budget, spend, models, created_at, updated_at";

fn row_to_team(row: &libsql::Row) -> Result<Team, DatabaseError> {
    Ok(Team {
        id: row.get::<String>(0)?,
        alias: get_opt_string(row, 1)?,
        organization_id: row.get::<String>(2)?,
        members: parse_string_list(&row.get::<String>(3)?)?,
        max_budget: row.get::<Option<f64>>(4)?,
        spend: row.get::<f64>(5)?,
        models: parse_string_list(&row.get::<String>(6)?)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

pub(crate) async fn find(conn: &libsql::Connection, id: &str) -> Result<Option<Team>, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLUMNS} FROM teams WHERE id = ?1"), [id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_team(&row)?)),
        None => Ok(None),
    }
}

/// Alias of a team if the team exists and the alias is non-empty.
pub(crate) async fn find_alias(conn: &libsql::Connection, id: &str) -> Result<Option<String>, DatabaseError> {
    Ok(find(conn, id)
        .await?
        .and_then(|team| team.known_alias().map(String::from)))
}

async fn write(conn: &libsql::Connection, team: &Team) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO teams (id, alias, organization_id, members, max_budget, spend, models, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
             alias = excluded.alias,
             organization_id = excluded.organization_id,
             members = excluded.members,
             max_budget = excluded.max_budget,
             spend = excluded.spend,
             models = excluded.models,
             updated_at = excluded.updated_at",
        libsql::params![
            team.id.as_str(),
            team.alias.as_deref(),
            team.organization_id.as_str(),
            to_json_text(&team.members)?,
            team.max_budget,
            team.spend,
            to_json_text(&team.models)?,
            team.created_at.to_rfc3339(),
            team.updated_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

fn not_found(id: &str) -> DatabaseError {
    DatabaseError::NotFound {
        entity: "team",
        id: id.to_string(),
    }
}

impl SyncService {
    pub async fn create_team(&self, team: &Team) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin().await?;
        let result = async {
            if find(&tx, &team.id).await?.is_some() {
                return Err(DatabaseError::InvalidState(format!("team '{}' already exists", team.id)));
            }
            write(&tx, team).await
        }
        .await;
        Self::finish(tx, result).await
    }

    /// Overwrite a team's fields. Member display names are not refreshed;
    /// call [`SyncService::resync_team_members`] after an alias change.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the team does not exist.
    pub async fn update_team(&self, team: &Team) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin().await?;
        let result = async {
            let before = find(&tx, &team.id).await?.ok_or_else(|| not_found(&team.id))?;
            let mut after = team.clone();
            after.created_at = before.created_at;
            after.updated_at = Utc::now();
            if before.alias != after.alias {
                tracing::debug!(team_id = %team.id, "team alias changed; member names are stale until resync");
            }
            write(&tx, &after).await
        }
        .await;
        Self::finish(tx, result).await
    }

    pub async fn delete_team(&self, id: &str) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin().await?;
        let result = async {
            let affected = tx.execute("DELETE FROM teams WHERE id = ?1", [id]).await?;
            if affected == 0 {
                return Err(not_found(id));
            }
            Ok(())
        }
        .await;
        Self::finish(tx, result).await
    }

    pub async fn get_team(&self, id: &str) -> Result<Team, DatabaseError> {
        find(self.db().conn(), id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn list_teams(&self, limit: u32) -> Result<Vec<Team>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM teams ORDER BY id LIMIT ?1"),
                [limit],
            )
            .await?;
        let mut teams = Vec::new();
        while let Some(row) = rows.next().await? {
            teams.push(row_to_team(&row)?);
        }
        Ok(teams)
    }
}
