//! Handle on the target (chat application) database.
//!
//! Only the remote writer mutates it. The read helpers exist for the status
//! report, reconciliation probes and tests.

use libsql::Builder;

use bridge_config::TargetConfig;
use bridge_core::entities::{Group, TargetUser};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_json};

/// Target database connection, local file or remote libSQL server.
pub struct TargetDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    remote: bool,
}

fn row_to_group(row: &libsql::Row) -> Result<Group, DatabaseError> {
    Ok(Group {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        description: row.get::<String>(2)?,
        meta: parse_json(&row.get::<String>(3)?)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn row_to_user(row: &libsql::Row) -> Result<TargetUser, DatabaseError> {
    Ok(TargetUser {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        email: get_opt_string(row, 2)?,
        role: parse_enum(&row.get::<String>(3)?)?,
        settings: parse_json(&row.get::<String>(4)?)?,
        info: parse_json(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl TargetDb {
    /// Open a local target database and create the target schema if missing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        let target = Self {
            db,
            conn,
            remote: false,
        };
        target.run_migrations().await?;
        Ok(target)
    }

    /// Connect to a remote libSQL server. The schema is owned by the chat
    /// application and is not migrated from here.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be established.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        let conn = db.connect()?;
        Ok(Self {
            db,
            conn,
            remote: true,
        })
    }

    /// Open according to configuration: remote when both url and token are set.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if opening fails.
    pub async fn open(config: &TargetConfig) -> Result<Self, DatabaseError> {
        if config.is_remote() {
            Self::open_remote(&config.url, &config.auth_token).await
        } else {
            Self::open_local(&config.path).await
        }
    }

    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.remote
    }

    /// Fetch a group by target id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or the row is malformed.
    pub async fn get_group(&self, id: &str) -> Result<Option<Group>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                r#"SELECT id, name, description, meta, created_at, updated_at
                   FROM "group" WHERE id = ?1"#,
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_group(&row)?)),
            None => Ok(None),
        }
    }

    /// Fetch a target user by target id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or the row is malformed.
    pub async fn get_user(&self, id: &str) -> Result<Option<TargetUser>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                r#"SELECT id, name, email, role, settings, info, created_at, updated_at
                   FROM "user" WHERE id = ?1"#,
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Number of rows in the target `group` table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_groups(&self) -> Result<i64, DatabaseError> {
        self.count(r#"SELECT COUNT(*) FROM "group""#).await
    }

    /// Number of rows in the target `user` table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_users(&self) -> Result<i64, DatabaseError> {
        self.count(r#"SELECT COUNT(*) FROM "user""#).await
    }

    async fn count(&self, sql: &str) -> Result<i64, DatabaseError> {
        let mut rows = self.conn.query(sql, ()).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }
}
