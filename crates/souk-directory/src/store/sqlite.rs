use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::Connection;

use souk_authz::{AuthzError, Role, RoleSwitch};

use super::ActorStore;
use crate::types::{ActorRecord, AuditEntry};

pub struct SqliteActorStore {
    conn: Mutex<Connection>,
}

impl SqliteActorStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &str) -> Result<Self, AuthzError> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(db_err)?;
        Ok(Self::new(conn))
    }

    pub fn open_in_memory() -> Result<Self, AuthzError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").map_err(db_err)?;
        Ok(Self::new(conn))
    }
}

const MIGRATE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS authz_actors (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    role TEXT NOT NULL DEFAULT 'customer',
    password_hash TEXT NOT NULL,
    permissions TEXT NOT NULL DEFAULT '[]',
    role_switch TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS authz_audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    actor_id TEXT,
    action TEXT NOT NULL,
    target TEXT,
    detail TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const ACTOR_COLS: &str =
    "id, username, role, permissions, role_switch, created_at, updated_at";

fn db_err(e: rusqlite::Error) -> AuthzError {
    AuthzError::Database(e.to_string())
}

/// Untyped row as it comes out of SQLite; parsed into an [`ActorRecord`]
/// outside the rusqlite closure so JSON/role errors keep their own variants.
struct RawActor {
    id: String,
    username: String,
    role: String,
    permissions: String,
    role_switch: Option<String>,
    created_at: String,
    updated_at: String,
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawActor> {
    Ok(RawActor {
        id: row.get(0)?,
        username: row.get(1)?,
        role: row.get(2)?,
        permissions: row.get(3)?,
        role_switch: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn parse_actor(raw: RawActor) -> Result<ActorRecord, AuthzError> {
    let role = Role::from_str(&raw.role)?;
    let permissions: BTreeSet<String> = serde_json::from_str(&raw.permissions)
        .map_err(|e| AuthzError::Internal(format!("bad permissions column: {e}")))?;
    let role_switch: Option<RoleSwitch> = match raw.role_switch {
        Some(json) => Some(
            serde_json::from_str(&json)
                .map_err(|e| AuthzError::Internal(format!("bad role_switch column: {e}")))?,
        ),
        None => None,
    };
    Ok(ActorRecord {
        id: raw.id,
        username: raw.username,
        role,
        permissions,
        role_switch,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    })
}

#[async_trait]
impl ActorStore for SqliteActorStore {
    async fn migrate(&self) -> Result<(), AuthzError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(MIGRATE_SQL).map_err(db_err)
    }

    async fn seed_defaults(
        &self,
        bootstrap_username: &str,
        bootstrap_password_hash: &str,
    ) -> Result<(), AuthzError> {
        super::seed::seed_defaults(self, bootstrap_username, bootstrap_password_hash).await
    }

    // --- Actors ---

    async fn create_actor(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<ActorRecord, AuthzError> {
        let id = {
            let conn = self.conn.lock().unwrap();
            let id = uuid::Uuid::now_v7().to_string();
            conn.execute(
                "INSERT INTO authz_actors (id, username, role, password_hash) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, username, role.as_str(), password_hash],
            )
            .map_err(|e| {
                if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                    if err.extended_code == 2067 {
                        return AuthzError::Duplicate(format!("actor '{username}' already exists"));
                    }
                }
                db_err(e)
            })?;
            id
        };
        self.get_actor(&id).await
    }

    async fn get_actor(&self, id: &str) -> Result<ActorRecord, AuthzError> {
        let raw = {
            let conn = self.conn.lock().unwrap();
            conn.query_row(
                &format!("SELECT {ACTOR_COLS} FROM authz_actors WHERE id = ?1"),
                [id],
                read_raw,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => AuthzError::NotFound("actor not found".into()),
                _ => db_err(e),
            })?
        };
        parse_actor(raw)
    }

    async fn get_actor_by_username(&self, username: &str) -> Result<ActorRecord, AuthzError> {
        let raw = {
            let conn = self.conn.lock().unwrap();
            conn.query_row(
                &format!("SELECT {ACTOR_COLS} FROM authz_actors WHERE username = ?1"),
                [username],
                read_raw,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => AuthzError::NotFound("actor not found".into()),
                _ => db_err(e),
            })?
        };
        parse_actor(raw)
    }

    async fn list_actors(&self) -> Result<Vec<ActorRecord>, AuthzError> {
        let raws = {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {ACTOR_COLS} FROM authz_actors ORDER BY created_at"
                ))
                .map_err(db_err)?;
            let rows = stmt
                .query_map([], read_raw)
                .map_err(db_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_err)?;
            rows
        };
        raws.into_iter().map(parse_actor).collect()
    }

    async fn delete_actor(&self, id: &str) -> Result<(), AuthzError> {
        let conn = self.conn.lock().unwrap();
        let n = conn
            .execute("DELETE FROM authz_actors WHERE id = ?1", [id])
            .map_err(db_err)?;
        if n == 0 {
            return Err(AuthzError::NotFound("actor not found".into()));
        }
        Ok(())
    }

    async fn actor_count(&self) -> Result<u64, AuthzError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM authz_actors", [], |row| row.get(0))
            .map_err(db_err)
    }

    // --- Credentials ---

    async fn get_password_hash(&self, id: &str) -> Result<String, AuthzError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT password_hash FROM authz_actors WHERE id = ?1",
            [id],
            |row| row.get(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AuthzError::NotFound("actor not found".into()),
            _ => db_err(e),
        })
    }

    async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), AuthzError> {
        let conn = self.conn.lock().unwrap();
        let n = conn
            .execute(
                "UPDATE authz_actors SET password_hash = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, password_hash],
            )
            .map_err(db_err)?;
        if n == 0 {
            return Err(AuthzError::NotFound("actor not found".into()));
        }
        Ok(())
    }

    // --- Role switch ---

    async fn set_role_switch(
        &self,
        id: &str,
        switch: Option<RoleSwitch>,
    ) -> Result<(), AuthzError> {
        let json = match &switch {
            Some(s) => Some(
                serde_json::to_string(s)
                    .map_err(|e| AuthzError::Internal(format!("role_switch encode: {e}")))?,
            ),
            None => None,
        };
        let conn = self.conn.lock().unwrap();
        if switch.is_some() {
            // The Actor invariant: only a stored super-admin may carry a switch.
            let role: String = conn
                .query_row("SELECT role FROM authz_actors WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => {
                        AuthzError::NotFound("actor not found".into())
                    }
                    _ => db_err(e),
                })?;
            if Role::from_str(&role)? != Role::SuperAdmin {
                return Err(AuthzError::InvalidInput(
                    "role switch requires a super-admin actor".into(),
                ));
            }
        }
        let n = conn
            .execute(
                "UPDATE authz_actors SET role_switch = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, json],
            )
            .map_err(db_err)?;
        if n == 0 {
            return Err(AuthzError::NotFound("actor not found".into()));
        }
        Ok(())
    }

    // --- Privileged mutations ---

    async fn set_permissions(
        &self,
        id: &str,
        permissions: &BTreeSet<String>,
    ) -> Result<(), AuthzError> {
        let json = serde_json::to_string(permissions)
            .map_err(|e| AuthzError::Internal(format!("permissions encode: {e}")))?;
        let conn = self.conn.lock().unwrap();
        let n = conn
            .execute(
                "UPDATE authz_actors SET permissions = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, json],
            )
            .map_err(db_err)?;
        if n == 0 {
            return Err(AuthzError::NotFound("actor not found".into()));
        }
        Ok(())
    }

    async fn transfer_super_admin(&self, from_id: &str, to_id: &str) -> Result<(), AuthzError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(db_err)?;

        // Demote first; the WHERE clause doubles as the "still super-admin"
        // check under two concurrent tabs. The demoted row's role switch is
        // cleared in the same statement so a stale switch can never outlive
        // the role that made it valid.
        let demoted = tx
            .execute(
                "UPDATE authz_actors SET role = ?2, role_switch = NULL, updated_at = datetime('now') \
                 WHERE id = ?1 AND role = ?3",
                rusqlite::params![from_id, Role::Admin.as_str(), Role::SuperAdmin.as_str()],
            )
            .map_err(db_err)?;
        if demoted != 1 {
            return Err(AuthzError::Unauthorized);
        }

        let promoted = tx
            .execute(
                "UPDATE authz_actors SET role = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![to_id, Role::SuperAdmin.as_str()],
            )
            .map_err(db_err)?;
        if promoted != 1 {
            // tx rolls back on drop; the demotion above is undone with it.
            return Err(AuthzError::NotFound("target actor not found".into()));
        }

        tx.commit().map_err(db_err)
    }

    // --- Audit ---

    async fn log_audit(
        &self,
        actor_id: Option<&str>,
        action: &str,
        target: Option<&str>,
        detail: Option<&str>,
    ) -> Result<(), AuthzError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO authz_audit_log (actor_id, action, target, detail) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![actor_id, action, target, detail],
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_audit(&self, limit: u32, offset: u32) -> Result<Vec<AuditEntry>, AuthzError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, actor_id, action, target, detail, created_at \
                 FROM authz_audit_log ORDER BY id DESC LIMIT ?1 OFFSET ?2",
            )
            .map_err(db_err)?;
        let entries = stmt
            .query_map([limit, offset], |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    actor_id: row.get(1)?,
                    action: row.get(2)?,
                    target: row.get(3)?,
                    detail: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(entries)
    }
}
