use crate::models::{UserRow, WishRow};
use crate::Database;
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, Row, Statement, params_from_iter};
use uuid::Uuid;
use wishlist_types::{NewWish, ReserverFilter, Wish, WishFilter, WishPatch};

const USER_COLUMNS: &str = "id, email, password, full_name, created_at";
const WISH_COLUMNS: &str =
    "id, user_id, name, link, notes, priority, reserved_by, reserved_by_id, created_at";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password, full_name) VALUES (?1, ?2, ?3, ?4)",
                (id, email, password_hash, full_name),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Returns the updated row, or `None` when the account does not exist.
    pub fn set_full_name(&self, id: &str, full_name: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("UPDATE users SET full_name = ?1 WHERE id = ?2 RETURNING {USER_COLUMNS}");
            let row = conn
                .query_row(&sql, (full_name, id), read_user_row)
                .optional()?;
            Ok(row)
        })
    }

    // -- Wishes --

    /// Matching wishes, newest first.
    pub fn select_wishes(&self, filter: &WishFilter) -> Result<Vec<Wish>> {
        self.with_conn(|conn| {
            let mut params = Vec::new();
            let where_sql = where_clause(filter, &mut params);
            let sql = format!(
                "SELECT {WISH_COLUMNS} FROM wishes WHERE {where_sql}
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            collect_wishes(&mut stmt, &params)
        })
    }

    pub fn insert_wish(&self, id: Uuid, wish: &NewWish, created_at: DateTime<Utc>) -> Result<Wish> {
        self.with_conn(|conn| {
            let details = &wish.details;
            let sql = format!(
                "INSERT INTO wishes (id, user_id, name, link, notes, priority, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING {WISH_COLUMNS}"
            );
            let row = conn.query_row(
                &sql,
                rusqlite::params![
                    id.to_string(),
                    wish.user_id.to_string(),
                    details.name,
                    details.link,
                    details.notes,
                    details.priority.map(|p| p.rank()),
                    timestamp(created_at),
                ],
                read_wish_row,
            )?;
            Wish::try_from(row)
        })
    }

    /// Conditional update in one statement. Returns the rows that matched the
    /// filter, after the patch was applied; an empty result means nothing changed.
    pub fn update_wishes(&self, filter: &WishFilter, patch: &WishPatch) -> Result<Vec<Wish>> {
        self.with_conn(|conn| {
            let mut params = Vec::new();
            let set_sql = set_clause(patch, &mut params);
            let where_sql = where_clause(filter, &mut params);
            let sql = format!("UPDATE wishes SET {set_sql} WHERE {where_sql} RETURNING {WISH_COLUMNS}");
            let mut stmt = conn.prepare(&sql)?;
            collect_wishes(&mut stmt, &params)
        })
    }

    pub fn delete_wishes(&self, filter: &WishFilter) -> Result<Vec<Wish>> {
        self.with_conn(|conn| {
            let mut params = Vec::new();
            let where_sql = where_clause(filter, &mut params);
            let sql = format!("DELETE FROM wishes WHERE {where_sql} RETURNING {WISH_COLUMNS}");
            let mut stmt = conn.prepare(&sql)?;
            collect_wishes(&mut stmt, &params)
        })
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn push(params: &mut Vec<Value>, value: Value) -> String {
    params.push(value);
    format!("?{}", params.len())
}

fn text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::Text(v.to_string()))
}

fn set_clause(patch: &WishPatch, params: &mut Vec<Value>) -> String {
    match patch {
        WishPatch::Details(details) => {
            let priority = details
                .priority
                .map_or(Value::Null, |p| Value::Integer(i64::from(p.rank())));
            format!(
                "name = {}, link = {}, notes = {}, priority = {}",
                push(params, Value::Text(details.name.clone())),
                push(params, text(details.link.as_deref())),
                push(params, text(details.notes.as_deref())),
                push(params, priority),
            )
        }
        WishPatch::Reserve {
            reserved_by,
            reserved_by_id,
        } => format!(
            "reserved_by = {}, reserved_by_id = {}",
            push(params, Value::Text(reserved_by.clone())),
            push(params, Value::Text(reserved_by_id.to_string())),
        ),
        WishPatch::Release => "reserved_by = NULL, reserved_by_id = NULL".to_string(),
    }
}

fn where_clause(filter: &WishFilter, params: &mut Vec<Value>) -> String {
    let mut clauses = Vec::new();

    if let Some(id) = filter.id {
        clauses.push(format!("id = {}", push(params, Value::Text(id.to_string()))));
    }
    if let Some(owner) = filter.owner {
        clauses.push(format!("user_id = {}", push(params, Value::Text(owner.to_string()))));
    }
    if let Some(user) = filter.not_owner {
        clauses.push(format!("user_id <> {}", push(params, Value::Text(user.to_string()))));
    }
    match filter.reserver {
        ReserverFilter::Any => {}
        ReserverFilter::Unreserved => {
            clauses.push("reserved_by_id IS NULL AND reserved_by IS NULL".to_string());
        }
        ReserverFilter::HeldBy(user) => {
            clauses.push(format!(
                "reserved_by_id = {}",
                push(params, Value::Text(user.to_string()))
            ));
        }
    }

    if clauses.is_empty() {
        "1 = 1".to_string()
    } else {
        clauses.join(" AND ")
    }
}

fn collect_wishes(stmt: &mut Statement<'_>, params: &[Value]) -> Result<Vec<Wish>> {
    let rows = stmt
        .query_map(params_from_iter(params.iter()), read_wish_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter().map(Wish::try_from).collect()
}

fn read_wish_row(row: &Row<'_>) -> rusqlite::Result<WishRow> {
    Ok(WishRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        link: row.get(3)?,
        notes: row.get(4)?,
        priority: row.get(5)?,
        reserved_by: row.get(6)?,
        reserved_by_id: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn read_user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        full_name: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"))?;
    let row = stmt.query_row([value], read_user_row).optional()?;
    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use wishlist_types::{Priority, WishDetails};

    fn db_with_users(n: usize) -> (Database, Vec<Uuid>) {
        let db = Database::open_in_memory().unwrap();
        let ids: Vec<Uuid> = (0..n).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            db.create_user(&id.to_string(), &format!("user{i}@example.com"), "hash", None)
                .unwrap();
        }
        (db, ids)
    }

    fn add(db: &Database, owner: Uuid, name: &str, at: DateTime<Utc>) -> Wish {
        let wish = NewWish {
            user_id: owner,
            details: WishDetails {
                name: name.to_string(),
                link: None,
                notes: None,
                priority: Priority::new(3),
            },
        };
        db.insert_wish(Uuid::new_v4(), &wish, at).unwrap()
    }

    #[test]
    fn email_lookup_ignores_case() {
        let (db, ids) = db_with_users(1);
        let row = db.get_user_by_email("USER0@Example.com").unwrap().unwrap();
        assert_eq!(row.id, ids[0].to_string());
        assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn set_full_name_returns_updated_row() {
        let (db, ids) = db_with_users(1);
        let row = db.set_full_name(&ids[0].to_string(), "Mrs. Claus").unwrap().unwrap();
        assert_eq!(row.full_name.as_deref(), Some("Mrs. Claus"));
        assert!(db.set_full_name(&Uuid::new_v4().to_string(), "x").unwrap().is_none());
    }

    #[test]
    fn select_orders_newest_first() {
        let (db, ids) = db_with_users(2);
        let now = Utc::now();
        add(&db, ids[0], "old", now - Duration::days(1));
        add(&db, ids[0], "new", now);
        add(&db, ids[1], "other", now);

        let names: Vec<String> = db
            .select_wishes(&WishFilter::by_owner(ids[0]))
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();
        assert_eq!(names, vec!["new", "old"]);
    }

    #[test]
    fn reserve_only_matches_unreserved_rows() {
        let (db, ids) = db_with_users(3);
        let wish = add(&db, ids[0], "sled", Utc::now());
        let filter = WishFilter::by_id(wish.id).not_owned_by(ids[1]).unreserved();
        let patch = WishPatch::Reserve {
            reserved_by: "Bob".into(),
            reserved_by_id: ids[1],
        };

        let first = db.update_wishes(&filter, &patch).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].reserved_by.as_deref(), Some("Bob"));
        assert_eq!(first[0].reserved_by_id, Some(ids[1]));

        let second = db
            .update_wishes(
                &WishFilter::by_id(wish.id).not_owned_by(ids[2]).unreserved(),
                &WishPatch::Reserve {
                    reserved_by: "Carol".into(),
                    reserved_by_id: ids[2],
                },
            )
            .unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn not_owner_filter_blocks_self_reservation() {
        let (db, ids) = db_with_users(1);
        let wish = add(&db, ids[0], "sled", Utc::now());
        let rows = db
            .update_wishes(
                &WishFilter::by_id(wish.id).not_owned_by(ids[0]).unreserved(),
                &WishPatch::Reserve {
                    reserved_by: "me".into(),
                    reserved_by_id: ids[0],
                },
            )
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn release_requires_matching_reserver() {
        let (db, ids) = db_with_users(3);
        let wish = add(&db, ids[0], "sled", Utc::now());
        db.update_wishes(
            &WishFilter::by_id(wish.id).unreserved(),
            &WishPatch::Reserve {
                reserved_by: "Bob".into(),
                reserved_by_id: ids[1],
            },
        )
        .unwrap();

        let by_other = db
            .update_wishes(&WishFilter::by_id(wish.id).reserved_by(ids[2]), &WishPatch::Release)
            .unwrap();
        assert!(by_other.is_empty());

        let by_holder = db
            .update_wishes(&WishFilter::by_id(wish.id).reserved_by(ids[1]), &WishPatch::Release)
            .unwrap();
        assert_eq!(by_holder.len(), 1);
        assert!(!by_holder[0].is_reserved());
    }

    #[test]
    fn details_and_delete_respect_owner_filter() {
        let (db, ids) = db_with_users(2);
        let wish = add(&db, ids[0], "sled", Utc::now());
        let details = WishDetails {
            name: "Toboggan".into(),
            link: Some("https://example.com".into()),
            notes: None,
            priority: None,
        };

        let foreign = db
            .update_wishes(
                &WishFilter::by_id(wish.id).owned_by(ids[1]),
                &WishPatch::Details(details.clone()),
            )
            .unwrap();
        assert!(foreign.is_empty());
        assert!(db.delete_wishes(&WishFilter::by_id(wish.id).owned_by(ids[1])).unwrap().is_empty());

        let own = db
            .update_wishes(
                &WishFilter::by_id(wish.id).owned_by(ids[0]),
                &WishPatch::Details(details),
            )
            .unwrap();
        assert_eq!(own[0].name, "Toboggan");
        assert_eq!(own[0].priority, None);

        let deleted = db.delete_wishes(&WishFilter::by_id(wish.id).owned_by(ids[0])).unwrap();
        assert_eq!(deleted.len(), 1);
        assert!(db.select_wishes(&WishFilter::by_id(wish.id)).unwrap().is_empty());
    }
}
