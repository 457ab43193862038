use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::Account;

use super::parse_uuid;

const COLUMNS: &str =
    "id, email, password_hash, name, role, hospital_name, hospital_id, created_at";

pub fn insert_account(conn: &Connection, account: &Account) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO accounts (id, email, password_hash, name, role, hospital_name, hospital_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            account.id.to_string(),
            account.email,
            account.password_hash,
            account.name,
            account.role.as_str(),
            account.hospital_name,
            account.hospital_id,
            account.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_account(conn: &Connection, id: &uuid::Uuid) -> Result<Option<Account>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM accounts WHERE id = ?1"),
            params![id.to_string()],
            account_from_row,
        )
        .optional()?;
    row.map(finish).transpose()
}

pub fn get_account_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Account>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM accounts WHERE email = ?1"),
            params![email],
            account_from_row,
        )
        .optional()?;
    row.map(finish).transpose()
}

pub fn count_accounts(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
    Ok(count)
}

struct AccountRow {
    id: String,
    email: String,
    password_hash: String,
    name: String,
    role: String,
    hospital_name: Option<String>,
    hospital_id: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

fn account_from_row(row: &Row) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        role: row.get(4)?,
        hospital_name: row.get(5)?,
        hospital_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn finish(row: AccountRow) -> Result<Account, DatabaseError> {
    Ok(Account {
        id: parse_uuid(&row.id),
        email: row.email,
        password_hash: row.password_hash,
        name: row.name,
        role: Role::from_str(&row.role)?,
        hospital_name: row.hospital_name,
        hospital_id: row.hospital_id,
        created_at: row.created_at,
    })
}
