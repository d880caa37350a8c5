use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::models::{Spin, SpinRecord};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS spins (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    value        INTEGER NOT NULL,
    recorded_at  TEXT NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("sixline.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn insert_spin(conn: &Connection, value: Spin) -> Result<i64> {
    conn.execute(
        "INSERT INTO spins (value, recorded_at) VALUES (?1, ?2)",
        rusqlite::params![value, now()],
    ).context("Échec de l'insertion")?;
    Ok(conn.last_insert_rowid())
}

/// Insère une série de numéros dans une seule transaction, dans l'ordre donné.
pub fn insert_spins(conn: &Connection, values: &[Spin]) -> Result<u32> {
    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;
    let recorded_at = now();
    let mut inserted = 0u32;
    {
        let mut stmt = tx.prepare("INSERT INTO spins (value, recorded_at) VALUES (?1, ?2)")?;
        for &value in values {
            stmt.execute(rusqlite::params![value, recorded_at])
                .context("Échec de l'insertion")?;
            inserted += 1;
        }
    }
    tx.commit().context("Échec du commit")?;
    log::info!("{} numéros insérés", inserted);
    Ok(inserted)
}

/// Historique complet, du plus ancien au plus récent.
pub fn fetch_history(conn: &Connection) -> Result<Vec<Spin>> {
    let mut stmt = conn.prepare("SELECT value FROM spins ORDER BY id ASC")?;
    let spins = stmt
        .query_map([], |row| row.get::<_, Spin>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(spins)
}

/// Les `limit` derniers numéros, renvoyés du plus ancien au plus récent.
pub fn fetch_last_spins(conn: &Connection, limit: u32) -> Result<Vec<SpinRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, value, recorded_at FROM spins ORDER BY id DESC LIMIT ?1"
    )?;
    let mut spins = stmt.query_map([limit], |row| {
        Ok(SpinRecord {
            id: row.get(0)?,
            value: row.get(1)?,
            recorded_at: row.get(2)?,
        })
    })?.collect::<Result<Vec<_>, _>>()?;
    spins.reverse();
    Ok(spins)
}

pub fn delete_last_spin(conn: &Connection) -> Result<Option<Spin>> {
    let last: Option<(i64, Spin)> = conn
        .query_row(
            "SELECT id, value FROM spins ORDER BY id DESC LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    match last {
        Some((id, value)) => {
            conn.execute("DELETE FROM spins WHERE id = ?1", [id])
                .context("Échec de la suppression")?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub fn clear_spins(conn: &Connection) -> Result<u32> {
    let deleted = conn.execute("DELETE FROM spins", [])
        .context("Échec de la suppression")?;
    Ok(deleted as u32)
}

pub fn count_spins(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM spins", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_count() {
        let conn = test_conn();
        assert_eq!(count_spins(&conn).unwrap(), 0);

        insert_spin(&conn, 17).unwrap();
        assert_eq!(count_spins(&conn).unwrap(), 1);
    }

    #[test]
    fn test_history_keeps_insertion_order() {
        let conn = test_conn();
        insert_spins(&conn, &[5, 0, 36, 5]).unwrap();
        insert_spin(&conn, 12).unwrap();

        assert_eq!(fetch_history(&conn).unwrap(), vec![5, 0, 36, 5, 12]);
    }

    #[test]
    fn test_fetch_last_spins_oldest_first() {
        let conn = test_conn();
        insert_spins(&conn, &[1, 2, 3, 4, 5]).unwrap();

        let last = fetch_last_spins(&conn, 3).unwrap();
        let values: Vec<Spin> = last.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![3, 4, 5]);
        assert!(last[0].id < last[2].id);
    }

    #[test]
    fn test_delete_last_spin() {
        let conn = test_conn();
        insert_spins(&conn, &[7, 8]).unwrap();

        assert_eq!(delete_last_spin(&conn).unwrap(), Some(8));
        assert_eq!(fetch_history(&conn).unwrap(), vec![7]);
        assert_eq!(delete_last_spin(&conn).unwrap(), Some(7));
        assert_eq!(delete_last_spin(&conn).unwrap(), None);
    }

    #[test]
    fn test_clear_spins() {
        let conn = test_conn();
        insert_spins(&conn, &[1, 2, 3]).unwrap();

        assert_eq!(clear_spins(&conn).unwrap(), 3);
        assert_eq!(count_spins(&conn).unwrap(), 0);
    }
}
