use anyhow::{Context, Result};
use sixline_db::rusqlite::Connection;
use std::path::Path;

use sixline_db::db::insert_spins;
use sixline_db::models::{validate_spin, Spin};
use sixline_engine::parse::parse_number_input;

pub struct ImportResult {
    pub total_numbers: u32,
    pub inserted: u32,
    pub out_of_range: u32,
}

/// Sépare les numéros valides (0-36) des autres, en gardant l'ordre.
pub fn split_valid(numbers: Vec<Spin>) -> (Vec<Spin>, u32) {
    let mut out_of_range = 0u32;
    let valid = numbers
        .into_iter()
        .filter(|&n| match validate_spin(n) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{e}");
                out_of_range += 1;
                false
            }
        })
        .collect();
    (valid, out_of_range)
}

pub fn import_history(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let numbers = parse_number_input(&content);
    let total_numbers = numbers.len() as u32;
    let (valid, out_of_range) = split_valid(numbers);

    let inserted = insert_spins(conn, &valid)?;
    log::info!("import de {:?} : {} numéros", path, inserted);

    Ok(ImportResult {
        total_numbers,
        inserted,
        out_of_range,
    })
}
