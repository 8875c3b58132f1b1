use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::PreventiveProgram;

/// Every preventive program, alphabetical by name.
pub fn list_programs(conn: &Connection) -> Result<Vec<PreventiveProgram>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id_programa, nombre_programa FROM programas_preventivos
         ORDER BY nombre_programa ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(PreventiveProgram {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut programs = Vec::new();
    for row in rows {
        programs.push(row?);
    }
    Ok(programs)
}

pub fn get_program_name(conn: &Connection, id: i64) -> Result<Option<String>, DatabaseError> {
    let result = conn.query_row(
        "SELECT nombre_programa FROM programas_preventivos WHERE id_programa = ?1",
        params![id],
        |row| row.get(0),
    );

    match result {
        Ok(name) => Ok(Some(name)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_program_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id_programa FROM programas_preventivos WHERE nombre_programa = ?1",
        params![name],
        |row| row.get(0),
    );

    match result {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
