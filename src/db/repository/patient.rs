use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::Patient;

pub fn insert_patient(
    conn: &Connection,
    dni: &str,
    full_name: &str,
) -> Result<Patient, DatabaseError> {
    conn.execute(
        "INSERT INTO pacientes (dni, nombre_completo) VALUES (?1, ?2)",
        params![dni, full_name],
    )?;
    Ok(Patient {
        id: conn.last_insert_rowid(),
        dni: dni.to_string(),
        full_name: full_name.to_string(),
    })
}

/// Patient id for a national identity number, `None` when unregistered.
pub fn get_patient_id_by_dni(conn: &Connection, dni: &str) -> Result<Option<i64>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id FROM pacientes WHERE dni = ?1",
        params![dni],
        |row| row.get(0),
    );

    match result {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_patient_name(conn: &Connection, id: i64) -> Result<Option<String>, DatabaseError> {
    let result = conn.query_row(
        "SELECT nombre_completo FROM pacientes WHERE id = ?1",
        params![id],
        |row| row.get(0),
    );

    match result {
        Ok(name) => Ok(Some(name)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_patient_dni(conn: &Connection, id: i64) -> Result<Option<String>, DatabaseError> {
    let result = conn.query_row(
        "SELECT dni FROM pacientes WHERE id = ?1",
        params![id],
        |row| row.get(0),
    );

    match result {
        Ok(dni) => Ok(Some(dni)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn patient_exists_by_dni(conn: &Connection, dni: &str) -> Result<bool, DatabaseError> {
    Ok(get_patient_id_by_dni(conn, dni)?.is_some())
}
