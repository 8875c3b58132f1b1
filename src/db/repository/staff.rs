use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{Staff, StaffRole};

pub fn insert_staff(
    conn: &Connection,
    dni: &str,
    full_name: &str,
    role: StaffRole,
) -> Result<Staff, DatabaseError> {
    conn.execute(
        "INSERT INTO usuarios (dni, nombre_completo, rol) VALUES (?1, ?2, ?3)",
        params![dni, full_name, role.as_str()],
    )?;
    Ok(Staff {
        id: conn.last_insert_rowid(),
        dni: dni.to_string(),
        full_name: full_name.to_string(),
        role,
    })
}

/// Display name of an obstetrician, `None` when the id does not exist or
/// belongs to a different role.
pub fn get_obstetrician_name(conn: &Connection, id: i64) -> Result<Option<String>, DatabaseError> {
    let result = conn.query_row(
        "SELECT nombre_completo FROM usuarios WHERE id = ?1 AND rol = 'OBSTETRA'",
        params![id],
        |row| row.get(0),
    );

    match result {
        Ok(name) => Ok(Some(name)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_staff_by_dni(conn: &Connection, dni: &str) -> Result<Option<Staff>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, dni, nombre_completo, rol FROM usuarios WHERE dni = ?1",
        params![dni],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        },
    );

    match result {
        Ok((id, dni, full_name, role)) => Ok(Some(Staff {
            id,
            dni,
            full_name,
            role: StaffRole::from_str(&role)?,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
