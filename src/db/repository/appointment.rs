use chrono::{Datelike, NaiveDateTime};
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

/// Registers a new appointment and returns the generated id.
///
/// Rejects the insert when the patient already has an appointment for the
/// same program within the same calendar year (one enrollment per year).
pub fn insert_appointment(conn: &Connection, appt: &NewAppointment) -> Result<i64, DatabaseError> {
    if has_appointment_in_program_year(conn, appt.patient_id, appt.program_id, appt.scheduled_at)? {
        return Err(DatabaseError::DuplicateYearlyAppointment {
            patient_id: appt.patient_id,
            program_id: appt.program_id,
            year: appt.scheduled_at.year(),
        });
    }

    conn.execute(
        "INSERT INTO citas (id_obstetra, id_paciente, fecha_cita, id_programa, estado_cita, observaciones)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            appt.obstetrician_id,
            appt.patient_id,
            appt.scheduled_at,
            appt.program_id,
            appt.status.as_code(),
            appt.notes,
        ],
    )?;

    let id = conn.last_insert_rowid();
    tracing::info!(id, patient_id = appt.patient_id, program_id = appt.program_id, "Registered appointment");
    Ok(id)
}

/// True when the patient already has an appointment for the program in the
/// calendar year of `scheduled_at`.
pub fn has_appointment_in_program_year(
    conn: &Connection,
    patient_id: i64,
    program_id: i64,
    scheduled_at: NaiveDateTime,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM citas
         WHERE id_paciente = ?1 AND id_programa = ?2
           AND strftime('%Y', fecha_cita) = strftime('%Y', ?3)",
        params![patient_id, program_id, scheduled_at],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Updates the state of an appointment.
pub fn update_appointment_status(
    conn: &Connection,
    id: i64,
    status: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE citas SET estado_cita = ?1 WHERE id_cita = ?2",
        params![status.as_code(), id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Current state of an appointment, `None` when the id does not exist.
pub fn get_appointment_status(
    conn: &Connection,
    id: i64,
) -> Result<Option<AppointmentStatus>, DatabaseError> {
    let result = conn.query_row(
        "SELECT estado_cita FROM citas WHERE id_cita = ?1",
        params![id],
        |row| row.get::<_, i64>(0),
    );

    match result {
        Ok(code) => Ok(Some(AppointmentStatus::from_code(code)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Lists every appointment row (administrative view).
pub fn list_appointments(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id_cita, id_obstetra, id_paciente, fecha_cita, id_programa,
                estado_cita, observaciones, fecha_registro
         FROM citas",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, NaiveDateTime>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, i64>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, NaiveDateTime>(7)?,
        ))
    })?;

    let mut appointments = Vec::new();
    for row in rows {
        let (id, obstetrician_id, patient_id, scheduled_at, program_id, status, notes, registered_at) =
            row?;
        appointments.push(Appointment {
            id,
            obstetrician_id,
            patient_id,
            scheduled_at,
            program_id,
            status: AppointmentStatus::from_code(status)?,
            notes,
            registered_at,
        });
    }
    Ok(appointments)
}

/// Lists appointments with patient, program and obstetrician display fields,
/// optionally restricted to one state, ordered by scheduled date ascending.
pub fn list_appointments_detailed(
    conn: &Connection,
    filter: &AppointmentFilter,
) -> Result<Vec<AppointmentDetail>, DatabaseError> {
    let mut sql = String::from(
        "SELECT c.id_cita, c.fecha_cita, c.estado_cita, c.observaciones, c.fecha_registro,
                p.dni AS dni_paciente, p.nombre_completo AS nombre_paciente,
                u.nombre_completo AS nombre_obstetra,
                pp.nombre_programa
         FROM citas c
         JOIN pacientes p ON c.id_paciente = p.id
         JOIN usuarios u ON c.id_obstetra = u.id
         JOIN programas_preventivos pp ON c.id_programa = pp.id_programa",
    );

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(status) = filter.status {
        params_vec.push(Box::new(status.as_code()));
        sql.push_str(" WHERE c.estado_cita = ?1");
    }
    sql.push_str(" ORDER BY c.fecha_cita ASC");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), map_detail_row)?;
    collect_details(rows)
}

/// Appointments assigned to one obstetrician, most recent first.
pub fn list_appointments_by_obstetrician(
    conn: &Connection,
    obstetrician_id: i64,
) -> Result<Vec<AppointmentDetail>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT c.id_cita, c.fecha_cita, c.estado_cita, c.observaciones, c.fecha_registro,
                p.dni AS dni_paciente, p.nombre_completo AS nombre_paciente,
                u.nombre_completo AS nombre_obstetra,
                pp.nombre_programa
         FROM citas c
         JOIN pacientes p ON c.id_paciente = p.id
         JOIN usuarios u ON c.id_obstetra = u.id
         JOIN programas_preventivos pp ON c.id_programa = pp.id_programa
         WHERE c.id_obstetra = ?1
         ORDER BY c.fecha_cita DESC",
    )?;

    let rows = stmt.query_map(params![obstetrician_id], map_detail_row)?;
    collect_details(rows)
}

type DetailRow = (
    i64,
    NaiveDateTime,
    i64,
    Option<String>,
    NaiveDateTime,
    String,
    String,
    String,
    String,
);

fn map_detail_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DetailRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn collect_details(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<DetailRow>>,
) -> Result<Vec<AppointmentDetail>, DatabaseError> {
    let mut details = Vec::new();
    for row in rows {
        let (id, scheduled_at, status, notes, registered_at, patient_dni, patient_name, obstetrician_name, program_name) =
            row?;
        details.push(AppointmentDetail {
            id,
            scheduled_at,
            patient_dni,
            patient_name,
            program_name,
            obstetrician_name,
            status: AppointmentStatus::from_code(status)?,
            notes,
            registered_at,
        });
    }
    Ok(details)
}
