use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// A row of the `citas` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub obstetrician_id: i64,
    pub patient_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub program_id: i64,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub registered_at: NaiveDateTime,
}

/// Insert payload — id and registration timestamp are assigned by the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub obstetrician_id: i64,
    pub patient_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub program_id: i64,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

/// Joined listing row: appointment plus patient, program and obstetrician
/// display fields, as the scheduling screens show them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetail {
    pub id: i64,
    pub scheduled_at: NaiveDateTime,
    pub patient_dni: String,
    pub patient_name: String,
    pub program_name: String,
    pub obstetrician_name: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub registered_at: NaiveDateTime,
}
