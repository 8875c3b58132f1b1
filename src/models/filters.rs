use chrono::NaiveDate;

use super::enums::AppointmentStatus;

#[derive(Debug, Default)]
pub struct AppointmentFilter {
    /// `None` lists every appointment regardless of state.
    pub status: Option<AppointmentStatus>,
}

/// Filters for the per-program statistics report. All optional; an empty
/// filter reproduces the unfiltered report.
#[derive(Debug, Default, Clone)]
pub struct StatsFilter {
    pub obstetrician_dni: Option<String>,
    /// Restrict to these program names. `None` or empty means all programs.
    pub programs: Option<Vec<String>>,
    /// Restrict to the month and year of this date (day is ignored).
    pub month_of: Option<NaiveDate>,
}
