//! Preventive-program attendance statistics.
//!
//! Aggregates appointment counts per program or per obstetrician, with an
//! optional filter by obstetrician DNI, program names and month. Feeds the
//! statistics screen: a table of totals plus one chart series.

use chrono::Datelike;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;
use crate::models::StatsFilter;

// ─── Aggregates ───

/// Attendance totals for one preventive program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramStats {
    pub program: String,
    pub total: i64,
    pub attended: i64,
    pub percentage: f64,
}

/// Attendance totals for one obstetrician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstetricianStats {
    pub obstetrician: String,
    pub total: i64,
    pub attended: i64,
    pub percentage: f64,
}

/// Share of attended appointments, as a percentage. Zero when there are no
/// appointments at all.
pub fn attendance_percentage(attended: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        attended as f64 * 100.0 / total as f64
    }
}

/// Totals per program over every registered appointment. Programs with no
/// appointments appear with zero counts.
pub fn program_statistics(conn: &Connection) -> Result<Vec<ProgramStats>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT pp.nombre_programa,
                COUNT(c.id_cita) AS total,
                COALESCE(SUM(CASE WHEN c.estado_cita = 2 THEN 1 ELSE 0 END), 0) AS atendidas
         FROM programas_preventivos pp
         LEFT JOIN citas c ON c.id_programa = pp.id_programa
         GROUP BY pp.id_programa, pp.nombre_programa
         ORDER BY pp.nombre_programa ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut stats = Vec::new();
    for row in rows {
        let (program, total, attended) = row?;
        stats.push(ProgramStats {
            program,
            total,
            attended,
            percentage: attendance_percentage(attended, total),
        });
    }
    Ok(stats)
}

/// Totals per obstetrician over every registered appointment. Obstetricians
/// with no appointments appear with zero counts; other staff roles do not
/// appear.
pub fn obstetrician_statistics(conn: &Connection) -> Result<Vec<ObstetricianStats>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT u.nombre_completo,
                COUNT(c.id_cita) AS total,
                COALESCE(SUM(CASE WHEN c.estado_cita = 2 THEN 1 ELSE 0 END), 0) AS atendidas
         FROM usuarios u
         LEFT JOIN citas c ON c.id_obstetra = u.id
         WHERE u.rol = 'OBSTETRA'
         GROUP BY u.id, u.nombre_completo
         ORDER BY u.nombre_completo ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut stats = Vec::new();
    for row in rows {
        let (obstetrician, total, attended) = row?;
        stats.push(ObstetricianStats {
            obstetrician,
            total,
            attended,
            percentage: attendance_percentage(attended, total),
        });
    }
    Ok(stats)
}

/// Totals per program restricted by an optional obstetrician DNI, an optional
/// set of program names and an optional month. An empty filter reproduces the
/// unfiltered per-program report, and a selected program keeps its row with
/// zero counts when nothing matches. The DNI and month conditions apply to
/// the joined appointment rows, so they hide programs without a match.
pub fn program_statistics_filtered(
    conn: &Connection,
    filter: &StatsFilter,
) -> Result<Vec<ProgramStats>, DatabaseError> {
    let mut sql = String::from(
        "SELECT pp.nombre_programa,
                COUNT(c.id_cita) AS total,
                COALESCE(SUM(CASE WHEN c.estado_cita = 2 THEN 1 ELSE 0 END), 0) AS atendidas
         FROM programas_preventivos pp
         LEFT JOIN citas c ON c.id_programa = pp.id_programa
         LEFT JOIN usuarios u ON c.id_obstetra = u.id
         WHERE 1=1",
    );

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(dni) = filter.obstetrician_dni.as_deref() {
        if !dni.is_empty() {
            params_vec.push(Box::new(dni.to_string()));
            sql.push_str(&format!(" AND u.dni = ?{}", params_vec.len()));
        }
    }

    if let Some(programs) = filter.programs.as_ref() {
        if !programs.is_empty() {
            let mut placeholders = Vec::with_capacity(programs.len());
            for name in programs {
                params_vec.push(Box::new(name.clone()));
                placeholders.push(format!("?{}", params_vec.len()));
            }
            sql.push_str(&format!(
                " AND pp.nombre_programa IN ({})",
                placeholders.join(", ")
            ));
        }
    }

    if let Some(date) = filter.month_of {
        params_vec.push(Box::new(i64::from(date.month())));
        sql.push_str(&format!(
            " AND CAST(strftime('%m', c.fecha_cita) AS INTEGER) = ?{}",
            params_vec.len()
        ));
        params_vec.push(Box::new(i64::from(date.year())));
        sql.push_str(&format!(
            " AND CAST(strftime('%Y', c.fecha_cita) AS INTEGER) = ?{}",
            params_vec.len()
        ));
    }

    sql.push_str(" GROUP BY pp.nombre_programa ORDER BY pp.nombre_programa ASC");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut stats = Vec::new();
    for row in rows {
        let (program, total, attended) = row?;
        stats.push(ProgramStats {
            program,
            total,
            attended,
            percentage: attendance_percentage(attended, total),
        });
    }
    Ok(stats)
}

// ─── Statistics screen view model ───

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

/// One plotted value, labeled by program name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub title: String,
    pub category_label: String,
    pub value_label: String,
    pub points: Vec<ChartPoint>,
}

/// One table row of the statistics screen, percentage pre-formatted for
/// display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    pub program: String,
    pub total: i64,
    pub attended: i64,
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsView {
    pub rows: Vec<StatsRow>,
    pub chart: ChartSeries,
}

fn chart_title(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Bar => "Atenciones por Programa",
        ChartKind::Pie => "Distribución por Programa",
        ChartKind::Line => "Tendencia de Atención",
    }
}

/// Builds a chart series over the attended counts of `stats`.
pub fn build_chart_series(stats: &[ProgramStats], kind: ChartKind) -> ChartSeries {
    ChartSeries {
        title: chart_title(kind).to_string(),
        category_label: "Programa".to_string(),
        value_label: "Cantidad".to_string(),
        points: stats
            .iter()
            .map(|s| ChartPoint {
                label: s.program.clone(),
                value: s.attended,
            })
            .collect(),
    }
}

/// Runs the filtered per-program report and packages it for the statistics
/// screen: one table row per program plus the requested chart.
pub fn build_statistics_view(
    conn: &Connection,
    filter: &StatsFilter,
    kind: ChartKind,
) -> Result<StatisticsView, DatabaseError> {
    let stats = program_statistics_filtered(conn, filter)?;
    let chart = build_chart_series(&stats, kind);
    let rows = stats
        .into_iter()
        .map(|s| StatsRow {
            program: s.program,
            total: s.total,
            attended: s.attended,
            percentage: format!("{:.2}%", s.percentage),
        })
        .collect();
    Ok(StatisticsView { rows, chart })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use rusqlite::Connection;

    use crate::db::repository::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn seed_appointment(
        conn: &Connection,
        obstetrician_id: i64,
        patient_dni: &str,
        program: &str,
        scheduled: &str,
        attended: bool,
    ) {
        let patient_id = match get_patient_id_by_dni(conn, patient_dni).unwrap() {
            Some(id) => id,
            None => insert_patient(conn, patient_dni, "Paciente de Prueba").unwrap().id,
        };
        let program_id = get_program_id_by_name(conn, program).unwrap().unwrap();
        let status = if attended {
            AppointmentStatus::Attended
        } else {
            AppointmentStatus::Pending
        };
        insert_appointment(
            conn,
            &NewAppointment {
                obstetrician_id,
                patient_id,
                scheduled_at: datetime(scheduled),
                program_id,
                status,
                notes: None,
            },
        )
        .unwrap();
    }

    fn seed_obstetrician(conn: &Connection, dni: &str, name: &str) -> i64 {
        insert_staff(conn, dni, name, StaffRole::Obstetrician).unwrap().id
    }

    fn find<'a>(stats: &'a [ProgramStats], program: &str) -> &'a ProgramStats {
        stats.iter().find(|s| s.program == program).unwrap()
    }

    #[test]
    fn percentage_is_zero_without_appointments() {
        assert_eq!(attendance_percentage(0, 0), 0.0);
        assert_eq!(attendance_percentage(3, 4), 75.0);
        assert_eq!(attendance_percentage(1, 3), 100.0 / 3.0);
    }

    #[test]
    fn program_statistics_cover_every_program() {
        let conn = test_db();
        let obst = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        seed_appointment(&conn, obst, "45678912", "Papanicolaou", "2025-03-10 09:00:00", true);
        seed_appointment(&conn, obst, "40011223", "Papanicolaou", "2025-03-11 09:00:00", false);
        seed_appointment(&conn, obst, "45678912", "VPH", "2025-04-01 09:00:00", true);

        let stats = program_statistics(&conn).unwrap();
        assert_eq!(stats.len(), 5);

        let pap = find(&stats, "Papanicolaou");
        assert_eq!(pap.total, 2);
        assert_eq!(pap.attended, 1);
        assert_eq!(pap.percentage, 50.0);

        let vph = find(&stats, "VPH");
        assert_eq!(vph.total, 1);
        assert_eq!(vph.attended, 1);
        assert_eq!(vph.percentage, 100.0);

        let empty = find(&stats, "Consejería");
        assert_eq!(empty.total, 0);
        assert_eq!(empty.attended, 0);
        assert_eq!(empty.percentage, 0.0);
    }

    #[test]
    fn program_statistics_sorted_by_name() {
        let conn = test_db();
        let stats = program_statistics(&conn).unwrap();
        let names: Vec<&str> = stats.iter().map(|s| s.program.as_str()).collect();
        assert_eq!(
            names,
            vec!["Consejería", "Examen de mamas", "IVA", "Papanicolaou", "VPH"]
        );
    }

    #[test]
    fn obstetrician_statistics_exclude_admins() {
        let conn = test_db();
        let obst_a = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        seed_obstetrician(&conn, "22334455", "Carmen Huarcaya Soto");
        insert_staff(&conn, "33445566", "Admin General", StaffRole::Admin).unwrap();

        seed_appointment(&conn, obst_a, "45678912", "Papanicolaou", "2025-03-10 09:00:00", true);
        seed_appointment(&conn, obst_a, "40011223", "VPH", "2025-03-12 09:00:00", false);

        let stats = obstetrician_statistics(&conn).unwrap();
        assert_eq!(stats.len(), 2);

        let carmen = &stats[0];
        assert_eq!(carmen.obstetrician, "Carmen Huarcaya Soto");
        assert_eq!(carmen.total, 0);
        assert_eq!(carmen.percentage, 0.0);

        let rosa = &stats[1];
        assert_eq!(rosa.obstetrician, "Rosa Delgado Paredes");
        assert_eq!(rosa.total, 2);
        assert_eq!(rosa.attended, 1);
        assert_eq!(rosa.percentage, 50.0);
    }

    #[test]
    fn empty_filter_matches_unfiltered_counts() {
        let conn = test_db();
        let obst = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        seed_appointment(&conn, obst, "45678912", "Papanicolaou", "2025-03-10 09:00:00", true);
        seed_appointment(&conn, obst, "40011223", "IVA", "2025-05-02 09:00:00", false);

        let stats = program_statistics_filtered(&conn, &StatsFilter::default()).unwrap();
        assert_eq!(stats.len(), 5);
        assert_eq!(find(&stats, "Papanicolaou").attended, 1);
        assert_eq!(find(&stats, "IVA").attended, 0);
        assert_eq!(find(&stats, "Consejería").total, 0);
        assert_eq!(stats, program_statistics(&conn).unwrap());
    }

    #[test]
    fn filter_by_obstetrician_dni() {
        let conn = test_db();
        let obst_a = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        let obst_b = seed_obstetrician(&conn, "22334455", "Carmen Huarcaya Soto");
        seed_appointment(&conn, obst_a, "45678912", "Papanicolaou", "2025-03-10 09:00:00", true);
        seed_appointment(&conn, obst_b, "40011223", "Papanicolaou", "2025-03-11 09:00:00", true);
        seed_appointment(&conn, obst_b, "40011223", "VPH", "2025-03-12 09:00:00", false);

        let filter = StatsFilter {
            obstetrician_dni: Some("22334455".into()),
            ..Default::default()
        };
        let stats = program_statistics_filtered(&conn, &filter).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(find(&stats, "Papanicolaou").total, 1);
        assert_eq!(find(&stats, "VPH").total, 1);
    }

    #[test]
    fn filter_by_program_names() {
        let conn = test_db();
        let obst = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        seed_appointment(&conn, obst, "45678912", "Papanicolaou", "2025-03-10 09:00:00", true);
        seed_appointment(&conn, obst, "45678912", "VPH", "2025-04-01 09:00:00", true);
        seed_appointment(&conn, obst, "45678912", "IVA", "2025-05-01 09:00:00", true);

        let filter = StatsFilter {
            programs: Some(vec!["Papanicolaou".into(), "VPH".into()]),
            ..Default::default()
        };
        let stats = program_statistics_filtered(&conn, &filter).unwrap();
        let names: Vec<&str> = stats.iter().map(|s| s.program.as_str()).collect();
        assert_eq!(names, vec!["Papanicolaou", "VPH"]);
    }

    #[test]
    fn empty_program_list_means_no_restriction() {
        let conn = test_db();
        let obst = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        seed_appointment(&conn, obst, "45678912", "Papanicolaou", "2025-03-10 09:00:00", true);
        seed_appointment(&conn, obst, "45678912", "VPH", "2025-04-01 09:00:00", true);

        let filter = StatsFilter {
            programs: Some(Vec::new()),
            ..Default::default()
        };
        let stats = program_statistics_filtered(&conn, &filter).unwrap();
        assert_eq!(stats.len(), 5);
    }

    #[test]
    fn selected_program_without_appointments_keeps_zero_row() {
        let conn = test_db();
        let obst = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        seed_appointment(&conn, obst, "45678912", "Papanicolaou", "2025-03-10 09:00:00", true);

        let filter = StatsFilter {
            programs: Some(vec!["Papanicolaou".into(), "VPH".into()]),
            ..Default::default()
        };
        let stats = program_statistics_filtered(&conn, &filter).unwrap();
        assert_eq!(stats.len(), 2);

        let vph = find(&stats, "VPH");
        assert_eq!(vph.total, 0);
        assert_eq!(vph.attended, 0);
        assert_eq!(vph.percentage, 0.0);
    }

    #[test]
    fn filter_by_month_ignores_day() {
        let conn = test_db();
        let obst = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        seed_appointment(&conn, obst, "45678912", "Papanicolaou", "2025-03-10 09:00:00", true);
        seed_appointment(&conn, obst, "40011223", "Papanicolaou", "2025-03-25 09:00:00", false);
        seed_appointment(&conn, obst, "50012345", "Papanicolaou", "2025-04-02 09:00:00", true);

        let filter = StatsFilter {
            month_of: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..Default::default()
        };
        let stats = program_statistics_filtered(&conn, &filter).unwrap();
        assert_eq!(stats.len(), 1);
        let pap = &stats[0];
        assert_eq!(pap.total, 2);
        assert_eq!(pap.attended, 1);
    }

    #[test]
    fn month_filter_distinguishes_year() {
        let conn = test_db();
        let obst = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        seed_appointment(&conn, obst, "45678912", "IVA", "2024-03-10 09:00:00", true);
        seed_appointment(&conn, obst, "45678912", "IVA", "2025-03-10 09:00:00", false);

        let filter = StatsFilter {
            month_of: NaiveDate::from_ymd_opt(2025, 3, 15),
            ..Default::default()
        };
        let stats = program_statistics_filtered(&conn, &filter).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total, 1);
        assert_eq!(stats[0].attended, 0);
    }

    #[test]
    fn combined_filters_intersect() {
        let conn = test_db();
        let obst_a = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        let obst_b = seed_obstetrician(&conn, "22334455", "Carmen Huarcaya Soto");
        seed_appointment(&conn, obst_a, "45678912", "Papanicolaou", "2025-03-10 09:00:00", true);
        seed_appointment(&conn, obst_a, "45678912", "VPH", "2025-03-12 09:00:00", true);
        seed_appointment(&conn, obst_b, "40011223", "Papanicolaou", "2025-03-14 09:00:00", true);
        seed_appointment(&conn, obst_a, "50012345", "Papanicolaou", "2025-06-01 09:00:00", true);

        let filter = StatsFilter {
            obstetrician_dni: Some("11223344".into()),
            programs: Some(vec!["Papanicolaou".into()]),
            month_of: NaiveDate::from_ymd_opt(2025, 3, 1),
        };
        let stats = program_statistics_filtered(&conn, &filter).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].program, "Papanicolaou");
        assert_eq!(stats[0].total, 1);
        assert_eq!(stats[0].attended, 1);
    }

    #[test]
    fn chart_series_plots_attended_counts() {
        let stats = vec![
            ProgramStats {
                program: "Papanicolaou".into(),
                total: 4,
                attended: 3,
                percentage: 75.0,
            },
            ProgramStats {
                program: "VPH".into(),
                total: 2,
                attended: 1,
                percentage: 50.0,
            },
        ];

        let bar = build_chart_series(&stats, ChartKind::Bar);
        assert_eq!(bar.title, "Atenciones por Programa");
        assert_eq!(bar.category_label, "Programa");
        assert_eq!(bar.value_label, "Cantidad");
        assert_eq!(bar.points.len(), 2);
        assert_eq!(bar.points[0].label, "Papanicolaou");
        assert_eq!(bar.points[0].value, 3);

        let pie = build_chart_series(&stats, ChartKind::Pie);
        assert_eq!(pie.title, "Distribución por Programa");

        let line = build_chart_series(&stats, ChartKind::Line);
        assert_eq!(line.title, "Tendencia de Atención");
        assert_eq!(line.points[1].value, 1);
    }

    #[test]
    fn statistics_view_formats_percentages() {
        let conn = test_db();
        let obst = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        seed_appointment(&conn, obst, "45678912", "Papanicolaou", "2025-03-10 09:00:00", true);
        seed_appointment(&conn, obst, "40011223", "Papanicolaou", "2025-03-11 09:00:00", false);
        seed_appointment(&conn, obst, "50012345", "Papanicolaou", "2025-03-12 09:00:00", false);

        let view =
            build_statistics_view(&conn, &StatsFilter::default(), ChartKind::Bar).unwrap();
        assert_eq!(view.rows.len(), 5);

        let pap = view.rows.iter().find(|r| r.program == "Papanicolaou").unwrap();
        assert_eq!(pap.percentage, "33.33%");
        let empty = view.rows.iter().find(|r| r.program == "VPH").unwrap();
        assert_eq!(empty.percentage, "0.00%");

        let point = view.chart.points.iter().find(|p| p.label == "Papanicolaou").unwrap();
        assert_eq!(point.value, 1);
    }

    #[test]
    fn statistics_view_serializes_to_json() {
        let conn = test_db();
        let obst = seed_obstetrician(&conn, "11223344", "Rosa Delgado Paredes");
        seed_appointment(&conn, obst, "45678912", "VPH", "2025-03-10 09:00:00", true);

        let view =
            build_statistics_view(&conn, &StatsFilter::default(), ChartKind::Pie).unwrap();
        let json = serde_json::to_string(&view).unwrap();

        let parsed: StatisticsView = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, view);
        assert!(json.contains("Distribución por Programa"));
    }
}
