use serde::{Deserialize, Serialize};

use super::enums::StaffRole;

/// A row of the `usuarios` table (clinic staff).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub dni: String,
    pub full_name: String,
    pub role: StaffRole,
}
