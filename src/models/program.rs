use serde::{Deserialize, Serialize};

/// A preventive-care program patients enroll in once per calendar year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreventiveProgram {
    pub id: i64,
    pub name: String,
}
