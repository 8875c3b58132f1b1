use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(StaffRole {
    Obstetrician => "OBSTETRA",
    Admin => "ADMIN",
});

/// Appointment state, stored as an integer code in `citas.estado_cita`.
///
/// Code 2 is the "attended" state the statistics queries count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Pending,
    Attended,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_code(&self) -> i64 {
        match self {
            Self::Pending => 1,
            Self::Attended => 2,
            Self::Cancelled => 3,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, DatabaseError> {
        match code {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Attended),
            3 => Ok(Self::Cancelled),
            _ => Err(DatabaseError::InvalidEnum {
                field: "AppointmentStatus".into(),
                value: code.to_string(),
            }),
        }
    }
}
