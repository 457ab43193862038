use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The serde representation matches the stored string so the same value
/// appears in the database, the API, and the broadcast channel.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            pub const ALL: &'static [$name] = &[$($name::$variant),+];
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

str_enum!(Role {
    Doctor => "doctor",
    Government => "government",
});

str_enum!(MedicineStatus {
    Pending => "pending",
    Approved => "approved",
    Fulfilled => "fulfilled",
    Rejected => "rejected",
});

str_enum!(EmergencyStatus {
    Pending => "pending",
    InProgress => "in_progress",
    Resolved => "resolved",
    Cancelled => "cancelled",
});

str_enum!(CampType {
    GeneralCheckup => "General Checkup",
    DengueCheckup => "Dengue Checkup",
    Covid19 => "COVID-19",
    MalariaScreening => "Malaria Screening",
    EyeCamp => "Eye Camp",
    DentalCamp => "Dental Camp",
    VaccinationDrive => "Vaccination Drive",
    BloodDonation => "Blood Donation",
});

str_enum!(CampStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(NotificationKind {
    HealthCamp => "health_camp",
    General => "general",
});
