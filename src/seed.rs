//! Demo data seeding.
//!
//! Runs at startup in demo mode, only when the accounts table is empty:
//! demo doctor/government accounts, a cohort of workers across Kerala
//! districts, 30 days of prescriptions, and two medicine requests.

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::db::repository::{
    count_accounts, insert_account, insert_medicine_request, insert_prescription, insert_worker,
};
use crate::db::DatabaseError;
use crate::models::enums::{MedicineStatus, Role};
use crate::models::{Account, MedicationItem, MedicineRequest, Prescription, Worker};

pub const DEMO_DOCTOR_EMAIL: &str = "doctor@hospital.kerala.gov.in";
pub const DEMO_DOCTOR_PASSWORD: &str = "doctor123";
pub const DEMO_GOVERNMENT_EMAIL: &str = "health.officer@kerala.gov.in";
pub const DEMO_GOVERNMENT_PASSWORD: &str = "gov123";

const DEMO_WORKERS: &[(&str, &str, i64, &str, &str, &str, &str, f64, f64)] = &[
    ("MHB-2024-001", "Ramesh Kumar", 32, "Male", "Bihar", "9876543210", "Ernakulam", 9.9312, 76.2673),
    ("MHB-2024-002", "Suresh Yadav", 28, "Male", "Uttar Pradesh", "9876543211", "Thiruvananthapuram", 8.5241, 76.9366),
    ("MHB-2024-003", "Priya Devi", 25, "Female", "Jharkhand", "9876543212", "Kozhikode", 11.2588, 75.7804),
    ("MHB-2024-004", "Mohan Singh", 35, "Male", "Bihar", "9876543213", "Thrissur", 10.5276, 76.2144),
    ("MHB-2024-005", "Lakshmi Kumari", 29, "Female", "West Bengal", "9876543214", "Kollam", 8.8932, 76.6141),
    ("MHB-2024-006", "Anil Sharma", 40, "Male", "Rajasthan", "9876543215", "Palakkad", 10.7867, 76.6548),
    ("MHB-2024-007", "Sunita Das", 27, "Female", "Odisha", "9876543216", "Malappuram", 11.0510, 76.0711),
    ("MHB-2024-008", "Vijay Patel", 33, "Male", "Gujarat", "9876543217", "Kannur", 11.8745, 75.3704),
];

const DEMO_DIAGNOSES: &[(&str, &str, &str, &str)] = &[
    ("Dengue Fever", "Paracetamol", "500mg", "TDS"),
    ("Malaria", "Artemether", "80mg", "BD"),
    ("Typhoid", "Ciprofloxacin", "500mg", "BD"),
    ("Respiratory Infection", "Amoxicillin", "500mg", "TDS"),
    ("Gastroenteritis", "ORS", "1 sachet", "QID"),
    ("Skin Infection", "Clotrimazole", "Apply twice", "BD"),
];

/// Seed demo data unless the accounts table already has rows.
pub fn seed_demo_data(conn: &Connection) -> Result<(), DatabaseError> {
    if count_accounts(conn)? > 0 {
        tracing::info!("Demo data already exists");
        return Ok(());
    }

    tracing::info!("Seeding demo data");

    let doctor_hash = hash_password(DEMO_DOCTOR_PASSWORD);
    let government_hash = hash_password(DEMO_GOVERNMENT_PASSWORD);

    let doctors = [
        Account {
            id: Uuid::new_v4(),
            email: DEMO_DOCTOR_EMAIL.into(),
            password_hash: doctor_hash.clone(),
            name: "Dr. Arun Kumar".into(),
            role: Role::Doctor,
            hospital_name: Some("General Hospital Ernakulam".into()),
            hospital_id: Some("GHE001".into()),
            created_at: Utc::now(),
        },
        Account {
            id: Uuid::new_v4(),
            email: "doctor2@hospital.kerala.gov.in".into(),
            password_hash: doctor_hash,
            name: "Dr. Priya Menon".into(),
            role: Role::Doctor,
            hospital_name: Some("District Hospital Thiruvananthapuram".into()),
            hospital_id: Some("DHT001".into()),
            created_at: Utc::now(),
        },
    ];
    let government = Account {
        id: Uuid::new_v4(),
        email: DEMO_GOVERNMENT_EMAIL.into(),
        password_hash: government_hash,
        name: "Health Commissioner".into(),
        role: Role::Government,
        hospital_name: None,
        hospital_id: None,
        created_at: Utc::now(),
    };
    for account in doctors.iter().chain([&government]) {
        insert_account(conn, account)?;
    }

    let mut workers = Vec::new();
    for (unique_id, name, age, gender, origin, phone, district, lat, lon) in DEMO_WORKERS {
        let worker = Worker {
            id: Uuid::new_v4(),
            unique_id: (*unique_id).into(),
            name: (*name).into(),
            age: Some(*age),
            gender: Some((*gender).into()),
            origin_state: Some((*origin).into()),
            phone: Some((*phone).into()),
            current_district: Some((*district).into()),
            latitude: Some(*lat),
            longitude: Some(*lon),
            created_at: Utc::now(),
        };
        insert_worker(conn, &worker)?;
        workers.push(worker);
    }

    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let doctor = &doctors[rng.gen_range(0..doctors.len())];
        let worker = workers.choose(&mut rng).expect("workers seeded");
        let (diagnosis, med, dosage, frequency) =
            DEMO_DIAGNOSES[rng.gen_range(0..DEMO_DIAGNOSES.len())];
        let days_ago = rng.gen_range(0..30);

        insert_prescription(
            conn,
            &Prescription {
                id: Uuid::new_v4(),
                worker_id: Some(worker.id),
                doctor_id: doctor.id,
                diagnosis: diagnosis.into(),
                medications: vec![MedicationItem {
                    name: med.into(),
                    dosage: Some(dosage.into()),
                    frequency: Some(frequency.into()),
                    quantity: None,
                }],
                voice_note_url: None,
                hospital_name: Some("Demo Hospital".into()),
                district: worker.current_district.clone(),
                latitude: worker.latitude,
                longitude: worker.longitude,
                created_at: Utc::now() - Duration::days(days_ago),
            },
        )?;
    }

    let demo_requests = [
        (
            MedicineStatus::Pending,
            vec![
                MedicationItem {
                    name: "Paracetamol".into(),
                    dosage: None,
                    frequency: None,
                    quantity: Some(500),
                },
                MedicationItem {
                    name: "ORS Sachets".into(),
                    dosage: None,
                    frequency: None,
                    quantity: Some(1000),
                },
            ],
        ),
        (
            MedicineStatus::Approved,
            vec![MedicationItem {
                name: "Artemether".into(),
                dosage: None,
                frequency: None,
                quantity: Some(200),
            }],
        ),
    ];
    for (status, medicines) in demo_requests {
        insert_medicine_request(
            conn,
            &MedicineRequest {
                id: Uuid::new_v4(),
                doctor_id: doctors[0].id,
                hospital_name: Some("General Hospital Ernakulam".into()),
                district: Some("Ernakulam".into()),
                medicines,
                status,
                created_at: Utc::now(),
            },
        )?;
    }

    tracing::info!("Demo data seeded successfully");
    Ok(())
}
