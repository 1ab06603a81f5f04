use std::fmt;
use std::path::Path;

use chrono::Utc;
use contracts::{Hostel, Payment, Resident, Room};
use hostel_core::HostelDirectory;
use rusqlite::{params, Connection};

/// Entity ids touched by one core mutation; persisted together in a single
/// transaction so a partial write cannot split a mutation across documents.
#[derive(Debug, Clone, Default)]
pub struct DirectoryDelta {
    pub hostels: Vec<String>,
    pub rooms: Vec<String>,
    pub residents: Vec<String>,
    pub payments: Vec<String>,
}

impl DirectoryDelta {
    pub fn with_hostel(mut self, hostel_id: &str) -> Self {
        self.hostels.push(hostel_id.to_string());
        self
    }

    pub fn with_room(mut self, room_id: &str) -> Self {
        self.rooms.push(room_id.to_string());
        self
    }

    pub fn with_resident(mut self, resident_id: &str) -> Self {
        self.residents.push(resident_id.to_string());
        self
    }

    pub fn with_payment(mut self, payment_id: &str) -> Self {
        self.payments.push(payment_id.to_string());
        self
    }
}

#[derive(Debug)]
pub enum PersistenceError {
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::Serde(err) => write!(f, "serde error: {err}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

#[derive(Debug)]
pub struct SqliteDirectoryStore {
    conn: Connection,
}

impl SqliteDirectoryStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.configure()?;
        store.migrate()?;
        Ok(store)
    }

    /// Upserts every entity named by the delta inside one transaction.
    /// Ids the directory no longer knows are skipped; entities are never
    /// deleted in this domain.
    pub fn persist_delta(
        &mut self,
        delta: &DirectoryDelta,
        directory: &HostelDirectory,
    ) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;
        let stamp = now_stamp();

        for hostel_id in &delta.hostels {
            if let Some(hostel) = directory.hostel(hostel_id) {
                upsert_hostel(&tx, hostel, &stamp)?;
            }
        }
        for room_id in &delta.rooms {
            if let Some(room) = directory.room(room_id) {
                upsert_room(&tx, room, &stamp)?;
            }
        }
        for resident_id in &delta.residents {
            if let Some(resident) = directory.resident(resident_id) {
                upsert_resident(&tx, resident, &stamp)?;
            }
        }
        for payment_id in &delta.payments {
            if let Some(payment) = directory.payment(payment_id) {
                upsert_payment(&tx, payment, &stamp)?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Rebuilds the full in-memory directory, used at startup.
    pub fn load_directory(&self) -> Result<HostelDirectory, PersistenceError> {
        let hostels = self.load_payloads::<Hostel>("hostels")?;
        let rooms = self.load_payloads::<Room>("rooms")?;
        let residents = self.load_payloads::<Resident>("residents")?;
        let payments = self.load_payloads::<Payment>("payments")?;

        Ok(HostelDirectory::from_entities(
            hostels, rooms, residents, payments,
        ))
    }

    fn load_payloads<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
    ) -> Result<Vec<T>, PersistenceError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT payload_json FROM {table}"))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut entities = Vec::new();
        for row in rows {
            let payload = row?;
            entities.push(serde_json::from_str::<T>(&payload)?);
        }

        Ok(entities)
    }

    fn configure(&mut self) -> Result<(), PersistenceError> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    fn migrate(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS hostels (
                hostel_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                total_beds INTEGER NOT NULL,
                total_remaining_beds INTEGER NOT NULL,
                payload_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS rooms (
                room_id TEXT PRIMARY KEY,
                hostel_id TEXT NOT NULL,
                room_number TEXT NOT NULL,
                remaining_capacity INTEGER NOT NULL,
                payload_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS residents (
                resident_id TEXT PRIMARY KEY,
                hostel_id TEXT NOT NULL,
                room_id TEXT NOT NULL,
                email TEXT NOT NULL,
                living TEXT NOT NULL,
                payload_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS payments (
                payment_id TEXT PRIMARY KEY,
                resident_id TEXT NOT NULL,
                month TEXT NOT NULL,
                kind TEXT NOT NULL,
                status TEXT NOT NULL,
                payload_json TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (resident_id, month, kind)
            );

            CREATE INDEX IF NOT EXISTS idx_rooms_hostel ON rooms(hostel_id);
            CREATE INDEX IF NOT EXISTS idx_residents_hostel ON residents(hostel_id);
            CREATE INDEX IF NOT EXISTS idx_residents_room ON residents(room_id);
            CREATE INDEX IF NOT EXISTS idx_payments_resident_month ON payments(resident_id, month);
            ",
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO schema_migrations(version, name, applied_at)
             VALUES(1, 'initial_v1', ?1)",
            params![now_stamp()],
        )?;

        Ok(())
    }
}

fn upsert_hostel(
    tx: &rusqlite::Transaction<'_>,
    hostel: &Hostel,
    stamp: &str,
) -> Result<(), PersistenceError> {
    let payload_json = serde_json::to_string(hostel)?;
    tx.execute(
        "INSERT INTO hostels (
            hostel_id,
            name,
            total_beds,
            total_remaining_beds,
            payload_json,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(hostel_id) DO UPDATE SET
            name = excluded.name,
            total_beds = excluded.total_beds,
            total_remaining_beds = excluded.total_remaining_beds,
            payload_json = excluded.payload_json,
            updated_at = excluded.updated_at",
        params![
            hostel.hostel_id.as_str(),
            hostel.name.as_str(),
            i64::from(hostel.total_beds),
            i64::from(hostel.total_remaining_beds),
            payload_json,
            stamp,
        ],
    )?;
    Ok(())
}

fn upsert_room(
    tx: &rusqlite::Transaction<'_>,
    room: &Room,
    stamp: &str,
) -> Result<(), PersistenceError> {
    let payload_json = serde_json::to_string(room)?;
    tx.execute(
        "INSERT INTO rooms (
            room_id,
            hostel_id,
            room_number,
            remaining_capacity,
            payload_json,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(room_id) DO UPDATE SET
            hostel_id = excluded.hostel_id,
            room_number = excluded.room_number,
            remaining_capacity = excluded.remaining_capacity,
            payload_json = excluded.payload_json,
            updated_at = excluded.updated_at",
        params![
            room.room_id.as_str(),
            room.hostel_id.as_str(),
            room.room_number.as_str(),
            i64::from(room.remaining_capacity),
            payload_json,
            stamp,
        ],
    )?;
    Ok(())
}

fn upsert_resident(
    tx: &rusqlite::Transaction<'_>,
    resident: &Resident,
    stamp: &str,
) -> Result<(), PersistenceError> {
    let payload_json = serde_json::to_string(resident)?;
    tx.execute(
        "INSERT INTO residents (
            resident_id,
            hostel_id,
            room_id,
            email,
            living,
            payload_json,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(resident_id) DO UPDATE SET
            hostel_id = excluded.hostel_id,
            room_id = excluded.room_id,
            email = excluded.email,
            living = excluded.living,
            payload_json = excluded.payload_json,
            updated_at = excluded.updated_at",
        params![
            resident.resident_id.as_str(),
            resident.hostel_id.as_str(),
            resident.room_id.as_str(),
            resident.email.as_str(),
            resident.living.as_str(),
            payload_json,
            stamp,
        ],
    )?;
    Ok(())
}

fn upsert_payment(
    tx: &rusqlite::Transaction<'_>,
    payment: &Payment,
    stamp: &str,
) -> Result<(), PersistenceError> {
    let payload_json = serde_json::to_string(payment)?;
    tx.execute(
        "INSERT INTO payments (
            payment_id,
            resident_id,
            month,
            kind,
            status,
            payload_json,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(payment_id) DO UPDATE SET
            status = excluded.status,
            payload_json = excluded.payload_json,
            updated_at = excluded.updated_at",
        params![
            payment.payment_id.as_str(),
            payment.resident_id.as_str(),
            payment.month.to_string(),
            payment.kind.as_str(),
            payment.status.as_str(),
            payload_json,
            stamp,
        ],
    )?;
    Ok(())
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339()
}
