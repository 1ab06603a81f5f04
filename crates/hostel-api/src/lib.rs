//! Residency API facade: id minting, core mutations, best-effort SQLite
//! persistence, and the axum HTTP server.

mod config;
mod persistence;
mod server;

use std::path::Path;

use contracts::{
    BackfillReport, Hostel, NewHostelRequest, NewRoomRequest, Payment, RegisterResidentRequest,
    Resident, Room, UpdateResidentRequest,
};
use hostel_core::{DepartureOutcome, HostelDirectory, LifecycleError, RegistrationOutcome};
use tracing::{info, warn};
use uuid::Uuid;

pub use config::ServiceConfig;
pub use persistence::{DirectoryDelta, PersistenceError, SqliteDirectoryStore};
pub use server::{serve, ServerError};

#[derive(Debug, Default)]
pub struct ResidencyApi {
    directory: HostelDirectory,
    store: Option<SqliteDirectoryStore>,
    last_persistence_error: Option<String>,
}

impl ResidencyApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or creates) the SQLite store and rebuilds the directory from it.
    pub fn attach_sqlite_store(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let store = SqliteDirectoryStore::open(path)?;
        self.directory = store.load_directory()?;
        self.store = Some(store);
        self.last_persistence_error = None;
        Ok(())
    }

    pub fn directory(&self) -> &HostelDirectory {
        &self.directory
    }

    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_persistence_error.as_deref()
    }

    /// Best-effort persistence channel: a failed flush degrades the response
    /// with a warning instead of failing the mutation that triggered it.
    pub fn warnings(&self) -> Vec<String> {
        self.last_persistence_error
            .iter()
            .map(|err| format!("persistence degraded: {err}"))
            .collect()
    }

    pub fn create_hostel(&mut self, request: &NewHostelRequest) -> Result<Hostel, LifecycleError> {
        let hostel_id = mint_id("hst");
        self.directory.add_hostel(Hostel::new(
            hostel_id.clone(),
            request.name.clone(),
            request.location.clone(),
        ))?;
        info!(%hostel_id, name = %request.name, "hostel created");

        let delta = DirectoryDelta::default().with_hostel(&hostel_id);
        self.flush(delta);

        self.directory
            .hostel(&hostel_id)
            .cloned()
            .ok_or(LifecycleError::UnknownHostel(hostel_id))
    }

    pub fn create_room(
        &mut self,
        hostel_id: &str,
        request: &NewRoomRequest,
    ) -> Result<Room, LifecycleError> {
        let room_id = mint_id("room");
        self.directory.add_room(Room::new(
            room_id.clone(),
            hostel_id,
            request.room_number.clone(),
            request.price,
            request.capacity,
        ))?;
        info!(%room_id, %hostel_id, room_number = %request.room_number, "room created");

        let delta = DirectoryDelta::default()
            .with_room(&room_id)
            .with_hostel(hostel_id);
        self.flush(delta);

        self.directory
            .room(&room_id)
            .cloned()
            .ok_or(LifecycleError::UnknownRoom(room_id))
    }

    pub fn register_resident(
        &mut self,
        request: &RegisterResidentRequest,
    ) -> Result<RegistrationOutcome, LifecycleError> {
        let resident_id = mint_id("res");
        let outcome = self.directory.register(resident_id.clone(), request)?;
        info!(
            %resident_id,
            months = outcome.backfill.generated.len(),
            due_amount = outcome.resident.due_amount,
            "resident registered"
        );

        let delta = self
            .resident_delta(&resident_id)
            .with_room(&request.room_id)
            .with_hostel(&request.hostel_id);
        self.flush(delta);

        Ok(outcome)
    }

    pub fn depart_resident(
        &mut self,
        resident_id: &str,
    ) -> Result<DepartureOutcome, LifecycleError> {
        let outcome = self.directory.depart(resident_id)?;
        if let DepartureOutcome::Departed(resident) = &outcome {
            info!(%resident_id, "resident departed");
            let delta = DirectoryDelta::default()
                .with_resident(resident_id)
                .with_room(&resident.room_id)
                .with_hostel(&resident.hostel_id);
            self.flush(delta);
        }
        Ok(outcome)
    }

    pub fn extend_contract(
        &mut self,
        resident_id: &str,
        extended_months: u32,
    ) -> Result<(Resident, BackfillReport), LifecycleError> {
        let (resident, report) = self.directory.extend_contract(resident_id, extended_months)?;
        info!(
            %resident_id,
            extended_months,
            generated = report.generated.len(),
            "contract extended"
        );

        let delta = self.resident_delta(resident_id);
        self.flush(delta);

        Ok((resident, report))
    }

    pub fn update_resident(
        &mut self,
        resident_id: &str,
        update: &UpdateResidentRequest,
    ) -> Result<Resident, LifecycleError> {
        let resident = self.directory.update_resident(resident_id, update)?;
        info!(%resident_id, "resident updated");

        let delta = self.resident_delta(resident_id);
        self.flush(delta);

        Ok(resident)
    }

    pub fn mark_payment_successful(
        &mut self,
        payment_id: &str,
    ) -> Result<Payment, LifecycleError> {
        let payment = self.directory.mark_payment_successful(payment_id)?;
        info!(%payment_id, resident_id = %payment.resident_id, "payment settled");

        let delta = DirectoryDelta::default()
            .with_payment(payment_id)
            .with_resident(&payment.resident_id);
        self.flush(delta);

        Ok(payment)
    }

    /// Delta covering a resident and every payment hanging off them.
    fn resident_delta(&self, resident_id: &str) -> DirectoryDelta {
        let mut delta = DirectoryDelta::default().with_resident(resident_id);
        if let Some(resident) = self.directory.resident(resident_id) {
            for payment_id in resident
                .payments
                .iter()
                .chain(resident.due_charge_payment.iter())
            {
                delta = delta.with_payment(payment_id);
            }
        }
        delta
    }

    fn flush(&mut self, delta: DirectoryDelta) {
        let Some(store) = self.store.as_mut() else {
            return;
        };

        match store.persist_delta(&delta, &self.directory) {
            Ok(()) => self.last_persistence_error = None,
            Err(err) => {
                warn!(error = %err, "failed to persist directory delta");
                self.last_persistence_error = Some(err.to_string());
            }
        }
    }
}

fn mint_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use contracts::PaymentStatus;

    use super::*;

    fn temp_db_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();

        std::env::temp_dir().join(format!("hostel_directory_{name}_{nanos}.sqlite"))
    }

    fn cleanup(path: &std::path::Path) {
        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(path.with_extension("sqlite-wal"));
        let _ = std::fs::remove_file(path.with_extension("sqlite-shm"));
    }

    fn register_request(hostel_id: &str, room_id: &str) -> RegisterResidentRequest {
        RegisterResidentRequest {
            name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            mobile_number: "9876500001".to_string(),
            address: None,
            parents_name: None,
            parents_mobile_no: None,
            gender: None,
            hostel_id: hostel_id.to_string(),
            room_id: room_id.to_string(),
            date_joined: NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date"),
            contract_term: 2,
            rent: 6000,
            deposit: 6000,
            maintenance_charge: 1000,
            form_fee: 500,
            extra_day_payment_amount: 0,
            extra_days: 0,
            deposit_paid: false,
            first_month_rent_paid: false,
            maintenance_charge_paid: false,
            form_fee_paid: false,
            extra_day_payment_paid: false,
            aadhaar_card_url: None,
            image_url: None,
        }
    }

    #[test]
    fn registration_survives_a_restart() {
        let db_path = temp_db_path("restart");

        let resident_id = {
            let mut api = ResidencyApi::new();
            api.attach_sqlite_store(&db_path).expect("store attaches");

            let hostel = api
                .create_hostel(&NewHostelRequest {
                    name: "Lakeview".to_string(),
                    location: None,
                })
                .expect("hostel created");
            let room = api
                .create_room(
                    &hostel.hostel_id,
                    &NewRoomRequest {
                        room_number: "101".to_string(),
                        price: 6000,
                        capacity: 2,
                    },
                )
                .expect("room created");

            let outcome = api
                .register_resident(&register_request(&hostel.hostel_id, &room.room_id))
                .expect("resident registered");
            assert!(api.warnings().is_empty());
            outcome.resident.resident_id
        };

        let mut reopened = ResidencyApi::new();
        reopened
            .attach_sqlite_store(&db_path)
            .expect("store reopens");

        let resident = reopened
            .directory()
            .resident(&resident_id)
            .expect("resident reloaded");
        assert_eq!(resident.payments.len(), 3);
        assert!(resident.due_charge_payment.is_some());
        assert_eq!(
            reopened.directory().payments_of_resident(&resident_id).len(),
            4
        );

        cleanup(&db_path);
    }

    #[test]
    fn settled_payment_status_is_persisted() {
        let db_path = temp_db_path("settle");

        let payment_id = {
            let mut api = ResidencyApi::new();
            api.attach_sqlite_store(&db_path).expect("store attaches");

            let hostel = api
                .create_hostel(&NewHostelRequest {
                    name: "Lakeview".to_string(),
                    location: None,
                })
                .expect("hostel created");
            let room = api
                .create_room(
                    &hostel.hostel_id,
                    &NewRoomRequest {
                        room_number: "101".to_string(),
                        price: 6000,
                        capacity: 2,
                    },
                )
                .expect("room created");
            let outcome = api
                .register_resident(&register_request(&hostel.hostel_id, &room.room_id))
                .expect("resident registered");

            let payment_id = outcome.resident.payments[0].clone();
            api.mark_payment_successful(&payment_id)
                .expect("payment settles");
            payment_id
        };

        let mut reopened = ResidencyApi::new();
        reopened
            .attach_sqlite_store(&db_path)
            .expect("store reopens");
        let payment = reopened
            .directory()
            .payment(&payment_id)
            .expect("payment reloaded");
        assert_eq!(payment.status, PaymentStatus::Successful);

        cleanup(&db_path);
    }

    #[test]
    fn mutations_work_without_an_attached_store() {
        let mut api = ResidencyApi::new();
        let hostel = api
            .create_hostel(&NewHostelRequest {
                name: "Lakeview".to_string(),
                location: None,
            })
            .expect("hostel created");
        let room = api
            .create_room(
                &hostel.hostel_id,
                &NewRoomRequest {
                    room_number: "101".to_string(),
                    price: 6000,
                    capacity: 1,
                },
            )
            .expect("room created");
        api.register_resident(&register_request(&hostel.hostel_id, &room.room_id))
            .expect("resident registered");

        assert!(api.warnings().is_empty());
        assert_eq!(api.directory().residents.len(), 1);
    }
}
