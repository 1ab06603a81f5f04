//! Resident lifecycle: registration, departure, contract extension, and the
//! explicit living-status machine.

use std::fmt;

use chrono::Months;
use contracts::{
    BackfillReport, LivingStatus, Month, RegisterResidentRequest, Resident, UpdateResidentRequest,
};

use crate::directory::HostelDirectory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    MissingField(&'static str),
    DuplicateId(String),
    DuplicateEmail(String),
    UnknownHostel(String),
    UnknownRoom(String),
    UnknownResident(String),
    UnknownPayment(String),
    RoomNotInHostel {
        room_id: String,
        hostel_id: String,
    },
    RoomFull(String),
    HostelFull(String),
    InvalidTransition {
        from: LivingStatus,
        to: LivingStatus,
    },
    ContractOutOfRange(String),
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::DuplicateId(id) => write!(f, "id already exists: {id}"),
            Self::DuplicateEmail(email) => write!(f, "email already registered: {email}"),
            Self::UnknownHostel(id) => write!(f, "unknown hostel: {id}"),
            Self::UnknownRoom(id) => write!(f, "unknown room: {id}"),
            Self::UnknownResident(id) => write!(f, "unknown resident: {id}"),
            Self::UnknownPayment(id) => write!(f, "unknown payment: {id}"),
            Self::RoomNotInHostel { room_id, hostel_id } => {
                write!(f, "room {room_id} does not belong to hostel {hostel_id}")
            }
            Self::RoomFull(room_number) => {
                write!(f, "room {room_number} has no remaining capacity")
            }
            Self::HostelFull(name) => write!(f, "hostel {name} has no remaining beds"),
            Self::InvalidTransition { from, to } => {
                write!(f, "living status cannot change from {from} to {to}")
            }
            Self::ContractOutOfRange(detail) => {
                write!(f, "contract end date out of range: {detail}")
            }
        }
    }
}

impl std::error::Error for LifecycleError {}

#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub resident: Resident,
    pub backfill: BackfillReport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DepartureOutcome {
    Departed(Resident),
    AlreadyDeparted,
}

impl HostelDirectory {
    /// Registers a resident: validates the request against the directory,
    /// joins the room and hostel, refreshes occupancy, and generates the
    /// payment schedule plus the due charge. A rejected registration leaves
    /// the directory untouched.
    pub fn register(
        &mut self,
        resident_id: impl Into<String>,
        request: &RegisterResidentRequest,
    ) -> Result<RegistrationOutcome, LifecycleError> {
        let resident_id = resident_id.into();

        if request.name.trim().is_empty() {
            return Err(LifecycleError::MissingField("name"));
        }
        if request.email.trim().is_empty() {
            return Err(LifecycleError::MissingField("email"));
        }
        if request.hostel_id.trim().is_empty() {
            return Err(LifecycleError::MissingField("hostel_id"));
        }
        if request.room_id.trim().is_empty() {
            return Err(LifecycleError::MissingField("room_id"));
        }
        if self.residents.contains_key(&resident_id) {
            return Err(LifecycleError::DuplicateId(resident_id));
        }
        if self
            .residents
            .values()
            .any(|resident| resident.email == request.email)
        {
            return Err(LifecycleError::DuplicateEmail(request.email.clone()));
        }

        let (room_number, room_capacity) = {
            let room = self
                .rooms
                .get(&request.room_id)
                .ok_or_else(|| LifecycleError::UnknownRoom(request.room_id.clone()))?;
            if room.hostel_id != request.hostel_id {
                return Err(LifecycleError::RoomNotInHostel {
                    room_id: request.room_id.clone(),
                    hostel_id: request.hostel_id.clone(),
                });
            }
            (room.room_number.clone(), room.capacity)
        };
        let (hostel_name, total_beds) = {
            let hostel = self
                .hostels
                .get(&request.hostel_id)
                .ok_or_else(|| LifecycleError::UnknownHostel(request.hostel_id.clone()))?;
            (hostel.name.clone(), hostel.total_beds)
        };

        // Capacity guards run against derived counts before any mutation.
        if self.active_resident_count_in_room(&request.room_id) >= room_capacity {
            return Err(LifecycleError::RoomFull(room_number));
        }
        if self.active_resident_count_in_hostel(&request.hostel_id) >= total_beds {
            return Err(LifecycleError::HostelFull(hostel_name));
        }

        let contract_end_date = request
            .date_joined
            .checked_add_months(Months::new(request.contract_term))
            .ok_or_else(|| {
                LifecycleError::ContractOutOfRange(format!(
                    "date_joined={} contract_term={}",
                    request.date_joined, request.contract_term
                ))
            })?;

        let resident = Resident::from_request(
            resident_id.clone(),
            request,
            hostel_name,
            room_number,
            contract_end_date,
            request.due_amount(),
            request.initial_living_status(),
        );
        self.residents.insert(resident_id.clone(), resident);

        if let Some(room) = self.rooms.get_mut(&request.room_id) {
            room.residents.push(resident_id.clone());
        }
        if let Some(hostel) = self.hostels.get_mut(&request.hostel_id) {
            hostel.residents.push(resident_id.clone());
        }
        self.recompute_room_occupancy(&request.room_id)?;
        self.refresh_hostel_occupancy(&request.hostel_id)?;

        let mut backfill = self.generate_monthly_payments(&resident_id, contract_end_date)?;
        backfill.due_charge_created = self.generate_due_charge(&resident_id)?;

        if request.first_month_rent_paid {
            let first_payment = self
                .residents
                .get(&resident_id)
                .and_then(|resident| resident.payments.first().cloned());
            if let Some(payment_id) = first_payment {
                self.mark_payment_successful(&payment_id)?;
                backfill.first_rent_marked_successful = true;
            }
        }

        let resident = self
            .residents
            .get(&resident_id)
            .cloned()
            .ok_or_else(|| LifecycleError::UnknownResident(resident_id))?;

        Ok(RegistrationOutcome { resident, backfill })
    }

    /// Explicit transition function for the living-status machine.
    pub fn transition_living(
        &mut self,
        resident_id: &str,
        to: LivingStatus,
    ) -> Result<(), LifecycleError> {
        let resident = self
            .residents
            .get_mut(resident_id)
            .ok_or_else(|| LifecycleError::UnknownResident(resident_id.to_string()))?;
        let from = resident.living;
        if !from.can_transition(to) {
            return Err(LifecycleError::InvalidTransition { from, to });
        }
        resident.living = to;
        Ok(())
    }

    /// Retires a resident. Departing an already-old resident is a no-op
    /// success; room and hostel counters stay as they are.
    pub fn depart(&mut self, resident_id: &str) -> Result<DepartureOutcome, LifecycleError> {
        let (room_id, hostel_id) = {
            let resident = self
                .residents
                .get(resident_id)
                .ok_or_else(|| LifecycleError::UnknownResident(resident_id.to_string()))?;
            if resident.living == LivingStatus::Old {
                return Ok(DepartureOutcome::AlreadyDeparted);
            }
            (resident.room_id.clone(), resident.hostel_id.clone())
        };

        self.transition_living(resident_id, LivingStatus::Old)?;

        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.residents.retain(|id| id != resident_id);
        }
        if let Some(hostel) = self.hostels.get_mut(&hostel_id) {
            hostel.residents.retain(|id| id != resident_id);
        }
        self.recompute_room_occupancy(&room_id)?;
        self.refresh_hostel_occupancy(&hostel_id)?;

        let resident = self
            .residents
            .get(resident_id)
            .cloned()
            .ok_or_else(|| LifecycleError::UnknownResident(resident_id.to_string()))?;
        Ok(DepartureOutcome::Departed(resident))
    }

    /// Pushes the contract end out by `extended_months` from the recorded
    /// end date and backfills the newly covered months.
    pub fn extend_contract(
        &mut self,
        resident_id: &str,
        extended_months: u32,
    ) -> Result<(Resident, BackfillReport), LifecycleError> {
        let new_end = {
            let resident = self
                .residents
                .get(resident_id)
                .ok_or_else(|| LifecycleError::UnknownResident(resident_id.to_string()))?;
            resident
                .contract_end_date
                .checked_add_months(Months::new(extended_months))
                .ok_or_else(|| {
                    LifecycleError::ContractOutOfRange(format!(
                        "contract_end_date={} extended_months={extended_months}",
                        resident.contract_end_date
                    ))
                })?
        };

        if let Some(resident) = self.residents.get_mut(resident_id) {
            resident.contract_end_date = new_end;
        }
        let report = self.generate_monthly_payments(resident_id, new_end)?;

        let resident = self
            .residents
            .get(resident_id)
            .cloned()
            .ok_or_else(|| LifecycleError::UnknownResident(resident_id.to_string()))?;
        Ok((resident, report))
    }

    /// Applies a partial update; a rent change propagates to the resident's
    /// rent payments.
    pub fn update_resident(
        &mut self,
        resident_id: &str,
        update: &UpdateResidentRequest,
    ) -> Result<Resident, LifecycleError> {
        let rent_change = {
            let resident = self
                .residents
                .get_mut(resident_id)
                .ok_or_else(|| LifecycleError::UnknownResident(resident_id.to_string()))?;

            if let Some(name) = &update.name {
                resident.name = name.clone();
            }
            if let Some(email) = &update.email {
                resident.email = email.clone();
            }
            if let Some(mobile_number) = &update.mobile_number {
                resident.mobile_number = mobile_number.clone();
            }
            if let Some(address) = &update.address {
                resident.address = Some(address.clone());
            }
            if let Some(deposit) = update.deposit {
                resident.deposit = deposit;
            }
            if let Some(maintenance_charge) = update.maintenance_charge {
                resident.maintenance_charge = maintenance_charge;
            }
            if let Some(form_fee) = update.form_fee {
                resident.form_fee = form_fee;
            }

            match update.rent {
                Some(rent) if rent != resident.rent => {
                    resident.rent = rent;
                    Some(rent)
                }
                _ => None,
            }
        };

        if let Some(new_rent) = rent_change {
            self.propagate_rent_change(resident_id, new_rent);
        }

        self.residents
            .get(resident_id)
            .cloned()
            .ok_or_else(|| LifecycleError::UnknownResident(resident_id.to_string()))
    }

    /// Current residents whose last generated payment month precedes
    /// `current_month`; residents with no payments are excluded.
    pub fn contract_ended_residents(&self, current_month: Month) -> Vec<&Resident> {
        self.residents
            .values()
            .filter(|resident| resident.living == LivingStatus::Current)
            .filter(|resident| {
                resident
                    .payments
                    .last()
                    .and_then(|payment_id| self.payments.get(payment_id))
                    .map(|payment| payment.month < current_month)
                    .unwrap_or(false)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use contracts::{Hostel, Room};

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn base_request(email: &str) -> RegisterResidentRequest {
        RegisterResidentRequest {
            name: "Asha Verma".to_string(),
            email: email.to_string(),
            mobile_number: "9876500001".to_string(),
            address: None,
            parents_name: None,
            parents_mobile_no: None,
            gender: None,
            hostel_id: "hst_01".to_string(),
            room_id: "room_01".to_string(),
            date_joined: date(2024, 1, 15),
            contract_term: 3,
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

    fn seeded_directory(room_capacity: u32) -> HostelDirectory {
        let mut directory = HostelDirectory::new();
        directory
            .add_hostel(Hostel::new("hst_01", "Lakeview", None))
            .expect("hostel inserts");
        directory
            .add_room(Room::new("room_01", "hst_01", "101", 6000, room_capacity))
            .expect("room inserts");
        directory
    }

    #[test]
    fn registration_rejects_missing_name() {
        let mut directory = seeded_directory(2);
        let mut request = base_request("asha@example.com");
        request.name = "  ".to_string();
        let err = directory
            .register("res_01", &request)
            .expect_err("should fail");
        assert_eq!(err, LifecycleError::MissingField("name"));
    }

    #[test]
    fn registration_rejects_unknown_room() {
        let mut directory = seeded_directory(2);
        let mut request = base_request("asha@example.com");
        request.room_id = "room_missing".to_string();
        let err = directory
            .register("res_01", &request)
            .expect_err("should fail");
        assert!(matches!(err, LifecycleError::UnknownRoom(_)));
    }

    #[test]
    fn full_room_rejection_leaves_no_state_behind() {
        let mut directory = seeded_directory(1);
        directory
            .register("res_01", &base_request("first@example.com"))
            .expect("first registration");

        let err = directory
            .register("res_02", &base_request("second@example.com"))
            .expect_err("room is full");
        assert!(matches!(err, LifecycleError::RoomFull(_)));

        assert!(directory.resident("res_02").is_none());
        assert_eq!(
            directory.room("room_01").expect("room").remaining_capacity,
            0
        );
        let hostel = directory.hostel("hst_01").expect("hostel");
        assert_eq!(hostel.total_tenants, 1);
        assert!(!hostel.residents.iter().any(|id| id == "res_02"));
    }

    #[test]
    fn registration_generates_schedule_and_due_charge() {
        let mut directory = seeded_directory(2);
        let outcome = directory
            .register("res_01", &base_request("asha@example.com"))
            .expect("registration succeeds");

        // 2024-01-15 + 3 months of contract: months 01 through 04 inclusive.
        assert_eq!(outcome.resident.contract_end_date, date(2024, 4, 15));
        assert_eq!(outcome.backfill.generated.len(), 4);
        assert!(outcome.backfill.due_charge_created);
        assert!(!outcome.backfill.first_rent_marked_successful);
        assert_eq!(outcome.resident.due_amount, 7500);
        assert_eq!(outcome.resident.living, LivingStatus::New);
    }

    #[test]
    fn paid_first_month_settles_the_first_payment() {
        let mut directory = seeded_directory(2);
        let mut request = base_request("asha@example.com");
        request.first_month_rent_paid = true;
        let outcome = directory
            .register("res_01", &request)
            .expect("registration succeeds");

        assert!(outcome.backfill.first_rent_marked_successful);
        assert_eq!(outcome.resident.living, LivingStatus::Current);

        let first_payment = outcome
            .resident
            .payments
            .first()
            .and_then(|id| directory.payment(id))
            .expect("first payment present");
        assert_eq!(first_payment.status, contracts::PaymentStatus::Successful);
    }

    #[test]
    fn departure_is_idempotent_and_frees_the_bed() {
        let mut directory = seeded_directory(1);
        directory
            .register("res_01", &base_request("asha@example.com"))
            .expect("registration succeeds");
        assert_eq!(
            directory.room("room_01").expect("room").remaining_capacity,
            0
        );

        let outcome = directory.depart("res_01").expect("departure succeeds");
        assert!(matches!(outcome, DepartureOutcome::Departed(_)));
        assert_eq!(
            directory.room("room_01").expect("room").remaining_capacity,
            1
        );
        let hostel = directory.hostel("hst_01").expect("hostel");
        assert_eq!(hostel.total_tenants, 0);
        assert_eq!(hostel.total_remaining_beds, 1);

        let repeat = directory.depart("res_01").expect("repeat departure");
        assert_eq!(repeat, DepartureOutcome::AlreadyDeparted);
        assert_eq!(
            directory.room("room_01").expect("room").remaining_capacity,
            1
        );
    }

    #[test]
    fn old_residents_cannot_come_back() {
        let mut directory = seeded_directory(2);
        directory
            .register("res_01", &base_request("asha@example.com"))
            .expect("registration succeeds");
        directory.depart("res_01").expect("departure succeeds");

        let err = directory
            .transition_living("res_01", LivingStatus::Current)
            .expect_err("should fail");
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[test]
    fn extension_anchors_on_the_recorded_end_date() {
        let mut directory = seeded_directory(2);
        let outcome = directory
            .register("res_01", &base_request("asha@example.com"))
            .expect("registration succeeds");
        let payments_before = outcome.resident.payments.clone();

        let (resident, report) = directory
            .extend_contract("res_01", 2)
            .expect("extension succeeds");

        assert_eq!(resident.contract_end_date, date(2024, 6, 15));
        let months: Vec<String> = report
            .generated
            .iter()
            .map(|month| month.to_string())
            .collect();
        assert_eq!(months, ["2024-05", "2024-06"]);
        assert_eq!(&resident.payments[..payments_before.len()], &payments_before[..]);
    }

    #[test]
    fn contract_ended_query_flags_lapsed_current_residents() {
        let mut directory = seeded_directory(2);
        let mut request = base_request("asha@example.com");
        request.first_month_rent_paid = true;
        directory
            .register("res_01", &request)
            .expect("registration succeeds");

        let after_contract = Month::new(2024, 6).expect("in range");
        let lapsed = directory.contract_ended_residents(after_contract);
        assert_eq!(lapsed.len(), 1);

        let during_contract = Month::new(2024, 3).expect("in range");
        assert!(directory.contract_ended_residents(during_contract).is_empty());
    }
}
