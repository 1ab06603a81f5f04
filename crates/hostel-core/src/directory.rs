use std::collections::BTreeMap;

use contracts::{Hostel, Payment, Resident, Room};

use crate::lifecycle::LifecycleError;

/// Entity store the lifecycle, payment, and occupancy operations mutate.
/// Persistence and id minting live a layer up; everything here is
/// deterministic and in-memory.
#[derive(Debug, Clone, Default)]
pub struct HostelDirectory {
    pub hostels: BTreeMap<String, Hostel>,
    pub rooms: BTreeMap<String, Room>,
    pub residents: BTreeMap<String, Resident>,
    pub payments: BTreeMap<String, Payment>,
}

impl HostelDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted entity rows.
    pub fn from_entities(
        hostels: Vec<Hostel>,
        rooms: Vec<Room>,
        residents: Vec<Resident>,
        payments: Vec<Payment>,
    ) -> Self {
        Self {
            hostels: hostels
                .into_iter()
                .map(|hostel| (hostel.hostel_id.clone(), hostel))
                .collect(),
            rooms: rooms
                .into_iter()
                .map(|room| (room.room_id.clone(), room))
                .collect(),
            residents: residents
                .into_iter()
                .map(|resident| (resident.resident_id.clone(), resident))
                .collect(),
            payments: payments
                .into_iter()
                .map(|payment| (payment.payment_id.clone(), payment))
                .collect(),
        }
    }

    pub fn add_hostel(&mut self, hostel: Hostel) -> Result<(), LifecycleError> {
        if self.hostels.contains_key(&hostel.hostel_id) {
            return Err(LifecycleError::DuplicateId(hostel.hostel_id));
        }
        self.hostels.insert(hostel.hostel_id.clone(), hostel);
        Ok(())
    }

    /// Registers a room under its hostel and grows the hostel's bed total.
    pub fn add_room(&mut self, room: Room) -> Result<(), LifecycleError> {
        if self.rooms.contains_key(&room.room_id) {
            return Err(LifecycleError::DuplicateId(room.room_id));
        }

        let hostel_id = room.hostel_id.clone();
        let capacity = room.capacity;
        {
            let hostel = self
                .hostels
                .get_mut(&hostel_id)
                .ok_or_else(|| LifecycleError::UnknownHostel(hostel_id.clone()))?;
            hostel.total_beds += capacity;
        }
        self.rooms.insert(room.room_id.clone(), room);
        self.refresh_hostel_occupancy(&hostel_id)?;
        Ok(())
    }

    pub fn hostel(&self, hostel_id: &str) -> Option<&Hostel> {
        self.hostels.get(hostel_id)
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn resident(&self, resident_id: &str) -> Option<&Resident> {
        self.residents.get(resident_id)
    }

    pub fn payment(&self, payment_id: &str) -> Option<&Payment> {
        self.payments.get(payment_id)
    }

    pub fn residents_of_hostel(&self, hostel_id: &str) -> Vec<&Resident> {
        self.residents
            .values()
            .filter(|resident| resident.hostel_id == hostel_id)
            .collect()
    }

    pub fn rooms_of_hostel(&self, hostel_id: &str) -> Vec<&Room> {
        self.rooms
            .values()
            .filter(|room| room.hostel_id == hostel_id)
            .collect()
    }

    pub fn available_rooms(&self, hostel_id: &str) -> Vec<&Room> {
        self.rooms_of_hostel(hostel_id)
            .into_iter()
            .filter(|room| room.remaining_capacity > 0)
            .collect()
    }

    /// Payments of a resident in generation order, due charge last.
    pub fn payments_of_resident(&self, resident_id: &str) -> Vec<&Payment> {
        let Some(resident) = self.residents.get(resident_id) else {
            return Vec::new();
        };

        resident
            .payments
            .iter()
            .chain(resident.due_charge_payment.iter())
            .filter_map(|payment_id| self.payments.get(payment_id))
            .collect()
    }
}
