//! Derived occupancy counters. Counts are always recomputed from the active
//! resident population rather than incremented in place, so a skipped update
//! path cannot leave the stored counters drifting from reality.

use crate::directory::HostelDirectory;
use crate::lifecycle::LifecycleError;

impl HostelDirectory {
    pub(crate) fn active_resident_count_in_room(&self, room_id: &str) -> u32 {
        self.residents
            .values()
            .filter(|resident| resident.room_id == room_id && resident.living.is_active())
            .count() as u32
    }

    pub(crate) fn active_resident_count_in_hostel(&self, hostel_id: &str) -> u32 {
        self.residents
            .values()
            .filter(|resident| resident.hostel_id == hostel_id && resident.living.is_active())
            .count() as u32
    }

    /// Recomputes `remaining_capacity = capacity - active residents` and
    /// returns the new value.
    pub fn recompute_room_occupancy(&mut self, room_id: &str) -> Result<u32, LifecycleError> {
        let active = self.active_resident_count_in_room(room_id);
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| LifecycleError::UnknownRoom(room_id.to_string()))?;
        room.remaining_capacity = room.capacity.saturating_sub(active);
        Ok(room.remaining_capacity)
    }

    /// Recounts the hostel's active residents and returns the new total.
    pub fn recompute_total_tenants(&mut self, hostel_id: &str) -> Result<u32, LifecycleError> {
        let active = self.active_resident_count_in_hostel(hostel_id);
        let hostel = self
            .hostels
            .get_mut(hostel_id)
            .ok_or_else(|| LifecycleError::UnknownHostel(hostel_id.to_string()))?;
        hostel.total_tenants = active;
        Ok(hostel.total_tenants)
    }

    /// Sets `total_remaining_beds = total_beds - total_tenants`. Must run
    /// after `recompute_total_tenants`; remaining beds derive from the
    /// tenant count.
    pub fn recompute_total_remaining_beds(
        &mut self,
        hostel_id: &str,
    ) -> Result<u32, LifecycleError> {
        let hostel = self
            .hostels
            .get_mut(hostel_id)
            .ok_or_else(|| LifecycleError::UnknownHostel(hostel_id.to_string()))?;
        hostel.total_remaining_beds = hostel.total_beds.saturating_sub(hostel.total_tenants);
        Ok(hostel.total_remaining_beds)
    }

    /// Tenants first, then remaining beds.
    pub fn refresh_hostel_occupancy(&mut self, hostel_id: &str) -> Result<(), LifecycleError> {
        self.recompute_total_tenants(hostel_id)?;
        self.recompute_total_remaining_beds(hostel_id)?;
        Ok(())
    }
}
