use chrono::{Months, NaiveDate};
use contracts::{Hostel, Month, RegisterResidentRequest, Room};
use hostel_core::HostelDirectory;
use proptest::prelude::*;

fn request(email: &str, date_joined: NaiveDate, contract_term: u32) -> RegisterResidentRequest {
    RegisterResidentRequest {
        name: "Property Resident".to_string(),
        email: email.to_string(),
        mobile_number: "9876500003".to_string(),
        address: None,
        parents_name: None,
        parents_mobile_no: None,
        gender: None,
        hostel_id: "hst_01".to_string(),
        room_id: "room_01".to_string(),
        date_joined,
        contract_term,
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

proptest! {
    #[test]
    fn payment_count_matches_contract_months(
        year in 2020i32..2030,
        month in 1u32..=12,
        day in 1u32..=28,
        contract_term in 0u32..=24,
    ) {
        let date_joined = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
        let mut directory = seeded_directory(4);
        let outcome = directory
            .register("res_prop", &request("prop@example.com", date_joined, contract_term))
            .expect("registration succeeds");

        let contract_end = date_joined
            .checked_add_months(Months::new(contract_term))
            .expect("in range");
        let expected = Month::from_date(date_joined)
            .months_through(Month::from_date(contract_end));

        prop_assert_eq!(outcome.resident.payments.len() as u32, expected);
        prop_assert_eq!(outcome.resident.contract_term, expected);
    }

    #[test]
    fn regeneration_never_duplicates_months(
        year in 2020i32..2030,
        month in 1u32..=12,
        day in 1u32..=28,
        contract_term in 0u32..=24,
        reruns in 1usize..4,
    ) {
        let date_joined = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
        let mut directory = seeded_directory(4);
        let outcome = directory
            .register("res_prop", &request("prop@example.com", date_joined, contract_term))
            .expect("registration succeeds");
        let contract_end = outcome.resident.contract_end_date;
        let baseline = outcome.resident.payments.len();

        for _ in 0..reruns {
            let report = directory
                .generate_monthly_payments("res_prop", contract_end)
                .expect("rerun succeeds");
            prop_assert!(report.generated.is_empty());
        }

        prop_assert_eq!(
            directory.resident("res_prop").expect("resident").payments.len(),
            baseline
        );
        prop_assert!(!directory.generate_due_charge("res_prop").expect("rerun"));
    }

    #[test]
    fn occupancy_never_exceeds_capacity(
        capacity in 1u32..=4,
        attempts in 1usize..=8,
    ) {
        let mut directory = seeded_directory(capacity);
        let mut admitted = 0u32;

        for index in 0..attempts {
            let email = format!("prop{index}@example.com");
            let resident_id = format!("res_{index}");
            let joined = NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date");
            match directory.register(&resident_id, &request(&email, joined, 2)) {
                Ok(_) => admitted += 1,
                Err(err) => prop_assert!(
                    matches!(err, hostel_core::LifecycleError::RoomFull(_)
                        | hostel_core::LifecycleError::HostelFull(_))
                ),
            }
        }

        prop_assert_eq!(admitted, capacity.min(attempts as u32));
        let room = directory.room("room_01").expect("room");
        prop_assert_eq!(room.remaining_capacity, capacity - admitted);
        let hostel = directory.hostel("hst_01").expect("hostel");
        prop_assert_eq!(hostel.total_tenants, admitted);
        prop_assert_eq!(hostel.total_remaining_beds, capacity - admitted);
    }
}
