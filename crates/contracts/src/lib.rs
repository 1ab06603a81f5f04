//! v1 cross-boundary contracts for the residency kernel, API, and persistence.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

mod month;

pub use month::{Month, MonthParseError};

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Lifecycle stage of a resident's tenancy.
///
/// `new` is a resident registered with every onboarding fee unpaid; the first
/// settled onboarding payment promotes them to `current`; departure retires
/// them to `old`. `old` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LivingStatus {
    New,
    Current,
    Old,
}

impl LivingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Current => "current",
            Self::Old => "old",
        }
    }

    /// Occupies a bed and counts toward occupancy totals.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Old)
    }

    pub fn can_transition(self, to: LivingStatus) -> bool {
        match self {
            Self::New => true,
            Self::Current => matches!(to, Self::Current | Self::Old),
            Self::Old => matches!(to, Self::Old),
        }
    }
}

impl fmt::Display for LivingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Due,
    Successful,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Successful => "successful",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Rent,
    DueCharge,
}

impl PaymentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::DueCharge => "due_charge",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hostel {
    pub hostel_id: String,
    pub name: String,
    pub location: Option<String>,
    pub total_beds: u32,
    pub total_tenants: u32,
    pub total_remaining_beds: u32,
    pub residents: Vec<String>,
}

impl Hostel {
    pub fn new(
        hostel_id: impl Into<String>,
        name: impl Into<String>,
        location: Option<String>,
    ) -> Self {
        Self {
            hostel_id: hostel_id.into(),
            name: name.into(),
            location,
            total_beds: 0,
            total_tenants: 0,
            total_remaining_beds: 0,
            residents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub room_id: String,
    pub hostel_id: String,
    pub room_number: String,
    pub price: i64,
    pub capacity: u32,
    pub remaining_capacity: u32,
    pub residents: Vec<String>,
}

impl Room {
    pub fn new(
        room_id: impl Into<String>,
        hostel_id: impl Into<String>,
        room_number: impl Into<String>,
        price: i64,
        capacity: u32,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            hostel_id: hostel_id.into(),
            room_number: room_number.into(),
            price,
            capacity,
            remaining_capacity: capacity,
            residents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resident {
    pub resident_id: String,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub address: Option<String>,
    pub parents_name: Option<String>,
    pub parents_mobile_no: Option<String>,
    pub gender: Option<String>,
    pub hostel_id: String,
    pub room_id: String,
    /// Denormalized snapshots taken at registration time.
    pub hostel_name: String,
    pub room_number: String,
    pub date_joined: NaiveDate,
    pub contract_end_date: NaiveDate,
    pub contract_term: u32,
    pub rent: i64,
    pub deposit: i64,
    pub maintenance_charge: i64,
    pub form_fee: i64,
    pub extra_day_payment_amount: i64,
    pub extra_days: u32,
    pub due_amount: i64,
    pub deposit_paid: bool,
    pub first_month_rent_paid: bool,
    pub maintenance_charge_paid: bool,
    pub form_fee_paid: bool,
    pub extra_day_payment_paid: bool,
    pub aadhaar_card_url: Option<String>,
    pub image_url: Option<String>,
    /// Rent payment ids in generation order; insertion order is chronological.
    pub payments: Vec<String>,
    pub due_charge_payment: Option<String>,
    pub living: LivingStatus,
}

impl Resident {
    pub fn from_request(
        resident_id: impl Into<String>,
        request: &RegisterResidentRequest,
        hostel_name: impl Into<String>,
        room_number: impl Into<String>,
        contract_end_date: NaiveDate,
        due_amount: i64,
        living: LivingStatus,
    ) -> Self {
        Self {
            resident_id: resident_id.into(),
            name: request.name.clone(),
            email: request.email.clone(),
            mobile_number: request.mobile_number.clone(),
            address: request.address.clone(),
            parents_name: request.parents_name.clone(),
            parents_mobile_no: request.parents_mobile_no.clone(),
            gender: request.gender.clone(),
            hostel_id: request.hostel_id.clone(),
            room_id: request.room_id.clone(),
            hostel_name: hostel_name.into(),
            room_number: room_number.into(),
            date_joined: request.date_joined,
            contract_end_date,
            contract_term: request.contract_term,
            rent: request.rent,
            deposit: request.deposit,
            maintenance_charge: request.maintenance_charge,
            form_fee: request.form_fee,
            extra_day_payment_amount: request.extra_day_payment_amount,
            extra_days: request.extra_days,
            due_amount,
            deposit_paid: request.deposit_paid,
            first_month_rent_paid: request.first_month_rent_paid,
            maintenance_charge_paid: request.maintenance_charge_paid,
            form_fee_paid: request.form_fee_paid,
            extra_day_payment_paid: request.extra_day_payment_paid,
            aadhaar_card_url: request.aadhaar_card_url.clone(),
            image_url: request.image_url.clone(),
            payments: Vec::new(),
            due_charge_payment: None,
            living,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub payment_id: String,
    pub resident_id: String,
    /// Name snapshot at generation time; not refreshed on resident updates.
    pub resident_name: String,
    pub amount: i64,
    pub rent: Option<i64>,
    pub month: Month,
    pub date: NaiveDate,
    pub status: PaymentStatus,
    pub kind: PaymentKind,
}

impl Payment {
    /// Deterministic id; uniqueness per (resident, month, kind) is structural.
    pub fn id_for(resident_id: &str, month: Month, kind: PaymentKind) -> String {
        format!("pay:{resident_id}:{month}:{}", kind.as_str())
    }
}

/// Result channel for payment backfill: which months were created, which
/// were already covered, and what the onboarding pass did.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackfillReport {
    pub generated: Vec<Month>,
    pub skipped: Vec<Month>,
    pub due_charge_created: bool,
    pub first_rent_marked_successful: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterResidentRequest {
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub address: Option<String>,
    pub parents_name: Option<String>,
    pub parents_mobile_no: Option<String>,
    pub gender: Option<String>,
    pub hostel_id: String,
    pub room_id: String,
    pub date_joined: NaiveDate,
    pub contract_term: u32,
    pub rent: i64,
    pub deposit: i64,
    pub maintenance_charge: i64,
    pub form_fee: i64,
    #[serde(default)]
    pub extra_day_payment_amount: i64,
    #[serde(default)]
    pub extra_days: u32,
    #[serde(default)]
    pub deposit_paid: bool,
    #[serde(default)]
    pub first_month_rent_paid: bool,
    #[serde(default)]
    pub maintenance_charge_paid: bool,
    #[serde(default)]
    pub form_fee_paid: bool,
    #[serde(default)]
    pub extra_day_payment_paid: bool,
    pub aadhaar_card_url: Option<String>,
    pub image_url: Option<String>,
}

impl RegisterResidentRequest {
    /// Sum of the onboarding fees whose paid flag is still false.
    pub fn due_amount(&self) -> i64 {
        let mut due = 0;
        if !self.deposit_paid {
            due += self.deposit;
        }
        if !self.maintenance_charge_paid {
            due += self.maintenance_charge;
        }
        if !self.form_fee_paid {
            due += self.form_fee;
        }
        if !self.extra_day_payment_paid {
            due += self.extra_day_payment_amount;
        }
        due
    }

    pub fn initial_living_status(&self) -> LivingStatus {
        if !self.deposit_paid
            && !self.first_month_rent_paid
            && !self.extra_day_payment_paid
            && !self.maintenance_charge_paid
        {
            LivingStatus::New
        } else {
            LivingStatus::Current
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateResidentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
    pub rent: Option<i64>,
    pub deposit: Option<i64>,
    pub maintenance_charge: Option<i64>,
    pub form_fee: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtendContractRequest {
    pub extended_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewHostelRequest {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRoomRequest {
    pub room_number: String,
    pub price: i64,
    pub capacity: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    CapacityExceeded,
    InvalidTransition,
    NotFound,
    PersistenceFailed,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> RegisterResidentRequest {
        RegisterResidentRequest {
            name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            mobile_number: "9876500001".to_string(),
            address: None,
            parents_name: None,
            parents_mobile_no: None,
            gender: None,
            hostel_id: "hst_01".to_string(),
            room_id: "room_01".to_string(),
            date_joined: NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date"),
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

    #[test]
    fn due_amount_sums_unpaid_fees_only() {
        let mut request = base_request();
        request.maintenance_charge_paid = true;
        assert_eq!(request.due_amount(), 6000 + 500);
    }

    #[test]
    fn fully_unpaid_registration_starts_as_new() {
        let request = base_request();
        assert_eq!(request.initial_living_status(), LivingStatus::New);

        let mut paid = base_request();
        paid.first_month_rent_paid = true;
        assert_eq!(paid.initial_living_status(), LivingStatus::Current);
    }

    #[test]
    fn living_status_never_leaves_old() {
        assert!(LivingStatus::New.can_transition(LivingStatus::Current));
        assert!(LivingStatus::Current.can_transition(LivingStatus::Old));
        assert!(!LivingStatus::Old.can_transition(LivingStatus::New));
        assert!(!LivingStatus::Old.can_transition(LivingStatus::Current));
    }

    #[test]
    fn payment_id_encodes_resident_month_and_kind() {
        let month = Month::new(2024, 2).expect("in range");
        assert_eq!(
            Payment::id_for("res_9", month, PaymentKind::Rent),
            "pay:res_9:2024-02:rent"
        );
        assert_eq!(
            Payment::id_for("res_9", month, PaymentKind::DueCharge),
            "pay:res_9:2024-02:due_charge"
        );
    }
}
