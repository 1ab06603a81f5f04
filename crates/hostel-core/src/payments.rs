//! Payment generation: one rent payment per contract month, plus the
//! one-time due charge for unpaid onboarding fees. Both generators are
//! idempotent per (resident, month, kind), so re-running after a crash or a
//! contract extension only appends what is missing.

use chrono::NaiveDate;
use contracts::{BackfillReport, LivingStatus, Month, Payment, PaymentKind, PaymentStatus};

use crate::directory::HostelDirectory;
use crate::lifecycle::LifecycleError;

impl HostelDirectory {
    /// Walks the calendar months from the join month through the month of
    /// `contract_end_date` inclusive and creates a due rent payment for each
    /// month that has none. Months already covered are reported, not touched.
    pub fn generate_monthly_payments(
        &mut self,
        resident_id: &str,
        contract_end_date: NaiveDate,
    ) -> Result<BackfillReport, LifecycleError> {
        let (date_joined, rent, resident_name) = {
            let resident = self
                .residents
                .get(resident_id)
                .ok_or_else(|| LifecycleError::UnknownResident(resident_id.to_string()))?;
            (resident.date_joined, resident.rent, resident.name.clone())
        };

        let first = Month::from_date(date_joined);
        let last = Month::from_date(contract_end_date);
        let mut report = BackfillReport::default();

        let mut current = first;
        while current <= last {
            let payment_id = Payment::id_for(resident_id, current, PaymentKind::Rent);
            if self.payments.contains_key(&payment_id) {
                report.skipped.push(current);
            } else {
                self.payments.insert(
                    payment_id.clone(),
                    Payment {
                        payment_id: payment_id.clone(),
                        resident_id: resident_id.to_string(),
                        resident_name: resident_name.clone(),
                        amount: rent,
                        rent: Some(rent),
                        month: current,
                        date: current.first_day(),
                        status: PaymentStatus::Due,
                        kind: PaymentKind::Rent,
                    },
                );
                if let Some(resident) = self.residents.get_mut(resident_id) {
                    resident.payments.push(payment_id);
                }
                report.generated.push(current);
            }

            // contract_term tracks the generated schedule length, not the
            // originally requested term
            if let Some(resident) = self.residents.get_mut(resident_id) {
                resident.contract_term = resident.payments.len() as u32;
            }

            current = current.succ();
        }

        Ok(report)
    }

    /// Creates the one-time due charge for the joining month when absent.
    /// Returns whether a new payment was created.
    pub fn generate_due_charge(&mut self, resident_id: &str) -> Result<bool, LifecycleError> {
        let (join_month, due_amount, resident_name) = {
            let resident = self
                .residents
                .get(resident_id)
                .ok_or_else(|| LifecycleError::UnknownResident(resident_id.to_string()))?;
            (
                Month::from_date(resident.date_joined),
                resident.due_amount,
                resident.name.clone(),
            )
        };

        let payment_id = Payment::id_for(resident_id, join_month, PaymentKind::DueCharge);
        if self.payments.contains_key(&payment_id) {
            return Ok(false);
        }

        self.payments.insert(
            payment_id.clone(),
            Payment {
                payment_id: payment_id.clone(),
                resident_id: resident_id.to_string(),
                resident_name,
                amount: due_amount,
                rent: None,
                month: join_month,
                date: join_month.first_day(),
                status: PaymentStatus::Due,
                kind: PaymentKind::DueCharge,
            },
        );
        if let Some(resident) = self.residents.get_mut(resident_id) {
            resident.due_charge_payment = Some(payment_id);
        }

        Ok(true)
    }

    /// In-place status settle; the first settled payment of a `new` resident
    /// promotes them to `current`.
    pub fn mark_payment_successful(&mut self, payment_id: &str) -> Result<Payment, LifecycleError> {
        let resident_id = {
            let payment = self
                .payments
                .get_mut(payment_id)
                .ok_or_else(|| LifecycleError::UnknownPayment(payment_id.to_string()))?;
            payment.status = PaymentStatus::Successful;
            payment.resident_id.clone()
        };

        if let Some(resident) = self.residents.get_mut(&resident_id) {
            if resident.living == LivingStatus::New {
                resident.living = LivingStatus::Current;
            }
        }

        self.payments
            .get(payment_id)
            .cloned()
            .ok_or_else(|| LifecycleError::UnknownPayment(payment_id.to_string()))
    }

    /// Rent changes rewrite the amount on the resident's rent payments;
    /// the due charge keeps its own amount.
    pub(crate) fn propagate_rent_change(&mut self, resident_id: &str, new_rent: i64) {
        for payment in self.payments.values_mut() {
            if payment.resident_id == resident_id && payment.kind == PaymentKind::Rent {
                payment.amount = new_rent;
                payment.rent = Some(new_rent);
            }
        }
    }
}
