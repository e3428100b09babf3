use crate::core::amount::{checked_add, checked_sub, Amount};
use crate::core::hash::{keccak256, parse_h256, ParseHashError};
use crate::core::pair::{pack, PackedPair, PairKey};
use crate::core::party::PartyId;
use crate::ledger::error::LedgerError;
use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use primitive_types::H256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// First calendar day a slot may address.
pub const MIN_SLOT_DATE: (u16, u8, u8) = (1970, 1, 1);
/// Last calendar day a slot may address.
pub const MAX_SLOT_DATE: (u16, u8, u8) = (2345, 12, 31);

/// Address of a calendar-day payment bucket.
///
/// Keccak-256 over the packed date `year (u16 BE) ‖ month (u8) ‖ day (u8)`.
/// Every field has a fixed width, so equal dates always hash equal and
/// distinct dates never share an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotPosition(H256);

impl SlotPosition {
    /// Position for a calendar day within `[1970-01-01, 2345-12-31]`.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, LedgerError> {
        let invalid = LedgerError::InvalidDate { year, month, day };
        if (year, month, day) < MIN_SLOT_DATE || (year, month, day) > MAX_SLOT_DATE {
            return Err(invalid);
        }
        if NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day)).is_none() {
            return Err(invalid);
        }
        let [year_hi, year_lo] = year.to_be_bytes();
        Ok(Self(keccak256(&[year_hi, year_lo, month, day])))
    }

    pub fn from_date(date: NaiveDate) -> Result<Self, LedgerError> {
        let year = u16::try_from(date.year()).map_err(|_| LedgerError::InvalidDate {
            year: 0,
            month: date.month() as u8,
            day: date.day() as u8,
        })?;
        Self::new(year, date.month() as u8, date.day() as u8)
    }

    pub fn as_h256(&self) -> H256 {
        self.0
    }
}

impl fmt::Display for SlotPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_bytes()))
    }
}

impl FromStr for SlotPosition {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_h256(s).map(Self)
    }
}

/// Gross and net payments due between one pair on one day, canonical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub total_payment0: Amount,
    pub total_payment1: Amount,
    /// Magnitude of `total_payment0 - total_payment1`.
    pub net_payment: Amount,
    /// True when canonical party 1 owes the net payment.
    pub flipped: bool,
    /// Cumulative amount confirmed through `verify_payment`.
    pub paid_amount: Amount,
    /// Gross totals are equal.
    pub is_settled: bool,
    /// Confirmed payments cover the whole net payment.
    pub confirmed: bool,
}

impl TimeSlot {
    fn recompute_net(&mut self) {
        if self.total_payment0 >= self.total_payment1 {
            self.net_payment = self.total_payment0 - self.total_payment1;
            self.flipped = false;
        } else {
            self.net_payment = self.total_payment1 - self.total_payment0;
            self.flipped = true;
        }
        self.is_settled = self.net_payment.is_zero();
    }

    /// Confirmed payments must still fit the net payment and the same payer.
    fn check_paid(&self, payer_flipped: bool) -> Result<(), LedgerError> {
        if self.paid_amount.is_zero() {
            return Ok(());
        }
        if self.paid_amount > self.net_payment || self.flipped != payer_flipped {
            return Err(LedgerError::PaymentOverflow {
                verified: self.paid_amount,
                amount: Amount::zero(),
                net_payment: self.net_payment,
            });
        }
        Ok(())
    }
}

/// A time slot as seen from the caller's argument order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlotView {
    pub total_payment0: Amount,
    pub total_payment1: Amount,
    pub net_payment: Amount,
    /// The party owing `net_payment`, `None` when the totals are equal.
    pub net_payer: Option<PartyId>,
    pub paid_amount: Amount,
    pub is_settled: bool,
    pub confirmed: bool,
}

/// Record of one externally proven payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub verifier: PartyId,
    pub amount: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotKey {
    pair: PairKey,
    position: SlotPosition,
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pair, self.position)
    }
}

impl FromStr for SlotKey {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pair, position) = s.split_once(':').unwrap_or((s, ""));
        Ok(Self {
            pair: pair.parse()?,
            position: position.parse()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ConfirmationKey {
    slot: SlotKey,
    proof: H256,
}

impl fmt::Display for ConfirmationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:0x{}", self.slot, hex::encode(self.proof.as_bytes()))
    }
}

impl FromStr for ConfirmationKey {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (slot, proof) = s.rsplit_once(':').unwrap_or((s, ""));
        Ok(Self {
            slot: slot.parse()?,
            proof: parse_h256(proof)?,
        })
    }
}

/// Per-pair, per-day gross payment ledger with payment confirmations.
///
/// Once confirmed payments reach a slot's net payment the slot is closed:
/// further additions, removals or verifications fail with
/// [`LedgerError::SlotSettled`]. Clearing a slot keeps its confirmations.
///
/// # Examples
///
/// ```
/// use exposure_ledger::ledger::time_slot::{SlotPosition, TimeSlotLedger};
/// use exposure_ledger::core::party::PartyId;
/// use primitive_types::U256;
///
/// let alice = PartyId::from_low_u64(1);
/// let bob = PartyId::from_low_u64(2);
/// let day = SlotPosition::new(2030, 6, 15).unwrap();
/// let mut ledger = TimeSlotLedger::new();
///
/// ledger.add_payment(&alice, &bob, day, U256::from(5000), U256::from(10000)).unwrap();
/// let view = ledger.get(&alice, &bob, day).unwrap();
/// assert_eq!(view.net_payment, U256::from(5000));
/// assert_eq!(view.net_payer, Some(bob));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSlotLedger {
    #[serde(with = "crate::ledger::snapshot")]
    slots: HashMap<SlotKey, TimeSlot>,
    #[serde(with = "crate::ledger::snapshot")]
    confirmations: HashMap<ConfirmationKey, PaymentConfirmation>,
}

impl TimeSlotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for [`SlotPosition::new`].
    pub fn position(year: u16, month: u8, day: u8) -> Result<SlotPosition, LedgerError> {
        SlotPosition::new(year, month, day)
    }

    /// Slot state for the pair on `position`, seen from `party0`.
    pub fn get(
        &self,
        party0: &PartyId,
        party1: &PartyId,
        position: SlotPosition,
    ) -> Result<TimeSlotView, LedgerError> {
        let packed = pack(party0, party1)?;
        let slot = self.load(&packed, position);
        let (total_payment0, total_payment1) =
            packed.order(slot.total_payment0, slot.total_payment1);
        let net_payer = if slot.net_payment.is_zero() {
            None
        } else {
            let (canonical0, canonical1) = packed.canonical(*party0, *party1);
            Some(if slot.flipped { canonical1 } else { canonical0 })
        };
        Ok(TimeSlotView {
            total_payment0,
            total_payment1,
            net_payment: slot.net_payment,
            net_payer,
            paid_amount: slot.paid_amount,
            is_settled: slot.is_settled,
            confirmed: slot.confirmed,
        })
    }

    /// Raw canonical record for a slot, if one was ever written.
    pub fn slot(&self, key: &PairKey, position: SlotPosition) -> Option<&TimeSlot> {
        self.slots.get(&SlotKey {
            pair: *key,
            position,
        })
    }

    /// Confirmation recorded under `proof` for the pair and day.
    ///
    /// An unknown proof reads as a zero amount verified by the null party.
    pub fn get_payment_confirmation(
        &self,
        party0: &PartyId,
        party1: &PartyId,
        position: SlotPosition,
        proof: H256,
    ) -> Result<PaymentConfirmation, LedgerError> {
        let packed = pack(party0, party1)?;
        let key = ConfirmationKey {
            slot: SlotKey {
                pair: packed.key,
                position,
            },
            proof,
        };
        Ok(self.confirmations.get(&key).copied().unwrap_or_default())
    }

    /// Add gross payments due from `party0` (`amount0`) and `party1` (`amount1`).
    pub fn add_payment(
        &mut self,
        party0: &PartyId,
        party1: &PartyId,
        position: SlotPosition,
        amount0: Amount,
        amount1: Amount,
    ) -> Result<(), LedgerError> {
        let packed = pack(party0, party1)?;
        let mut slot = self.open_slot(&packed, position)?;
        let payer_flipped = slot.flipped;
        {
            let (total0, total1) =
                packed.order(&mut slot.total_payment0, &mut slot.total_payment1);
            *total0 = checked_add(*total0, amount0)?;
            *total1 = checked_add(*total1, amount1)?;
        }
        slot.recompute_net();
        slot.check_paid(payer_flipped)?;
        self.store(&packed, position, slot);

        debug!(
            "timeslot add: {} / {} at {} amounts=({}, {}) net={}",
            party0, party1, position, amount0, amount1, slot.net_payment
        );
        Ok(())
    }

    /// Remove gross payments; fails if either side would go negative.
    ///
    /// Both add and remove fail once confirmed payments would exceed the new
    /// net payment or the net payer would change.
    pub fn remove_payment(
        &mut self,
        party0: &PartyId,
        party1: &PartyId,
        position: SlotPosition,
        amount0: Amount,
        amount1: Amount,
    ) -> Result<(), LedgerError> {
        let packed = pack(party0, party1)?;
        let mut slot = self.open_slot(&packed, position)?;
        let payer_flipped = slot.flipped;
        {
            let (total0, total1) =
                packed.order(&mut slot.total_payment0, &mut slot.total_payment1);
            *total0 = checked_sub(*total0, amount0)?;
            *total1 = checked_sub(*total1, amount1)?;
        }
        slot.recompute_net();
        slot.check_paid(payer_flipped)?;
        self.store(&packed, position, slot);

        debug!(
            "timeslot remove: {} / {} at {} amounts=({}, {}) net={}",
            party0, party1, position, amount0, amount1, slot.net_payment
        );
        Ok(())
    }

    /// Confirm a payment of `amount` made against the slot, proven by `proof`.
    ///
    /// Cumulative confirmed amounts may never exceed the net payment. When
    /// they reach it exactly the slot is marked confirmed and closes. A slot
    /// with nothing owed cannot be verified.
    pub fn verify_payment(
        &mut self,
        verifier: &PartyId,
        counterparty: &PartyId,
        position: SlotPosition,
        amount: Amount,
        proof: H256,
    ) -> Result<(), LedgerError> {
        let packed = pack(verifier, counterparty)?;
        let mut slot = self.open_slot(&packed, position)?;
        let key = ConfirmationKey {
            slot: SlotKey {
                pair: packed.key,
                position,
            },
            proof,
        };
        if self.confirmations.contains_key(&key) {
            return Err(LedgerError::DuplicateConfirmation(proof));
        }
        if slot.net_payment.is_zero() {
            return Err(LedgerError::NoNetPayment);
        }

        let overflow = LedgerError::PaymentOverflow {
            verified: slot.paid_amount,
            amount,
            net_payment: slot.net_payment,
        };
        let total_paid = checked_add(slot.paid_amount, amount).map_err(|_| overflow.clone())?;
        if total_paid > slot.net_payment {
            return Err(overflow);
        }

        slot.paid_amount = total_paid;
        slot.confirmed = total_paid == slot.net_payment;
        self.store(&packed, position, slot);
        self.confirmations.insert(
            key,
            PaymentConfirmation {
                verifier: *verifier,
                amount,
            },
        );

        debug!(
            "timeslot verify: {} against {} at {} amount={} paid={}/{}",
            verifier, counterparty, position, amount, total_paid, slot.net_payment
        );
        if slot.confirmed {
            info!(
                "timeslot confirmed: pair={} at {} net={}",
                packed.key, position, slot.net_payment
            );
        }
        Ok(())
    }

    /// Zero the slot. Confirmations recorded against it are kept.
    pub fn clear(
        &mut self,
        party0: &PartyId,
        party1: &PartyId,
        position: SlotPosition,
    ) -> Result<(), LedgerError> {
        let packed = pack(party0, party1)?;
        let key = SlotKey {
            pair: packed.key,
            position,
        };
        if let Some(slot) = self.slots.get_mut(&key) {
            *slot = TimeSlot::default();
            debug!("timeslot clear: pair={} at {}", packed.key, position);
        }
        Ok(())
    }

    fn load(&self, packed: &PackedPair, position: SlotPosition) -> TimeSlot {
        self.slots
            .get(&SlotKey {
                pair: packed.key,
                position,
            })
            .copied()
            .unwrap_or_default()
    }

    fn open_slot(&self, packed: &PackedPair, position: SlotPosition) -> Result<TimeSlot, LedgerError> {
        let slot = self.load(packed, position);
        if slot.confirmed {
            return Err(LedgerError::SlotSettled);
        }
        Ok(slot)
    }

    fn store(&mut self, packed: &PackedPair, position: SlotPosition, slot: TimeSlot) {
        self.slots.insert(
            SlotKey {
                pair: packed.key,
                position,
            },
            slot,
        );
    }
}
