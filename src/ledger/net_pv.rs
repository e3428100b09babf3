use crate::core::amount::{checked_add, checked_sub, Amount};
use crate::core::pair::{pack, PackedPair, PairKey};
use crate::core::party::PartyId;
use crate::ledger::error::LedgerError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Present value held between one pair of parties, in canonical slot order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPvBalance {
    pub unsettled0: Amount,
    pub unsettled1: Amount,
    pub settled0: Amount,
    pub settled1: Amount,
}

/// Present value balances in the caller's argument order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPvView {
    pub unsettled0: Amount,
    pub unsettled1: Amount,
    pub settled0: Amount,
    pub settled1: Amount,
}

/// Per-pair settled and unsettled present value.
///
/// Unlike the collateral ledger, every removal here is strict: settling,
/// releasing or revaluing more than a balance holds fails and leaves the
/// record unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetPvLedger {
    #[serde(with = "crate::ledger::snapshot")]
    balances: HashMap<PairKey, NetPvBalance>,
}

impl NetPvLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balances of the pair, oriented so `*0` fields belong to `party0`.
    pub fn get(&self, party0: &PartyId, party1: &PartyId) -> Result<NetPvView, LedgerError> {
        let packed = pack(party0, party1)?;
        let balance = self.balances.get(&packed.key).copied().unwrap_or_default();
        let (unsettled0, unsettled1) = packed.order(balance.unsettled0, balance.unsettled1);
        let (settled0, settled1) = packed.order(balance.settled0, balance.settled1);
        Ok(NetPvView {
            unsettled0,
            unsettled1,
            settled0,
            settled1,
        })
    }

    /// Raw canonical record for a pair key, if one was ever written.
    pub fn balance(&self, key: &PairKey) -> Option<&NetPvBalance> {
        self.balances.get(key)
    }

    /// Record new present value for both sides of a pair.
    ///
    /// `amount0` belongs to `party0` and `amount1` to `party1`. The amounts
    /// land in the unsettled balances, or directly in the settled balances
    /// when `is_settled` is set. Zero on both sides is a no-op.
    pub fn use_pv(
        &mut self,
        party0: &PartyId,
        party1: &PartyId,
        amount0: Amount,
        amount1: Amount,
        is_settled: bool,
    ) -> Result<(), LedgerError> {
        let packed = pack(party0, party1)?;
        if amount0.is_zero() && amount1.is_zero() {
            return Ok(());
        }
        let mut balance = self.load(&packed);
        let (first, second) = Self::sides(&packed, &mut balance, is_settled);
        *first = checked_add(*first, amount0)?;
        *second = checked_add(*second, amount1)?;
        self.balances.insert(packed.key, balance);

        debug!(
            "pv use: {} / {} amounts=({}, {}) settled={} pair={}",
            party0, party1, amount0, amount1, is_settled, packed.key
        );
        Ok(())
    }

    /// Move `amount0` of `party0`'s and `amount1` of `party1`'s present
    /// value from unsettled to settled.
    pub fn settle(
        &mut self,
        party0: &PartyId,
        party1: &PartyId,
        amount0: Amount,
        amount1: Amount,
    ) -> Result<(), LedgerError> {
        let packed = pack(party0, party1)?;
        let mut balance = self.load(&packed);
        {
            let (unsettled0, unsettled1) = Self::sides(&packed, &mut balance, false);
            *unsettled0 = checked_sub(*unsettled0, amount0)?;
            *unsettled1 = checked_sub(*unsettled1, amount1)?;
        }
        {
            let (settled0, settled1) = Self::sides(&packed, &mut balance, true);
            *settled0 = checked_add(*settled0, amount0)?;
            *settled1 = checked_add(*settled1, amount1)?;
        }
        self.balances.insert(packed.key, balance);

        debug!(
            "pv settle: {} / {} amounts=({}, {}) pair={}",
            party0, party1, amount0, amount1, packed.key
        );
        Ok(())
    }

    /// Remove present value from the unsettled (or, with `is_settled`,
    /// settled) balances of both sides.
    pub fn release(
        &mut self,
        party0: &PartyId,
        party1: &PartyId,
        amount0: Amount,
        amount1: Amount,
        is_settled: bool,
    ) -> Result<(), LedgerError> {
        let packed = pack(party0, party1)?;
        let mut balance = self.load(&packed);
        let (first, second) = Self::sides(&packed, &mut balance, is_settled);
        *first = checked_sub(*first, amount0)?;
        *second = checked_sub(*second, amount1)?;
        self.balances.insert(packed.key, balance);

        debug!(
            "pv release: {} / {} amounts=({}, {}) settled={} pair={}",
            party0, party1, amount0, amount1, is_settled, packed.key
        );
        Ok(())
    }

    /// Revalue previously settled present value.
    ///
    /// Each settled balance becomes `balance - prev + new`. Only the
    /// previous amounts are bounded by the current balances; the new
    /// amounts are taken as given.
    pub fn update(
        &mut self,
        party0: &PartyId,
        party1: &PartyId,
        prev_amount0: Amount,
        prev_amount1: Amount,
        new_amount0: Amount,
        new_amount1: Amount,
    ) -> Result<(), LedgerError> {
        let packed = pack(party0, party1)?;
        let mut balance = self.load(&packed);
        let (settled0, settled1) = Self::sides(&packed, &mut balance, true);
        *settled0 = checked_add(checked_sub(*settled0, prev_amount0)?, new_amount0)?;
        *settled1 = checked_add(checked_sub(*settled1, prev_amount1)?, new_amount1)?;
        self.balances.insert(packed.key, balance);

        debug!(
            "pv update: {} / {} prev=({}, {}) new=({}, {}) pair={}",
            party0, party1, prev_amount0, prev_amount1, new_amount0, new_amount1, packed.key
        );
        Ok(())
    }

    /// Zero every balance of the pair.
    pub fn clear(&mut self, party0: &PartyId, party1: &PartyId) -> Result<(), LedgerError> {
        let packed = pack(party0, party1)?;
        if let Some(balance) = self.balances.get_mut(&packed.key) {
            *balance = NetPvBalance::default();
            debug!("pv clear: pair={}", packed.key);
        }
        Ok(())
    }

    fn load(&self, packed: &PackedPair) -> NetPvBalance {
        self.balances.get(&packed.key).copied().unwrap_or_default()
    }

    /// Caller-ordered mutable references to one balance kind.
    fn sides<'a>(
        packed: &PackedPair,
        balance: &'a mut NetPvBalance,
        settled: bool,
    ) -> (&'a mut Amount, &'a mut Amount) {
        if settled {
            packed.order(&mut balance.settled0, &mut balance.settled1)
        } else {
            packed.order(&mut balance.unsettled0, &mut balance.unsettled1)
        }
    }
}
