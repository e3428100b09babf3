use crate::core::amount::{capped_sub, checked_add, Amount};
use crate::core::pair::{pack, PairKey};
use crate::core::party::PartyId;
use crate::ledger::error::LedgerError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collateral locked between one pair of parties, in canonical slot order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralPosition {
    pub locked0: Amount,
    pub locked1: Amount,
}

impl CollateralPosition {
    pub fn is_empty(&self) -> bool {
        self.locked0.is_zero() && self.locked1.is_zero()
    }
}

/// Locked collateral as seen from the caller's argument order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralView {
    /// Collateral locked by the first party named in the call.
    pub locked0: Amount,
    /// Collateral locked by the second party named in the call.
    pub locked1: Amount,
}

/// Per-pair locked collateral.
///
/// Recovery operations (`withdraw`, `liquidate`, `rebalance`) are
/// permissive: a request larger than the locked balance moves only what
/// is available and still succeeds. Each returns the amount actually
/// moved, `min(requested, available)`.
///
/// # Examples
///
/// ```
/// use exposure_ledger::ledger::collateral::CollateralLedger;
/// use exposure_ledger::core::party::PartyId;
/// use primitive_types::U256;
///
/// let alice = PartyId::from_low_u64(1);
/// let bob = PartyId::from_low_u64(2);
/// let mut ledger = CollateralLedger::new();
///
/// ledger.deposit(&alice, &bob, U256::from(2)).unwrap();
/// let withdrawn = ledger.withdraw(&alice, &bob, U256::from(5)).unwrap();
/// assert_eq!(withdrawn, U256::from(2));
/// assert!(ledger.get(&alice, &bob).unwrap().locked0.is_zero());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollateralLedger {
    #[serde(with = "crate::ledger::snapshot")]
    positions: HashMap<PairKey, CollateralPosition>,
}

impl CollateralLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locked balances of `party0` and `party1`, in that order.
    pub fn get(&self, party0: &PartyId, party1: &PartyId) -> Result<CollateralView, LedgerError> {
        let packed = pack(party0, party1)?;
        let position = self
            .positions
            .get(&packed.key)
            .copied()
            .unwrap_or_default();
        let (locked0, locked1) = packed.order(position.locked0, position.locked1);
        Ok(CollateralView { locked0, locked1 })
    }

    /// Raw canonical record for a pair key, if one was ever written.
    pub fn position(&self, key: &PairKey) -> Option<&CollateralPosition> {
        self.positions.get(key)
    }

    /// Lock `amount` of `depositor`'s collateral against `counterparty`.
    ///
    /// A zero amount leaves the ledger untouched.
    pub fn deposit(
        &mut self,
        depositor: &PartyId,
        counterparty: &PartyId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let packed = pack(depositor, counterparty)?;
        if amount.is_zero() {
            return Ok(());
        }
        let position = self.positions.entry(packed.key).or_default();
        let (own, _) = packed.order(&mut position.locked0, &mut position.locked1);
        *own = checked_add(*own, amount)?;

        debug!(
            "collateral deposit: {} -> {} amount={} pair={}",
            depositor, counterparty, amount, packed.key
        );
        Ok(())
    }

    /// Release up to `amount` of `party0`'s collateral locked against `party1`.
    pub fn withdraw(
        &mut self,
        party0: &PartyId,
        party1: &PartyId,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        let packed = pack(party0, party1)?;
        let Some(position) = self.positions.get_mut(&packed.key) else {
            return Ok(Amount::zero());
        };
        let (own, _) = packed.order(&mut position.locked0, &mut position.locked1);
        let (remaining, withdrawn) = capped_sub(*own, amount);
        *own = remaining;

        if withdrawn < amount {
            warn!(
                "collateral withdraw truncated: {} requested={} withdrawn={}",
                party0, amount, withdrawn
            );
        }
        debug!(
            "collateral withdraw: {} against {} amount={} pair={}",
            party0, party1, withdrawn, packed.key
        );
        Ok(withdrawn)
    }

    /// Move up to `amount` of `from`'s locked collateral to `to`'s side of
    /// the same pair.
    pub fn liquidate(
        &mut self,
        from: &PartyId,
        to: &PartyId,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        let packed = pack(from, to)?;
        let Some(position) = self.positions.get_mut(&packed.key) else {
            return Ok(Amount::zero());
        };
        let (source, target) = packed.order(&mut position.locked0, &mut position.locked1);
        let (remaining, liquidated) = capped_sub(*source, amount);
        let credited = checked_add(*target, liquidated)?;
        *source = remaining;
        *target = credited;

        if liquidated < amount {
            warn!(
                "collateral liquidation truncated: {} requested={} liquidated={}",
                from, amount, liquidated
            );
        }
        debug!(
            "collateral liquidate: {} -> {} amount={} pair={}",
            from, to, liquidated, packed.key
        );
        Ok(liquidated)
    }

    /// Move up to `amount` of `party`'s collateral from the position held
    /// against `src` to the position held against `dst`.
    ///
    /// Total collateral locked by `party` across the two positions is
    /// conserved.
    pub fn rebalance(
        &mut self,
        party: &PartyId,
        src: &PartyId,
        dst: &PartyId,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        let source = pack(party, src)?;
        let target = pack(party, dst)?;
        if source.key == target.key {
            return Ok(Amount::zero());
        }

        let available = match self.positions.get(&source.key) {
            Some(position) => *source.order(&position.locked0, &position.locked1).0,
            None => return Ok(Amount::zero()),
        };
        let (remaining, moved) = capped_sub(available, amount);
        if moved.is_zero() {
            return Ok(moved);
        }

        let destination = self.positions.get(&target.key).copied().unwrap_or_default();
        let (held, _) = target.order(destination.locked0, destination.locked1);
        let credited = checked_add(held, moved)?;

        if let Some(position) = self.positions.get_mut(&source.key) {
            let (own, _) = source.order(&mut position.locked0, &mut position.locked1);
            *own = remaining;
        }
        let position = self.positions.entry(target.key).or_default();
        let (own, _) = target.order(&mut position.locked0, &mut position.locked1);
        *own = credited;

        if moved < amount {
            warn!(
                "collateral rebalance truncated: {} requested={} moved={}",
                party, amount, moved
            );
        }
        debug!(
            "collateral rebalance: {} from {} to {} amount={}",
            party, src, dst, moved
        );
        Ok(moved)
    }

    /// Zero both sides of the pair's position.
    pub fn clear(&mut self, party0: &PartyId, party1: &PartyId) -> Result<(), LedgerError> {
        let packed = pack(party0, party1)?;
        if let Some(position) = self.positions.get_mut(&packed.key) {
            *position = CollateralPosition::default();
            debug!("collateral clear: pair={}", packed.key);
        }
        Ok(())
    }
}
