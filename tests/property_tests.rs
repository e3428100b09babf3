use exposure_ledger::core::pair::pack;
use exposure_ledger::core::party::PartyId;
use exposure_ledger::ledger::collateral::CollateralLedger;
use exposure_ledger::ledger::net_pv::NetPvLedger;
use exposure_ledger::ledger::time_slot::{SlotPosition, TimeSlotLedger};
use exposure_ledger::product::deal_id::{DealId, ProductPrefix, COUNTER_BITS};
use primitive_types::{H160, H256, U256};
use proptest::prelude::*;

/// Generate a random non-null party.
fn arb_party() -> impl Strategy<Value = PartyId> {
    any::<[u8; 20]>()
        .prop_filter("party must not be null", |bytes| bytes.iter().any(|b| *b != 0))
        .prop_map(|bytes| PartyId::new(H160(bytes)))
}

/// Generate two distinct non-null parties.
fn arb_pair() -> impl Strategy<Value = (PartyId, PartyId)> {
    (arb_party(), arb_party()).prop_filter("parties must differ", |(a, b)| a != b)
}

fn arb_amount() -> impl Strategy<Value = U256> {
    (0u64..1_000_000_000u64).prop_map(U256::from)
}

/// Generate a random calendar day in the supported range.
fn arb_position() -> impl Strategy<Value = SlotPosition> {
    (1970u16..=2345u16, 1u8..=12u8, 1u8..=28u8)
        .prop_map(|(y, m, d)| SlotPosition::new(y, m, d).unwrap())
}

fn arb_counter() -> impl Strategy<Value = U256> {
    any::<[u8; 28]>().prop_map(|bytes| U256::from_big_endian(&bytes))
}

proptest! {
    // ===================================================================
    // Pair keys are symmetric and the flip flag inverts with the order.
    // ===================================================================
    #[test]
    fn pack_is_symmetric((a, b) in arb_pair()) {
        let ab = pack(&a, &b).unwrap();
        let ba = pack(&b, &a).unwrap();
        prop_assert_eq!(ab.key, ba.key);
        prop_assert_ne!(ab.flipped, ba.flipped);
    }

    // ===================================================================
    // Degenerate pairs never produce a key.
    // ===================================================================
    #[test]
    fn pack_rejects_degenerate(a in arb_party()) {
        prop_assert!(pack(&a, &a).is_err());
        prop_assert!(pack(&PartyId::ZERO, &a).is_err());
        prop_assert!(pack(&a, &PartyId::ZERO).is_err());
    }

    // ===================================================================
    // Withdrawals remove min(requested, remaining) and never underflow.
    // ===================================================================
    #[test]
    fn collateral_withdraw_is_capped(
        (a, b) in arb_pair(),
        deposits in prop::collection::vec(arb_amount(), 1..10),
        withdrawals in prop::collection::vec(arb_amount(), 1..10),
    ) {
        let mut ledger = CollateralLedger::new();
        let mut remaining = U256::zero();
        for amount in &deposits {
            ledger.deposit(&a, &b, *amount).unwrap();
            remaining += *amount;
        }
        for request in &withdrawals {
            let withdrawn = ledger.withdraw(&a, &b, *request).unwrap();
            prop_assert_eq!(withdrawn, (*request).min(remaining));
            remaining -= withdrawn;
            prop_assert_eq!(ledger.get(&a, &b).unwrap().locked0, remaining);
        }
        prop_assert!(ledger.get(&a, &b).unwrap().locked1.is_zero());
    }

    // ===================================================================
    // Rebalancing conserves a party's collateral across two positions.
    // ===================================================================
    #[test]
    fn collateral_rebalance_conserves(
        (party, src) in arb_pair(),
        dst in arb_party(),
        locked_src in arb_amount(),
        locked_dst in arb_amount(),
        request in arb_amount(),
    ) {
        prop_assume!(dst != party && dst != src);
        let mut ledger = CollateralLedger::new();
        ledger.deposit(&party, &src, locked_src).unwrap();
        ledger.deposit(&party, &dst, locked_dst).unwrap();

        let moved = ledger.rebalance(&party, &src, &dst, request).unwrap();

        prop_assert_eq!(moved, request.min(locked_src));
        let after_src = ledger.get(&party, &src).unwrap().locked0;
        let after_dst = ledger.get(&party, &dst).unwrap().locked0;
        prop_assert_eq!(after_src, locked_src - moved);
        prop_assert_eq!(after_dst, locked_dst + moved);
        prop_assert_eq!(after_src + after_dst, locked_src + locked_dst);
    }

    // ===================================================================
    // Settling more than is unsettled fails and changes nothing.
    // ===================================================================
    #[test]
    fn pv_settle_is_strict(
        (a, b) in arb_pair(),
        unsettled in arb_amount(),
        request in arb_amount(),
    ) {
        let mut ledger = NetPvLedger::new();
        ledger.use_pv(&a, &b, unsettled, U256::zero(), false).unwrap();
        let before = ledger.get(&a, &b).unwrap();

        let result = ledger.settle(&a, &b, request, U256::zero());

        if request > unsettled {
            prop_assert!(result.is_err());
            prop_assert_eq!(ledger.get(&a, &b).unwrap(), before);
        } else {
            prop_assert!(result.is_ok());
            let view = ledger.get(&a, &b).unwrap();
            prop_assert_eq!(view.unsettled0, unsettled - request);
            prop_assert_eq!(view.settled0, request);
        }
    }

    // ===================================================================
    // Releasing more than is held fails and changes nothing, on either
    // the unsettled or the settled side.
    // ===================================================================
    #[test]
    fn pv_release_is_strict(
        (a, b) in arb_pair(),
        held in (arb_amount(), arb_amount()),
        request in (arb_amount(), arb_amount()),
        is_settled in any::<bool>(),
    ) {
        let mut ledger = NetPvLedger::new();
        ledger.use_pv(&a, &b, held.0, held.1, is_settled).unwrap();
        let before = ledger.get(&a, &b).unwrap();

        let result = ledger.release(&a, &b, request.0, request.1, is_settled);

        if request.0 > held.0 || request.1 > held.1 {
            prop_assert!(result.is_err());
            prop_assert_eq!(ledger.get(&a, &b).unwrap(), before);
        } else {
            prop_assert!(result.is_ok());
            let view = ledger.get(&a, &b).unwrap();
            let (side0, side1) = if is_settled {
                (view.settled0, view.settled1)
            } else {
                (view.unsettled0, view.unsettled1)
            };
            prop_assert_eq!(side0, held.0 - request.0);
            prop_assert_eq!(side1, held.1 - request.1);
        }
    }

    // ===================================================================
    // Revaluing from a previous amount above the settled balance fails
    // and changes nothing.
    // ===================================================================
    #[test]
    fn pv_update_is_strict(
        (a, b) in arb_pair(),
        settled in (arb_amount(), arb_amount()),
        prev in (arb_amount(), arb_amount()),
        new in (arb_amount(), arb_amount()),
    ) {
        let mut ledger = NetPvLedger::new();
        ledger.use_pv(&a, &b, settled.0, settled.1, true).unwrap();
        let before = ledger.get(&a, &b).unwrap();

        let result = ledger.update(&a, &b, prev.0, prev.1, new.0, new.1);

        if prev.0 > settled.0 || prev.1 > settled.1 {
            prop_assert!(result.is_err());
            prop_assert_eq!(ledger.get(&a, &b).unwrap(), before);
        } else {
            prop_assert!(result.is_ok());
            let view = ledger.get(&a, &b).unwrap();
            prop_assert_eq!(view.settled0, settled.0 - prev.0 + new.0);
            prop_assert_eq!(view.settled1, settled.1 - prev.1 + new.1);
        }
    }

    // ===================================================================
    // Confirmed payments stay within the net payment however the gross
    // totals move afterwards.
    // ===================================================================
    #[test]
    fn confirmed_payments_survive_total_changes(
        (a, b) in arb_pair(),
        owed in 1u64..1_000_000u64,
        verified in 1u64..1_000_000u64,
        removal in 0u64..1_000_000u64,
        added in 0u64..1_000_000u64,
    ) {
        prop_assume!(verified < owed);
        let mut ledger = TimeSlotLedger::new();
        let position = SlotPosition::new(2033, 4, 1).unwrap();
        ledger.add_payment(&a, &b, position, U256::from(owed), U256::zero()).unwrap();
        ledger
            .verify_payment(&a, &b, position, U256::from(verified), H256::repeat_byte(1))
            .unwrap();

        let _ = ledger.remove_payment(&a, &b, position, U256::from(removal.min(owed)), U256::zero());
        let _ = ledger.add_payment(&a, &b, position, U256::zero(), U256::from(added));

        let view = ledger.get(&a, &b, position).unwrap();
        prop_assert_eq!(view.paid_amount, U256::from(verified));
        prop_assert!(view.paid_amount <= view.net_payment);
        prop_assert_eq!(view.net_payer, Some(a));
    }

    // ===================================================================
    // Views are the same record seen from either argument order.
    // ===================================================================
    #[test]
    fn pv_views_mirror((a, b) in arb_pair(), x in arb_amount(), y in arb_amount()) {
        let mut ledger = NetPvLedger::new();
        ledger.use_pv(&a, &b, x, y, false).unwrap();
        let ab = ledger.get(&a, &b).unwrap();
        let ba = ledger.get(&b, &a).unwrap();
        prop_assert_eq!(ab.unsettled0, ba.unsettled1);
        prop_assert_eq!(ab.unsettled1, ba.unsettled0);
    }

    // ===================================================================
    // Net payment is the gross difference; parity means settled.
    // ===================================================================
    #[test]
    fn time_slot_net_matches_totals(
        (a, b) in arb_pair(),
        position in arb_position(),
        payments in prop::collection::vec((arb_amount(), arb_amount()), 1..8),
    ) {
        let mut ledger = TimeSlotLedger::new();
        let (mut total_a, mut total_b) = (U256::zero(), U256::zero());
        for (pa, pb) in &payments {
            ledger.add_payment(&a, &b, position, *pa, *pb).unwrap();
            total_a += *pa;
            total_b += *pb;
        }
        let view = ledger.get(&a, &b, position).unwrap();
        prop_assert_eq!(view.total_payment0, total_a);
        prop_assert_eq!(view.total_payment1, total_b);
        prop_assert_eq!(view.net_payment, total_a.max(total_b) - total_a.min(total_b));
        prop_assert_eq!(view.is_settled, total_a == total_b);
        let expected_payer = if total_a > total_b {
            Some(a)
        } else if total_b > total_a {
            Some(b)
        } else {
            None
        };
        prop_assert_eq!(view.net_payer, expected_payer);
    }

    // ===================================================================
    // Verified payments never exceed the net payment.
    // ===================================================================
    #[test]
    fn verified_never_exceeds_net(
        (a, b) in arb_pair(),
        net in 1u64..1_000_000u64,
        attempts in prop::collection::vec(0u64..400_000u64, 1..12),
    ) {
        let mut ledger = TimeSlotLedger::new();
        let position = SlotPosition::new(2032, 8, 9).unwrap();
        ledger.add_payment(&a, &b, position, U256::from(net), U256::zero()).unwrap();

        let mut verified = 0u64;
        for (i, amount) in attempts.iter().enumerate() {
            let proof = H256::from_low_u64_be(i as u64);
            let result = ledger.verify_payment(&a, &b, position, U256::from(*amount), proof);
            let closed = verified == net;
            if !closed && verified + amount <= net {
                prop_assert!(result.is_ok());
                verified += amount;
            } else {
                prop_assert!(result.is_err());
            }
            let view = ledger.get(&a, &b, position).unwrap();
            prop_assert_eq!(view.paid_amount, U256::from(verified));
            prop_assert!(view.paid_amount <= view.net_payment);
            prop_assert_eq!(view.confirmed, verified == net);
        }
    }

    // ===================================================================
    // Deal identifiers carry their prefix and counter losslessly.
    // ===================================================================
    #[test]
    fn deal_id_round_trip(prefix in any::<[u8; 4]>(), counter in arb_counter()) {
        let prefix = ProductPrefix::new(prefix);
        let id = DealId::generate(prefix, counter).unwrap();
        prop_assert_eq!(id.prefix(), prefix);
        prop_assert_eq!(id.counter(), counter);
    }

    #[test]
    fn deal_id_rejects_wide_counter(prefix in any::<[u8; 4]>(), extra in any::<u64>()) {
        let counter = (U256::one() << COUNTER_BITS) + U256::from(extra);
        prop_assert!(DealId::generate(ProductPrefix::new(prefix), counter).is_err());
    }
}
