//! Bilateral exposure walkthrough.
//!
//! Books collateral, present value and a coupon payment between two
//! counterparties and prints each ledger after every step.
//!
//! Run with `RUST_LOG=debug` to see the ledger trace.

use exposure_ledger::core::party::PartyId;
use exposure_ledger::ledger::collateral::CollateralLedger;
use exposure_ledger::ledger::net_pv::NetPvLedger;
use exposure_ledger::ledger::time_slot::TimeSlotLedger;
use primitive_types::{H256, U256};

fn main() {
    env_logger::init();

    println!("╔═════════════════════════════════════════════╗");
    println!("║  exposure-ledger: Bilateral Exposure Demo   ║");
    println!("╚═════════════════════════════════════════════╝\n");

    let alice = PartyId::from_low_u64(0xa11ce);
    let bob = PartyId::from_low_u64(0xb0b);

    // --- Collateral ---
    println!("━━━ Collateral ━━━\n");

    let mut collateral = CollateralLedger::new();
    collateral.deposit(&alice, &bob, U256::from(2)).unwrap();
    collateral.deposit(&bob, &alice, U256::from(5)).unwrap();
    let withdrawn = collateral.withdraw(&alice, &bob, U256::from(5)).unwrap();
    let view = collateral.get(&alice, &bob).unwrap();

    println!("Alice asked to withdraw 5, received: {}", withdrawn);
    println!("Locked (alice, bob):                ({}, {})", view.locked0, view.locked1);
    println!();

    // --- Present value ---
    println!("━━━ Net Present Value ━━━\n");

    let mut pv = NetPvLedger::new();
    pv.use_pv(&alice, &bob, U256::from(1_000), U256::from(400), false).unwrap();
    pv.settle(&alice, &bob, U256::from(250), U256::from(400)).unwrap();
    let view = pv.get(&alice, &bob).unwrap();

    println!("Unsettled (alice, bob): ({}, {})", view.unsettled0, view.unsettled1);
    println!("Settled   (alice, bob): ({}, {})", view.settled0, view.settled1);
    match pv.settle(&alice, &bob, U256::from(10_000), U256::zero()) {
        Ok(()) => println!("Oversized settle unexpectedly accepted"),
        Err(e) => println!("Oversized settle rejected: {}", e),
    }
    println!();

    // --- Coupon date ---
    println!("━━━ Coupon Date 2030-06-30 ━━━\n");

    let mut slots = TimeSlotLedger::new();
    let coupon = TimeSlotLedger::position(2030, 6, 30).unwrap();
    slots
        .add_payment(&alice, &bob, coupon, U256::from(5_000), U256::from(10_000))
        .unwrap();
    let view = slots.get(&alice, &bob, coupon).unwrap();
    let payer = view
        .net_payer
        .map(|p| p.to_string())
        .unwrap_or_else(|| "nobody".to_string());

    println!("Gross (alice, bob): ({}, {})", view.total_payment0, view.total_payment1);
    println!("Net payment:        {} owed by {}", view.net_payment, payer);

    slots
        .verify_payment(&bob, &alice, coupon, view.net_payment, H256::repeat_byte(0xab))
        .unwrap();
    let view = slots.get(&alice, &bob, coupon).unwrap();
    println!("Confirmed:          {}", view.confirmed);
}
