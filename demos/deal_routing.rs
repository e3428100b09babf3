//! Deal identifier routing example.
//!
//! Mints deal identifiers for two products and resolves each one to its
//! settlement contract through the product registry.

use exposure_ledger::core::party::PartyId;
use exposure_ledger::product::deal_id::{DealId, ProductPrefix};
use exposure_ledger::product::registry::{KnownContracts, ProductRegistry};
use primitive_types::U256;

fn main() {
    env_logger::init();

    println!("╔═══════════════════════════════════════════╗");
    println!("║  exposure-ledger: Deal Routing Example    ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let admin = PartyId::from_low_u64(0xad);
    let loan_logic = PartyId::from_low_u64(0x1000);
    let loan_market = PartyId::from_low_u64(0x1001);
    let swap_logic = PartyId::from_low_u64(0x2000);
    let swap_market = PartyId::from_low_u64(0x2001);

    let contracts: KnownContracts = [loan_logic, loan_market, swap_logic, swap_market]
        .into_iter()
        .collect();
    let mut registry = ProductRegistry::new(admin, contracts);

    let loan = ProductPrefix::from_label("0xLoan");
    let swap = ProductPrefix::from_label("0xInterestRateSwap");
    registry
        .register_products(
            &admin,
            &[loan, swap],
            &[loan_logic, swap_logic],
            &[loan_market, swap_market],
        )
        .unwrap();

    for (prefix, counter) in [(loan, 1u64), (loan, 2), (swap, 1)] {
        let deal = DealId::generate(prefix, U256::from(counter)).unwrap();
        println!("Deal {}", deal);
        println!("  prefix:     {}", deal.prefix());
        println!("  logic:      {}", registry.product_contract_by_deal_id(&deal));
        println!("  controller: {}", registry.controller_contract_by_deal_id(&deal));
    }

    let outsider = PartyId::from_low_u64(0xbad);
    if let Err(e) = registry.register_product(&outsider, loan, swap_logic, swap_market) {
        println!("\nRegistration by {} rejected: {}", outsider, e);
    }
}
