//! # Salary Computation
//!
//! The pure heart of the payroll engine: turning a period's
//! commissionable sales total into a salary breakdown, and
//! apportioning the commission back onto the contributing sales for
//! the ledger.
//!
//! ## The Rounding Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              ROUND ONCE, THEN APPORTION EXACTLY                         │
//! │                                                                         │
//! │  sales: 200,000.00 + 300,000.00 ──► total 500,000.00                   │
//! │                                          │                              │
//! │                                          ▼                              │
//! │            commission = round_half_up(total × rate)   ◄─ THE ONLY      │
//! │                       = 5,000.00 at 1%                   ROUNDING      │
//! │                                          │                              │
//! │                                          ▼                              │
//! │            allocate_commission() splits 5,000.00 across the two        │
//! │            sales by largest remainder: 2,000.00 + 3,000.00             │
//! │                                          │                              │
//! │                                          ▼                              │
//! │            Σ ledger entries == salary record commission  ALWAYS        │
//! │                                                                         │
//! │  If each sale's commission were rounded independently instead, the    │
//! │  ledger could drift a cent from the record and reconciliation fails.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything in this module is a pure function: same input, same
//! output, no clock, no I/O.

use crate::money::Money;
use crate::types::{CommissionRate, RateCard};

// =============================================================================
// Salary Breakdown
// =============================================================================

/// The result of a salary computation: the three figures that go on
/// the salary record and the payslip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryBreakdown {
    /// Base salary snapshot.
    pub base: Money,

    /// Commission on the period's commissionable sales.
    pub commission: Money,

    /// base + commission.
    pub total: Money,
}

// =============================================================================
// Computation
// =============================================================================

/// Computes an employee's salary for a period.
///
/// Commission = `sales_total × rate`, rounded half-up to the cent.
/// This is the single rounding point in the whole pipeline.
///
/// ## Arguments
/// * `rates` - base salary and commission rate resolved at computation time
/// * `sales_total` - sum of attributed sale sub-totals (tax excluded)
///
/// ## Example
/// ```rust
/// use meridian_core::compute::compute_salary;
/// use meridian_core::money::Money;
/// use meridian_core::types::{CommissionRate, RateCard};
///
/// let rates = RateCard {
///     base_salary: Money::from_cents(150_000_000), // 1,500,000.00
///     rate: CommissionRate::from_bps(100),         // 1%
/// };
/// let sales = Money::from_cents(50_000_000); // 500,000.00
///
/// let breakdown = compute_salary(&rates, sales);
/// assert_eq!(breakdown.commission.cents(), 500_000);   //     5,000.00
/// assert_eq!(breakdown.total.cents(), 150_500_000);    // 1,505,000.00
/// ```
pub fn compute_salary(rates: &RateCard, sales_total: Money) -> SalaryBreakdown {
    let commission = commission_on(sales_total, rates.rate);
    SalaryBreakdown {
        base: rates.base_salary,
        commission,
        total: rates.base_salary + commission,
    }
}

/// Commission on an amount at a bps rate, rounded half-up to the cent.
///
/// Integer math in i128 to rule out overflow:
/// `(amount_cents * bps + 5000) / 10000`; the +5000 is the half-up
/// rounding term (5000/10000 = 0.5).
fn commission_on(amount: Money, rate: CommissionRate) -> Money {
    let cents = (amount.cents() as i128 * rate.bps() as i128 + 5000) / 10000;
    Money::from_cents(cents as i64)
}

// =============================================================================
// Commission Allocation
// =============================================================================

/// Apportions a commission figure across the contributing sales.
///
/// Uses the largest-remainder method: each sale gets the floor of its
/// proportional share, then the leftover cents go to the sales with
/// the largest remainders (ties broken by position, so the result is
/// deterministic).
///
/// ## Guarantee
/// The returned amounts sum to `commission` exactly. This is what
/// makes the commission ledger reconcile with the salary record to
/// the cent.
///
/// ## Arguments
/// * `commission` - the already-rounded period commission
/// * `subtotals` - the contributing sales' sub-totals, in the order
///   their ledger entries will be written
///
/// ## Edge Cases
/// * empty `subtotals` → empty vec (no sales, commission is zero)
/// * all-zero subtotals → all-zero amounts
pub fn allocate_commission(commission: Money, subtotals: &[Money]) -> Vec<Money> {
    if subtotals.is_empty() {
        return Vec::new();
    }

    let total: i128 = subtotals.iter().map(|s| s.cents() as i128).sum();
    if total == 0 {
        return vec![Money::zero(); subtotals.len()];
    }

    let commission_cents = commission.cents() as i128;

    // Floor shares plus remainders
    let mut shares: Vec<i64> = Vec::with_capacity(subtotals.len());
    let mut remainders: Vec<(usize, i128)> = Vec::with_capacity(subtotals.len());
    let mut allocated: i128 = 0;

    for (idx, subtotal) in subtotals.iter().enumerate() {
        let numerator = commission_cents * subtotal.cents() as i128;
        let share = numerator.div_euclid(total);
        let remainder = numerator.rem_euclid(total);

        shares.push(share as i64);
        remainders.push((idx, remainder));
        allocated += share;
    }

    // Hand out the leftover cents, largest remainder first
    let mut leftover = (commission_cents - allocated) as usize;
    remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    for (idx, _) in remainders {
        if leftover == 0 {
            break;
        }
        shares[idx] += 1;
        leftover -= 1;
    }

    shares.into_iter().map(Money::from_cents).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(base_cents: i64, bps: u32) -> RateCard {
        RateCard {
            base_salary: Money::from_cents(base_cents),
            rate: CommissionRate::from_bps(bps),
        }
    }

    /// The reference scenario: base 1,500,000.00 at 1%, sales of
    /// 200,000.00 and 300,000.00.
    #[test]
    fn test_reference_scenario() {
        let card = rates(150_000_000, 100);
        let sales = Money::from_cents(20_000_000) + Money::from_cents(30_000_000);

        let breakdown = compute_salary(&card, sales);

        assert_eq!(breakdown.base.cents(), 150_000_000);
        assert_eq!(breakdown.commission.cents(), 500_000); // 5,000.00
        assert_eq!(breakdown.total.cents(), 150_500_000); // 1,505,000.00
    }

    #[test]
    fn test_no_sales_pays_base_only() {
        let card = rates(150_000_000, 100);
        let breakdown = compute_salary(&card, Money::zero());

        assert_eq!(breakdown.commission, Money::zero());
        assert_eq!(breakdown.total, card.base_salary);
    }

    #[test]
    fn test_zero_rate_pays_base_only() {
        let card = rates(150_000_000, 0);
        let breakdown = compute_salary(&card, Money::from_cents(99_999_999));

        assert_eq!(breakdown.commission, Money::zero());
        assert_eq!(breakdown.total, card.base_salary);
    }

    #[test]
    fn test_rounding_half_up_once() {
        // 10.01 at 0.25% = 2.5025 cents → 3 cents half-up
        // (1001 * 25 + 5000) / 10000 = 30025 / 10000 = 3
        let card = rates(0, 25);
        let breakdown = compute_salary(&card, Money::from_cents(1001));
        assert_eq!(breakdown.commission.cents(), 3);

        // the half-way case rounds up: 2.00 at 1.25% = 2.5 cents → 3
        let card = rates(0, 125);
        let breakdown = compute_salary(&card, Money::from_cents(200));
        assert_eq!(breakdown.commission.cents(), 3);

        // just under half rounds down: 1.99 at 1.25% = 2.4875 → 2
        let breakdown = compute_salary(&card, Money::from_cents(199));
        assert_eq!(breakdown.commission.cents(), 2);
    }

    #[test]
    fn test_allocation_sums_exactly() {
        // 100 cents across a three-way even split: 33/33/34, not 33/33/33
        let commission = Money::from_cents(100);
        let subtotals = vec![
            Money::from_cents(1000),
            Money::from_cents(1000),
            Money::from_cents(1000),
        ];

        let amounts = allocate_commission(commission, &subtotals);
        let sum: Money = amounts.iter().copied().sum();

        assert_eq!(sum, commission);
        assert_eq!(amounts.len(), 3);
        // deterministic: the leftover cent goes to the first sale on a tie
        assert_eq!(
            amounts.iter().map(Money::cents).collect::<Vec<_>>(),
            vec![34, 33, 33]
        );
    }

    #[test]
    fn test_allocation_proportional() {
        let commission = Money::from_cents(500_000);
        let subtotals = vec![Money::from_cents(20_000_000), Money::from_cents(30_000_000)];

        let amounts = allocate_commission(commission, &subtotals);

        assert_eq!(amounts[0].cents(), 200_000); // 2,000.00
        assert_eq!(amounts[1].cents(), 300_000); // 3,000.00
    }

    #[test]
    fn test_allocation_adversarial_splits() {
        // Amounts chosen so no share divides evenly
        let commission = Money::from_cents(997);
        let subtotals = vec![
            Money::from_cents(333),
            Money::from_cents(334),
            Money::from_cents(335),
            Money::from_cents(1),
        ];

        let amounts = allocate_commission(commission, &subtotals);
        let sum: i64 = amounts.iter().map(Money::cents).sum();

        assert_eq!(sum, 997);
        assert_eq!(amounts.len(), 4);
    }

    #[test]
    fn test_allocation_edge_cases() {
        assert!(allocate_commission(Money::from_cents(100), &[]).is_empty());

        let zeroes = vec![Money::zero(), Money::zero()];
        let amounts = allocate_commission(Money::zero(), &zeroes);
        assert_eq!(amounts, vec![Money::zero(), Money::zero()]);

        // zero commission over real sales: all zero entries
        let subtotals = vec![Money::from_cents(500), Money::from_cents(700)];
        let amounts = allocate_commission(Money::zero(), &subtotals);
        let sum: Money = amounts.iter().copied().sum();
        assert_eq!(sum, Money::zero());
    }

    /// End to end: computed commission always equals the allocated sum,
    /// for a spread of rates and sale mixes.
    #[test]
    fn test_compute_then_allocate_reconciles() {
        let mixes: Vec<Vec<i64>> = vec![
            vec![1],
            vec![999, 1],
            vec![333, 333, 333],
            vec![19_999, 70_001, 10_000],
            vec![1_000_000, 3, 999_999_999],
        ];

        for bps in [1u32, 7, 100, 825, 9_999] {
            for mix in &mixes {
                let subtotals: Vec<Money> =
                    mix.iter().map(|&c| Money::from_cents(c)).collect();
                let sales_total: Money = subtotals.iter().copied().sum();

                let card = rates(0, bps);
                let breakdown = compute_salary(&card, sales_total);
                let amounts = allocate_commission(breakdown.commission, &subtotals);
                let ledger_sum: Money = amounts.iter().copied().sum();

                assert_eq!(
                    ledger_sum, breakdown.commission,
                    "drift at bps={bps} mix={mix:?}"
                );
            }
        }
    }
}
