//! Spread and commission arithmetic.
//!
//! Rates are percentages, so a spread of `0.5` on an amount of `10000`
//! yields `50`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::order_lifecycle::value_objects::ProductType;

/// Lowest rate used in spread arithmetic.
pub const SPREAD_FLOOR: Decimal = dec!(0.005);

/// Fixed spread for market-linked debentures.
pub const MLD_SPREAD: Decimal = dec!(2);

/// Stateless commission rules.
pub struct SpreadCalculator;

impl SpreadCalculator {
    /// Account spread: `max(cap, floor) - max(rate, floor)`, or the fixed
    /// MLD spread.
    ///
    /// A missing cap reads as zero.
    #[must_use]
    pub fn account_spread(
        product_type: ProductType,
        account_cap: Option<Decimal>,
        return_rate: Decimal,
    ) -> Decimal {
        if product_type == ProductType::Mld {
            return MLD_SPREAD;
        }

        let cap = account_cap.unwrap_or(Decimal::ZERO).max(SPREAD_FLOOR);
        cap - return_rate.max(SPREAD_FLOOR)
    }

    /// Advisor spread: `account_cap - advisor_cap` when the advisor cap is
    /// lower, the floor otherwise.
    #[must_use]
    pub fn advisor_spread(account_cap: Option<Decimal>, advisor_cap: Option<Decimal>) -> Decimal {
        let account = account_cap.unwrap_or(Decimal::ZERO);
        let advisor = advisor_cap.unwrap_or(Decimal::ZERO);

        if advisor < account {
            account - advisor
        } else {
            SPREAD_FLOOR
        }
    }

    /// `user_amount × spread / 100`, or `None` when the product is out of
    /// range.
    #[must_use]
    pub fn commission(user_amount: Decimal, spread: Decimal) -> Option<Decimal> {
        user_amount
            .checked_mul(spread)
            .and_then(|amount| amount.checked_div(dec!(100)))
    }
}
