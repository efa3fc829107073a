use rust_decimal::{Decimal, RoundingStrategy};

/// Service line input: unit price snapshot and quantity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceLine {
    pub service_id: i32,
    pub unit_price: Decimal,
    pub quantity: i32,
}

/// Computed money values stored on an order
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub field_price: Decimal,
    /// (service_id, quantity, unit_price, subtotal) per line
    pub lines: Vec<(i32, i32, Decimal, Decimal)>,
    pub services_total: Decimal,
    pub discount_percentage: Decimal,
    pub discount_amount: Decimal,
    pub total_price: Decimal,
}

/// Calculator for order prices
pub struct PriceCalculator;

impl PriceCalculator {
    /// Round a money value to 2 dp, midpoint away from zero
    pub fn round_money(value: Decimal) -> Decimal {
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Hourly price prorated by the booked minutes
    pub fn calculate_field_price(price_per_hour: Decimal, minutes: i64) -> Decimal {
        Self::round_money(price_per_hour * Decimal::from(minutes) / Decimal::from(60))
    }

    /// Subtotal of one service line (quantity * unit price)
    pub fn calculate_subtotal(quantity: i32, unit_price: Decimal) -> Decimal {
        Self::round_money(Decimal::from(quantity) * unit_price)
    }

    /// Discount on the whole subtotal; never more than the subtotal itself
    pub fn calculate_discount(subtotal: Decimal, percentage: Decimal) -> Decimal {
        let percentage = percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        Self::round_money(subtotal * percentage / Decimal::ONE_HUNDRED).min(subtotal)
    }

    /// Full order price: field + services - discount, clamped at zero
    pub fn calculate(
        price_per_hour: Decimal,
        minutes: i64,
        services: &[ServiceLine],
        discount_percentage: Option<Decimal>,
    ) -> PriceBreakdown {
        let field_price = Self::calculate_field_price(price_per_hour, minutes);

        let lines: Vec<(i32, i32, Decimal, Decimal)> = services
            .iter()
            .map(|line| {
                (
                    line.service_id,
                    line.quantity,
                    line.unit_price,
                    Self::calculate_subtotal(line.quantity, line.unit_price),
                )
            })
            .collect();
        let services_total: Decimal = lines.iter().map(|(_, _, _, subtotal)| *subtotal).sum();

        let subtotal = field_price + services_total;
        let discount_percentage = discount_percentage.unwrap_or(Decimal::ZERO);
        let discount_amount = Self::calculate_discount(subtotal, discount_percentage);
        let total_price = (subtotal - discount_amount).max(Decimal::ZERO);

        PriceBreakdown {
            field_price,
            lines,
            services_total,
            discount_percentage,
            discount_amount,
            total_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_field_price_for_ninety_minutes() {
        assert_eq!(PriceCalculator::calculate_field_price(dec!(200000), 90), dec!(300000));
    }

    #[test]
    fn test_field_price_rounds_to_cents() {
        // 100 * 50 / 60 = 83.333...
        assert_eq!(PriceCalculator::calculate_field_price(dec!(100), 50), dec!(83.33));
    }

    #[test]
    fn test_rounding_midpoint_away_from_zero() {
        assert_eq!(PriceCalculator::round_money(dec!(0.125)), dec!(0.13));
        assert_eq!(PriceCalculator::round_money(dec!(2.345)), dec!(2.35));
    }

    #[test]
    fn test_subtotal() {
        assert_eq!(PriceCalculator::calculate_subtotal(3, dec!(15000)), dec!(45000));
    }

    #[test]
    fn test_full_calculation_with_discount() {
        let services = [
            ServiceLine { service_id: 1, unit_price: dec!(10000), quantity: 2 },
            ServiceLine { service_id: 2, unit_price: dec!(50000), quantity: 1 },
        ];
        let breakdown =
            PriceCalculator::calculate(dec!(300000), 60, &services, Some(dec!(10)));

        assert_eq!(breakdown.field_price, dec!(300000));
        assert_eq!(breakdown.services_total, dec!(70000));
        assert_eq!(breakdown.discount_amount, dec!(37000));
        assert_eq!(breakdown.total_price, dec!(333000));
        assert_eq!(breakdown.lines.len(), 2);
        assert_eq!(breakdown.lines[0], (1, 2, dec!(10000), dec!(20000)));
    }

    #[test]
    fn test_no_discount() {
        let breakdown = PriceCalculator::calculate(dec!(120000), 30, &[], None);
        assert_eq!(breakdown.field_price, dec!(60000));
        assert_eq!(breakdown.discount_percentage, Decimal::ZERO);
        assert_eq!(breakdown.discount_amount, Decimal::ZERO);
        assert_eq!(breakdown.total_price, dec!(60000));
    }

    #[test]
    fn test_full_discount_gives_zero_total() {
        let breakdown = PriceCalculator::calculate(dec!(99.99), 60, &[], Some(dec!(100)));
        assert_eq!(breakdown.total_price, Decimal::ZERO);
    }

    #[test]
    fn test_free_field() {
        let breakdown = PriceCalculator::calculate(Decimal::ZERO, 120, &[], Some(dec!(50)));
        assert_eq!(breakdown.total_price, Decimal::ZERO);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn money(cents: u32) -> Decimal {
        Decimal::from(cents) / Decimal::from(100)
    }

    fn arb_lines() -> impl Strategy<Value = Vec<ServiceLine>> {
        prop::collection::vec((1i32..=50, 0u32..=1_000_000u32, 1i32..=20), 0..=6).prop_map(|v| {
            v.into_iter()
                .map(|(service_id, cents, quantity)| ServiceLine {
                    service_id,
                    unit_price: money(cents),
                    quantity,
                })
                .collect()
        })
    }

    proptest! {
        /// total = field + services - discount, and never negative
        #[test]
        fn prop_total_identity(
            hourly_cents in 0u32..=100_000_000u32,
            minutes in 30i64..=24 * 60,
            lines in arb_lines(),
            pct in 0u32..=10_000u32,
        ) {
            let percentage = money(pct);
            let b = PriceCalculator::calculate(money(hourly_cents), minutes, &lines, Some(percentage));
            prop_assert!(b.total_price >= Decimal::ZERO);
            prop_assert_eq!(b.total_price, b.field_price + b.services_total - b.discount_amount);
            prop_assert!(b.discount_amount <= b.field_price + b.services_total);
        }

        #[test]
        fn prop_services_total_is_sum_of_lines(lines in arb_lines()) {
            let b = PriceCalculator::calculate(Decimal::ZERO, 60, &lines, None);
            let expected: Decimal = lines
                .iter()
                .map(|l| PriceCalculator::calculate_subtotal(l.quantity, l.unit_price))
                .sum();
            prop_assert_eq!(b.services_total, expected);
        }

        #[test]
        fn prop_stored_values_have_two_decimals(
            hourly_cents in 0u32..=100_000_000u32,
            minutes in 30i64..=600,
            pct in 0u32..=10_000u32,
        ) {
            let b = PriceCalculator::calculate(money(hourly_cents), minutes, &[], Some(money(pct)));
            prop_assert!(b.field_price.scale() <= 2);
            prop_assert!(b.discount_amount.scale() <= 2);
            prop_assert!(b.total_price.scale() <= 2);
        }

        #[test]
        fn prop_discount_is_monotonic(
            hourly_cents in 0u32..=10_000_000u32,
            low in 0u32..=5_000u32,
            extra in 0u32..=5_000u32,
        ) {
            let a = PriceCalculator::calculate(money(hourly_cents), 60, &[], Some(money(low)));
            let b = PriceCalculator::calculate(money(hourly_cents), 60, &[], Some(money(low + extra)));
            prop_assert!(b.total_price <= a.total_price);
        }
    }
}
