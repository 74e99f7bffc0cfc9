use rust_decimal::{Decimal, RoundingStrategy};

/// Per-seat price: session base price x seat multiplier, rounded to currency
/// precision (2 decimal places, half-up). The result is snapshotted into
/// `booking_seats` at reservation time; later catalog edits never reprice an
/// existing booking.
pub fn seat_price(base_price: Decimal, multiplier: Decimal) -> Decimal {
    (base_price * multiplier).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(mantissa: i64, scale: u32) -> Decimal {
        Decimal::new(mantissa, scale)
    }

    #[test]
    fn base_times_multiplier() {
        // 10.00 x 1.50 = 15.00 (two such seats make the 30.00 scenario total)
        assert_eq!(seat_price(dec(1000, 2), dec(150, 2)), dec(1500, 2));
        assert_eq!(seat_price(dec(1000, 2), dec(100, 2)), dec(1000, 2));
    }

    #[test]
    fn rounds_half_up_to_two_decimals() {
        // 8.34 x 1.25 = 10.425 -> 10.43
        assert_eq!(seat_price(dec(834, 2), dec(125, 2)), dec(1043, 2));
        // 10.01 x 1.25 = 12.5125 -> 12.51
        assert_eq!(seat_price(dec(1001, 2), dec(125, 2)), dec(1251, 2));
        // 9.99 x 1.15 = 11.4885 -> 11.49
        assert_eq!(seat_price(dec(999, 2), dec(115, 2)), dec(1149, 2));
    }

    proptest! {
        #[test]
        fn price_has_currency_scale_and_sign(
            base_cents in 0i64..1_000_000,
            mult_hundredths in 50i64..=300,
        ) {
            let price = seat_price(dec(base_cents, 2), dec(mult_hundredths, 2));
            prop_assert!(price.scale() <= 2, "scale {} for {}", price.scale(), price);
            prop_assert!(price >= Decimal::ZERO);
        }

        #[test]
        fn unit_multiplier_is_identity(base_cents in 0i64..1_000_000) {
            let base = dec(base_cents, 2);
            prop_assert_eq!(seat_price(base, Decimal::ONE), base);
        }
    }
}
