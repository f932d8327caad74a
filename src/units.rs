use alloy::primitives::U256;
use thiserror::Error;

/// Decimals used by the chain's native currency.
pub const NATIVE_DECIMALS: u8 = 18;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("invalid decimal amount: {0:?}")]
    Malformed(String),
    #[error("amount {amount} has more than {decimals} fractional digits")]
    TooPrecise { amount: String, decimals: u8 },
    #[error("amount {0} does not fit in 256 bits")]
    Overflow(String),
}

/// Renders `raw / 10^decimals` exactly as a base-10 string.
///
/// Trailing fractional zeros are dropped, so `1_500_000, 6` becomes `"1.5"` and
/// whole amounts carry no decimal point at all.
pub fn to_decimal_string(raw: U256, decimals: u8) -> String {
    let digits = raw.to_string();
    let scale = decimals as usize;

    let (whole, fraction) = if digits.len() > scale {
        let split = digits.len() - scale;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{digits:0>scale$}"))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole
    } else {
        format!("{whole}.{fraction}")
    }
}

pub fn wei_to_ether(wei: U256) -> String {
    to_decimal_string(wei, NATIVE_DECIMALS)
}

/// Parses a decimal amount back into its raw integer form.
pub fn parse_decimal_string(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let amount = amount.trim();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
        return Err(UnitsError::Malformed(amount.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            amount: amount.to_string(),
            decimals,
        });
    }

    let padded = format!(
        "{whole}{fraction}{}",
        "0".repeat(decimals as usize - fraction.len())
    );
    let digits = padded.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| UnitsError::Overflow(amount.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_ether_amounts() {
        let raw = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(wei_to_ether(raw), "1.5");
        assert_eq!(wei_to_ether(U256::ZERO), "0");
        assert_eq!(wei_to_ether(U256::from(1u8)), "0.000000000000000001");
    }

    #[test]
    fn renders_whole_token_amounts_without_point() {
        assert_eq!(to_decimal_string(U256::from(100_000_000u64), 6), "100");
        assert_eq!(to_decimal_string(U256::from(42u64), 0), "42");
    }

    #[test]
    fn handles_values_beyond_u128() {
        let raw = U256::MAX;
        let rendered = to_decimal_string(raw, 18);
        assert!(rendered.starts_with("115792089237316195423570985008687907853269984665640564039457."));
        assert_eq!(parse_decimal_string(&rendered, 18), Ok(raw));
    }

    #[test]
    fn large_decimals_are_zero_padded() {
        let rendered = to_decimal_string(U256::from(5u8), 255);
        assert_eq!(rendered.len(), "0.".len() + 255);
        assert!(rendered.ends_with('5'));
        assert_eq!(parse_decimal_string(&rendered, 255), Ok(U256::from(5u8)));
    }

    #[test]
    fn round_trips_common_decimals() {
        let samples = [
            U256::ZERO,
            U256::from(1u8),
            U256::from(123_456_789u64),
            U256::from(10u64).pow(U256::from(30u64)) + U256::from(7u8),
        ];
        for decimals in [0u8, 6, 8, 18] {
            for raw in samples {
                let rendered = to_decimal_string(raw, decimals);
                assert_eq!(parse_decimal_string(&rendered, decimals), Ok(raw), "{rendered}");
            }
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse_decimal_string("1.2.3", 18),
            Err(UnitsError::Malformed(_))
        ));
        assert!(matches!(
            parse_decimal_string("0.0000001", 6),
            Err(UnitsError::TooPrecise { .. })
        ));
        assert!(matches!(parse_decimal_string("", 6), Err(UnitsError::Malformed(_))));
    }
}
