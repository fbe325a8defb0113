use crate::error::{ExporterError, Result};

/// Number of base units per whole token (18 decimals)
pub const BASE_UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Decode a JSON-RPC hex quantity. Empty strings and a bare `0x` decode to zero.
pub fn hex_to_u128(value: &str) -> Result<u128> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if digits.is_empty() {
        return Ok(0);
    }

    u128::from_str_radix(digits, 16).map_err(|e| ExporterError::InvalidHex {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Convert base units to a decimal token amount.
///
/// Integer and fractional parts are converted separately so large balances
/// keep their precision.
pub fn base_units_to_amount(units: u128) -> f64 {
    let whole = units / BASE_UNITS_PER_TOKEN;
    let fraction = units % BASE_UNITS_PER_TOKEN;
    whole as f64 + fraction as f64 / BASE_UNITS_PER_TOKEN as f64
}

/// Left-pad an address to a 32-byte ABI word, without the `0x` prefix
pub fn abi_encode_address(address: &str) -> String {
    let bare = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address)
        .to_lowercase();
    format!("{:0>64}", bare)
}

/// Truncate a string to at most `max_len` characters
pub fn truncate_string(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Escape a label value for the text exposition format
pub fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_zero_forms() {
        assert_eq!(hex_to_u128("0x0").unwrap(), 0);
        assert_eq!(hex_to_u128("0x").unwrap(), 0);
        assert_eq!(hex_to_u128("").unwrap(), 0);
    }

    #[test]
    fn test_hex_one_token() {
        let units = hex_to_u128("0xde0b6b3a7640000").unwrap();
        assert_eq!(units, BASE_UNITS_PER_TOKEN);
        assert_eq!(base_units_to_amount(units), 1.0);
    }

    #[test]
    fn test_hex_padded_abi_word() {
        let word = format!("0x{:0>64}", "1bc16d674ec80000");
        assert_eq!(base_units_to_amount(hex_to_u128(&word).unwrap()), 2.0);
    }

    #[test]
    fn test_hex_invalid() {
        assert!(matches!(
            hex_to_u128("0xzz"),
            Err(ExporterError::InvalidHex { .. })
        ));
    }

    #[test]
    fn test_base_units_fraction() {
        assert_eq!(base_units_to_amount(1_500_000_000_000_000_000), 1.5);
        assert_eq!(base_units_to_amount(0), 0.0);
    }

    #[test]
    fn test_abi_encode_address() {
        let word = abi_encode_address("0xAbCd");
        assert_eq!(word.len(), 64);
        assert!(word.ends_with("abcd"));
        assert!(word.starts_with("0000"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdef", 3), "abc...");
    }

    #[test]
    fn test_escape_label_value() {
        assert_eq!(escape_label_value(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_label_value("line\nbreak"), "line\\nbreak");
    }
}
