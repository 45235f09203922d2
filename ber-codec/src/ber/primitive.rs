//! Primitive value reader
//!
//! Converts the contents octets of a primitive element into scalar values.
//! Every function receives exactly the contents of one element (the length
//! has already been resolved by the tag header reader).

use ber_core::{BerError, BerResult};

const MAX_BINARY_EXPONENT: i64 = 2200;

/// Decode an INTEGER as a signed value
///
/// INTEGER contents are a big-endian two's complement number of at least
/// one octet.
///
/// # Error Handling
/// Returns error if:
/// - Contents are empty
/// - Value needs more than 8 octets
pub fn get_integer(contents: &[u8]) -> BerResult<i64> {
    if contents.is_empty() {
        return Err(BerError::conversion("Empty integer encoding"));
    }
    if contents.len() > 8 {
        return Err(BerError::Conversion(format!(
            "Integer too large: {} bytes (max 8)",
            contents.len()
        )));
    }

    let mut value: i64 = if contents[0] & 0x80 != 0 { -1 } else { 0 };
    for &byte in contents {
        value = (value << 8) | byte as i64;
    }
    Ok(value)
}

/// Decode an INTEGER as an unsigned value
///
/// A value with the top bit set needs a leading `0x00` octet, so up to
/// 9 octets are accepted when the first one is zero.
///
/// # Error Handling
/// Returns error if the contents are empty, encode a negative number or do
/// not fit 64 bits.
pub fn get_unsigned(contents: &[u8]) -> BerResult<u64> {
    if contents.is_empty() {
        return Err(BerError::conversion("Empty integer encoding"));
    }
    if contents[0] & 0x80 != 0 {
        return Err(BerError::conversion(
            "Negative integer for unsigned target",
        ));
    }

    let digits = if contents.len() == 9 && contents[0] == 0 {
        &contents[1..]
    } else {
        contents
    };
    if digits.len() > 8 {
        return Err(BerError::Conversion(format!(
            "Integer too large: {} bytes (max 8)",
            contents.len()
        )));
    }

    Ok(digits
        .iter()
        .fold(0u64, |value, &byte| (value << 8) | byte as u64))
}

/// Decode a BOOLEAN (one octet, zero is false)
pub fn get_bool(contents: &[u8]) -> BerResult<bool> {
    match contents {
        [byte] => Ok(*byte != 0),
        _ => Err(BerError::Conversion(format!(
            "Boolean must be exactly 1 byte, got {}",
            contents.len()
        ))),
    }
}

/// Decode a REAL
///
/// # Decoding Format
/// - Empty contents: `0.0`
/// - `0x40`/`0x41`/`0x42`/`0x43`: +infinity, -infinity, NaN, -0.0
/// - First octet with bit 8 set: binary encoding
///   ```text
///   Bits: 8 7 6 5 4 3 2 1
///         1 S B B F F E E
///   ```
///   S = sign, BB = base (2, 8, 16), FF = scale factor, EE = exponent
///   format (1, 2 or 3 octets, or a length octet followed by the exponent).
///   The exponent is two's complement, the mantissa N is unsigned and the
///   value is `S * N * 2^F * base^E`.
///
/// Decimal (character) encodings are not supported.
pub fn get_real(contents: &[u8]) -> BerResult<f64> {
    let Some((&first, rest)) = contents.split_first() else {
        return Ok(0.0);
    };

    if first & 0x80 == 0 {
        if first & 0x40 == 0 {
            return Err(BerError::conversion(
                "Decimal REAL encoding is not supported",
            ));
        }
        if !rest.is_empty() {
            return Err(BerError::conversion("Special REAL value must be 1 byte"));
        }
        return match first {
            0x40 => Ok(f64::INFINITY),
            0x41 => Ok(f64::NEG_INFINITY),
            0x42 => Ok(f64::NAN),
            0x43 => Ok(-0.0),
            other => Err(BerError::Conversion(format!(
                "Unknown special REAL value 0x{:02X}",
                other
            ))),
        };
    }

    let negative = first & 0x40 != 0;
    let base_shift: i64 = match (first >> 4) & 0x03 {
        0 => 1,
        1 => 3,
        2 => 4,
        _ => return Err(BerError::conversion("Reserved REAL base")),
    };
    let scale = ((first >> 2) & 0x03) as i64;

    let (exponent_len, rest) = match first & 0x03 {
        3 => match rest.split_first() {
            Some((&len, tail)) => (len as usize, tail),
            None => return Err(BerError::conversion("Missing REAL exponent length")),
        },
        format => (format as usize + 1, rest),
    };
    if exponent_len == 0 || exponent_len > 4 || rest.len() <= exponent_len {
        return Err(BerError::conversion("Invalid REAL exponent or mantissa"));
    }

    let (exponent_octets, mantissa_octets) = rest.split_at(exponent_len);
    let exponent = get_integer(exponent_octets)?;
    let mantissa = get_unsigned_magnitude(mantissa_octets)?;

    // beyond +-MAX_BINARY_EXPONENT every 64-bit mantissa is already inf or 0
    let exponent =
        (exponent * base_shift + scale).clamp(-MAX_BINARY_EXPONENT, MAX_BINARY_EXPONENT);
    let half = (exponent / 2) as i32;
    let other = (exponent - exponent / 2) as i32;
    let magnitude = mantissa as f64 * 2f64.powi(half) * 2f64.powi(other);

    Ok(if negative { -magnitude } else { magnitude })
}

/// Mantissa octets are unsigned and may carry leading zeros
fn get_unsigned_magnitude(octets: &[u8]) -> BerResult<u64> {
    let significant = match octets.iter().position(|&b| b != 0) {
        Some(start) => &octets[start..],
        None => return Ok(0),
    };
    if significant.len() > 8 {
        return Err(BerError::conversion("REAL mantissa too large"));
    }
    Ok(significant
        .iter()
        .fold(0u64, |value, &byte| (value << 8) | byte as u64))
}

/// Decode a UTF8String (or any string stored as UTF-8 octets)
pub fn get_string(contents: &[u8]) -> BerResult<String> {
    String::from_utf8(contents.to_vec())
        .map_err(|e| BerError::Conversion(format!("Invalid UTF-8 string: {}", e)))
}
