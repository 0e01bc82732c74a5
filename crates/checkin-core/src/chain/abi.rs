//! Calldata for the check-in contract.
//!
//! ```text
//! function checkIn() external
//! function getUser(address) view returns (uint256,uint256,uint256)
//! ```

use crate::error::AbiError;
use crate::record::CheckInRecord;

/// `keccak256("checkIn()")[..4]`
pub const CHECK_IN_SELECTOR: [u8; 4] = [0x18, 0x3f, 0xf0, 0x85];
/// `keccak256("getUser(address)")[..4]`
pub const GET_USER_SELECTOR: [u8; 4] = [0x6f, 0x77, 0x92, 0x6b];
/// `keccak256("Error(string)")[..4]`
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

const WORD: usize = 32;

/// Parse a `0x`-prefixed 20-byte hex address.
pub fn parse_address(address: &str) -> Result<[u8; 20], AbiError> {
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| AbiError::InvalidAddress(address.to_string()))?;
    let mut out = [0u8; 20];
    hex::decode_to_slice(digits, &mut out)
        .map_err(|_| AbiError::InvalidAddress(address.to_string()))?;
    Ok(out)
}

/// Lowercase `0x` form of an address.
pub fn normalize_address(address: &str) -> Result<String, AbiError> {
    Ok(format!("0x{}", hex::encode(parse_address(address)?)))
}

/// Decode `0x`-prefixed hex data. `"0x"` is empty data.
pub fn decode_hex(data: &str) -> Result<Vec<u8>, AbiError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(digits).map_err(|e| AbiError::InvalidHex(e.to_string()))
}

pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a JSON-RPC quantity such as `"0x2105"`.
pub fn parse_quantity(quantity: &str) -> Result<u64, AbiError> {
    let digits = quantity
        .strip_prefix("0x")
        .ok_or_else(|| AbiError::InvalidHex(quantity.to_string()))?;
    u64::from_str_radix(digits, 16).map_err(|e| AbiError::InvalidHex(e.to_string()))
}

pub fn encode_quantity(value: u64) -> String {
    format!("0x{value:x}")
}

pub fn encode_check_in() -> String {
    encode_hex(&CHECK_IN_SELECTOR)
}

pub fn encode_get_user(address: &str) -> Result<String, AbiError> {
    let address = parse_address(address)?;
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&GET_USER_SELECTOR);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&address);
    Ok(encode_hex(&data))
}

/// Decode the `(lastCheckIn, streak, points)` tuple returned by `getUser`.
pub fn decode_user(data: &[u8]) -> Result<CheckInRecord, AbiError> {
    if data.len() < 3 * WORD {
        return Err(AbiError::TooShort {
            expected: 3 * WORD,
            actual: data.len(),
        });
    }
    Ok(CheckInRecord {
        last_check_in: word_to_u64(&data[..WORD], "lastCheckIn")?,
        streak: word_to_u64(&data[WORD..2 * WORD], "streak")?,
        points: word_to_u64(&data[2 * WORD..3 * WORD], "points")?,
    })
}

/// Extract the message from `Error(string)` revert data.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let body = data.strip_prefix(&ERROR_STRING_SELECTOR[..])?;
    let offset = usize::try_from(word_to_u64(body.get(..WORD)?, "offset").ok()?).ok()?;
    let len_word = body.get(offset..offset.checked_add(WORD)?)?;
    let len = usize::try_from(word_to_u64(len_word, "length").ok()?).ok()?;
    let start = offset + WORD;
    let bytes = body.get(start..start.checked_add(len)?)?;
    String::from_utf8(bytes.to_vec()).ok()
}

fn word_to_u64(word: &[u8], field: &'static str) -> Result<u64, AbiError> {
    let (high, low) = word.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow { field });
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    Ok(u64::from_be_bytes(buf))
}
