//! Binary-coded decimal helpers for the DS3231 time and alarm registers.
//!
//! Each nibble of a register byte holds one decimal digit, so only values
//! 0-99 have a meaningful encoding. Out-of-range inputs produce garbage but
//! never panic.

/// Encodes `value` (0-99) as packed BCD.
///
/// ```
/// assert_eq!(ds3231_rtc::bcd::to_bcd(59), 0x59);
/// ```
#[must_use]
pub const fn to_bcd(value: u8) -> u8 {
    value.wrapping_add(6 * (value / 10))
}

/// Decodes a packed BCD byte into its binary value.
///
/// Any flag bits sharing the byte must be masked off by the caller first.
#[must_use]
pub const fn from_bcd(value: u8) -> u8 {
    // value >= 16 * (value >> 4), so this never underflows
    value - 6 * (value >> 4)
}
