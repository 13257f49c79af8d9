//! Brazilian phone number formatting.
//!
//! Mobile numbers are 11 digits (two-digit area code, five-digit prefix,
//! four-digit suffix) and render as `(DD)DDDDD-DDDD`. Legacy records often
//! carry the real mobile number in the fax field, so the pair is repaired
//! together.

use crate::taxid::strip_non_digits;

/// Format an 11-digit number as `(DD)DDDDD-DDDD`.
///
/// The caller guarantees `digits` is exactly 11 ASCII digits.
#[must_use]
fn format_br_phone(digits: &str) -> String {
    format!("({}){}-{}", &digits[0..2], &digits[2..7], &digits[7..11])
}

/// Normalize a phone/fax pair, repairing swapped fields.
///
/// Both inputs are stripped to digits first. Two fixups then run in sequence,
/// each keyed on the *stripped* input lengths:
///
/// 1. If the phone is not 11 digits but the fax is, the fax was holding the
///    real phone number: it becomes the (formatted) phone, and the stripped
///    phone digits move to the fax field unformatted.
/// 2. If the stripped phone was 11 digits, it is formatted in place.
///
/// The two steps are deliberately sequential mutations, not an if/else;
/// anything that never qualified passes through as bare digits.
#[must_use]
pub fn format_phone_pair(raw_phone: &str, raw_fax: &str) -> (String, String) {
    let phone_digits = strip_non_digits(raw_phone);
    let fax_digits = strip_non_digits(raw_fax);

    let mut phone = phone_digits.clone();
    let mut fax = fax_digits.clone();

    if phone_digits.len() != 11 && fax_digits.len() == 11 {
        phone = format_br_phone(&fax_digits);
        fax = phone_digits.clone();
    }

    if phone_digits.len() == 11 {
        phone = format_br_phone(&phone_digits);
    }

    (phone, fax)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_eleven_digit_phone() {
        let (phone, fax) = format_phone_pair("11987654321", "");
        assert_eq!(phone, "(11)98765-4321");
        assert_eq!(fax, "");
    }

    #[test]
    fn test_strips_punctuation_before_formatting() {
        let (phone, _) = format_phone_pair("(11) 98765-4321", "");
        assert_eq!(phone, "(11)98765-4321");
    }

    #[test]
    fn test_swaps_eleven_digit_fax_into_phone() {
        let (phone, fax) = format_phone_pair("1234", "11987654321");
        assert_eq!(phone, "(11)98765-4321");
        assert_eq!(fax, "1234");
    }

    #[test]
    fn test_swap_keeps_stripped_phone_digits_in_fax() {
        let (phone, fax) = format_phone_pair("(12) 34", "11 98765 4321");
        assert_eq!(phone, "(11)98765-4321");
        assert_eq!(fax, "1234");
    }

    #[test]
    fn test_both_eleven_digits_formats_phone_only() {
        let (phone, fax) = format_phone_pair("11987654321", "21912345678");
        assert_eq!(phone, "(11)98765-4321");
        assert_eq!(fax, "21912345678");
    }

    #[test]
    fn test_neither_qualifies_passes_digits_through() {
        let (phone, fax) = format_phone_pair("123-456", "78.90");
        assert_eq!(phone, "123456");
        assert_eq!(fax, "7890");
    }

    #[test]
    fn test_empty_inputs() {
        let (phone, fax) = format_phone_pair("", "");
        assert_eq!(phone, "");
        assert_eq!(fax, "");
    }
}
