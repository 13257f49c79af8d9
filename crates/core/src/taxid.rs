//! CPF/CNPJ validation and canonical formatting.
//!
//! Brazilian taxpayer identifiers come in two shapes: CPF (11 digits,
//! individuals) and CNPJ (14 digits, companies). Both end in two check digits
//! computed with mod-11 weighted sums. [`TaxId::parse`] accepts any punctuated
//! or bare input, strips it to digits, and only yields a value when the check
//! digits hold.

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors that can occur when parsing a [`TaxId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxIdError {
    /// The digit count matches neither CPF (11) nor CNPJ (14).
    #[error("tax id must have 11 or 14 digits, found {found}")]
    InvalidLength {
        /// Number of digits found after stripping.
        found: usize,
    },
    /// All digits are identical (the canonical invalid sequences).
    #[error("tax id with repeated digits is invalid")]
    RepeatedDigits,
    /// The trailing check digits do not match the computed ones.
    #[error("tax id check digits do not match")]
    InvalidCheckDigits,
}

/// Which register a tax id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxIdKind {
    /// Cadastro de Pessoa Física, 11 digits.
    Cpf,
    /// Cadastro Nacional da Pessoa Jurídica, 14 digits.
    Cnpj,
}

/// A validated CPF or CNPJ.
///
/// Holds exactly the digit string that passed check-digit validation, so
/// [`TaxId::formatted`] can never silently truncate or pad.
///
/// ## Examples
///
/// ```
/// use brazilian_customer_core::taxid::{TaxId, TaxIdKind};
///
/// let cpf = TaxId::parse("111.444.777-35").unwrap();
/// assert_eq!(cpf.kind(), TaxIdKind::Cpf);
/// assert_eq!(cpf.formatted(), "111.444.777-35");
///
/// let cnpj = TaxId::parse("11222333000181").unwrap();
/// assert_eq!(cnpj.formatted(), "11.222.333/0001-81");
///
/// assert!(TaxId::parse("11111111111").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxId {
    digits: String,
    kind: TaxIdKind,
}

impl TaxId {
    /// Parse a `TaxId` from raw input, stripping any non-digit characters.
    ///
    /// # Errors
    ///
    /// Returns an error if the stripped input:
    /// - Has neither 11 nor 14 digits
    /// - Consists of one repeated digit
    /// - Fails check-digit validation
    pub fn parse(raw: &str) -> Result<Self, TaxIdError> {
        let digits = strip_non_digits(raw);

        let kind = match digits.len() {
            11 => TaxIdKind::Cpf,
            14 => TaxIdKind::Cnpj,
            found => {
                debug!(input = raw, digits_found = found, "Invalid tax id length");
                return Err(TaxIdError::InvalidLength { found });
            }
        };

        if is_repeated(&digits) {
            debug!(input = raw, "Tax id with repeated digits");
            return Err(TaxIdError::RepeatedDigits);
        }

        let valid = match kind {
            TaxIdKind::Cpf => validate_cpf(&digits),
            TaxIdKind::Cnpj => validate_cnpj(&digits),
        };

        if !valid {
            debug!(input = raw, "Tax id check digits do not match");
            return Err(TaxIdError::InvalidCheckDigits);
        }

        Ok(Self { digits, kind })
    }

    /// Which register this id belongs to.
    #[must_use]
    pub const fn kind(&self) -> TaxIdKind {
        self.kind
    }

    /// The validated digit string.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Render the canonical display string.
    ///
    /// CPF: `DDD.DDD.DDD-DD`. CNPJ: `DD.DDD.DDD/DDDD-DD`.
    #[must_use]
    pub fn formatted(&self) -> String {
        let d = &self.digits;
        match self.kind {
            TaxIdKind::Cpf => {
                format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
            }
            TaxIdKind::Cnpj => {
                format!(
                    "{}.{}.{}/{}-{}",
                    &d[0..2],
                    &d[2..5],
                    &d[5..8],
                    &d[8..12],
                    &d[12..14]
                )
            }
        }
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

impl std::str::FromStr for TaxId {
    type Err = TaxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Keep only ASCII digits from the input.
#[must_use]
pub fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Validate an 11-digit CPF string (digits only, no punctuation).
///
/// Returns `false` for any input that is not exactly 11 digits, for the ten
/// repeated-digit sequences, and whenever the two trailing check digits do not
/// match the weighted mod-11 computation.
#[must_use]
pub fn validate_cpf(cpf: &str) -> bool {
    let Some(digits) = to_digits(cpf, 11) else {
        return false;
    };

    if is_repeated(cpf) {
        return false;
    }

    // First check digit: digits[0..9] weighted 10 down to 2.
    let sum: u32 = digits[0..9]
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (10 - i as u32))
        .sum();
    if check_digit_cpf(sum) != digits[9] {
        return false;
    }

    // Second check digit: digits[0..10] weighted 11 down to 2.
    let sum: u32 = digits[0..10]
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (11 - i as u32))
        .sum();
    check_digit_cpf(sum) == digits[10]
}

/// Validate a 14-digit CNPJ string (digits only, no punctuation).
///
/// Returns `false` for any input that is not exactly 14 digits, for the ten
/// repeated-digit sequences, and whenever the two trailing check digits do not
/// match the cyclic-weight mod-11 computation.
#[must_use]
pub fn validate_cnpj(cnpj: &str) -> bool {
    let Some(digits) = to_digits(cnpj, 14) else {
        return false;
    };

    if is_repeated(cnpj) {
        return false;
    }

    // Weights cycle 9..2 from the rightmost position; spelled out they are:
    const WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    const WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    let sum: u32 = digits[0..12]
        .iter()
        .zip(WEIGHTS_FIRST.iter())
        .map(|(d, w)| d * w)
        .sum();
    if check_digit_cnpj(sum) != digits[12] {
        return false;
    }

    let sum: u32 = digits[0..13]
        .iter()
        .zip(WEIGHTS_SECOND.iter())
        .map(|(d, w)| d * w)
        .sum();
    check_digit_cnpj(sum) == digits[13]
}

/// Validate a raw tax id value of unknown shape.
///
/// Strips non-digit characters and dispatches purely on the resulting length:
/// 11 digits are checked as CPF, 14 as CNPJ, anything else is invalid.
#[must_use]
pub fn validate_tax_id(raw: &str) -> bool {
    TaxId::parse(raw).is_ok()
}

fn to_digits(s: &str, expected_len: usize) -> Option<Vec<u32>> {
    if s.len() != expected_len {
        return None;
    }
    s.chars().map(|c| c.to_digit(10)).collect()
}

fn is_repeated(digits: &str) -> bool {
    let mut chars = digits.chars();
    chars
        .next()
        .is_some_and(|first| chars.all(|c| c == first))
}

/// CPF check digit: `11 - sum % 11`, clamped to 0 when 10 or 11.
const fn check_digit_cpf(sum: u32) -> u32 {
    let rev = 11 - sum % 11;
    if rev >= 10 { 0 } else { rev }
}

/// CNPJ check digit: 0 when `sum % 11 < 2`, otherwise `11 - sum % 11`.
const fn check_digit_cnpj(sum: u32) -> u32 {
    let rem = sum % 11;
    if rem < 2 { 0 } else { 11 - rem }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cpf_known_valid() {
        assert!(validate_cpf("11144477735"));
    }

    #[test]
    fn test_validate_cpf_rejects_repeated_digits() {
        for d in 0..=9 {
            let cpf: String = std::iter::repeat_n(char::from_digit(d, 10).unwrap(), 11).collect();
            assert!(!validate_cpf(&cpf), "{cpf} should be invalid");
        }
    }

    #[test]
    fn test_validate_cpf_rejects_wrong_check_digits() {
        assert!(!validate_cpf("11144477734"));
        assert!(!validate_cpf("11144477725"));
    }

    #[test]
    fn test_validate_cpf_rejects_wrong_length() {
        assert!(!validate_cpf("1114447773"));
        assert!(!validate_cpf("111444777350"));
        assert!(!validate_cpf(""));
    }

    #[test]
    fn test_validate_cpf_rejects_non_digits() {
        assert!(!validate_cpf("111.444.777"));
        assert!(!validate_cpf("1114447773a"));
    }

    #[test]
    fn test_validate_cnpj_known_valid() {
        assert!(validate_cnpj("11222333000181"));
    }

    #[test]
    fn test_validate_cnpj_rejects_repeated_digits() {
        for d in 0..=9 {
            let cnpj: String = std::iter::repeat_n(char::from_digit(d, 10).unwrap(), 14).collect();
            assert!(!validate_cnpj(&cnpj), "{cnpj} should be invalid");
        }
    }

    #[test]
    fn test_validate_cnpj_rejects_wrong_check_digits() {
        assert!(!validate_cnpj("11222333000180"));
        assert!(!validate_cnpj("11222333000171"));
    }

    #[test]
    fn test_validate_cnpj_rejects_wrong_length() {
        assert!(!validate_cnpj("1122233300018"));
        assert!(!validate_cnpj("112223330001810"));
    }

    #[test]
    fn test_validate_tax_id_dispatches_on_stripped_length() {
        // 11 digits with separators -> CPF rule
        assert!(validate_tax_id("111.444.777-35"));
        // 14 digits with separators -> CNPJ rule
        assert!(validate_tax_id("11.222.333/0001-81"));
        // Any other length -> false
        assert!(!validate_tax_id("123456"));
        assert!(!validate_tax_id("111.444.777-3"));
        assert!(!validate_tax_id(""));
    }

    #[test]
    fn test_parse_reports_length() {
        assert_eq!(
            TaxId::parse("12345"),
            Err(TaxIdError::InvalidLength { found: 5 })
        );
    }

    #[test]
    fn test_parse_reports_repeated_digits() {
        assert_eq!(
            TaxId::parse("111.111.111-11"),
            Err(TaxIdError::RepeatedDigits)
        );
    }

    #[test]
    fn test_parse_reports_check_digit_mismatch() {
        assert_eq!(
            TaxId::parse("111.444.777-36"),
            Err(TaxIdError::InvalidCheckDigits)
        );
    }

    #[test]
    fn test_format_cpf() {
        let cpf = TaxId::parse("11144477735").unwrap();
        assert_eq!(cpf.kind(), TaxIdKind::Cpf);
        assert_eq!(cpf.formatted(), "111.444.777-35");
    }

    #[test]
    fn test_format_cnpj() {
        let cnpj = TaxId::parse("11222333000181").unwrap();
        assert_eq!(cnpj.kind(), TaxIdKind::Cnpj);
        assert_eq!(cnpj.formatted(), "11.222.333/0001-81");
    }

    #[test]
    fn test_format_round_trips_to_validated_digits() {
        for raw in ["11144477735", "11222333000181"] {
            let id = TaxId::parse(raw).unwrap();
            assert_eq!(strip_non_digits(&id.formatted()), raw);
        }
    }

    #[test]
    fn test_from_str() {
        let id: TaxId = "111.444.777-35".parse().unwrap();
        assert_eq!(id.digits(), "11144477735");
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = TaxId::parse("11144477735").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: TaxId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
