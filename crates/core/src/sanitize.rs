//! Name and email normalization primitives.
//!
//! Customer names collected over years of checkouts accumulate emoji,
//! punctuation, and mojibake that downstream carriers and invoice printers
//! reject. The sanitize pass keeps ASCII alphanumerics, spaces, and the
//! Portuguese accented letters, then transliterates the accents away.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Accented letters allowed through the name filter before transliteration.
const ACCENTED_LETTERS: &str = "áàâãéèêíìóòôõúùçñÁÀÂÃÉÈÊÍÌÓÒÔÕÚÙÇ";

/// Sanitize a personal name.
///
/// Removes every character outside `[A-Za-z0-9 ]` and the Portuguese
/// accented-letter set, then transliterates the survivors to unaccented ASCII
/// (NFKD decomposition with combining marks dropped).
///
/// ## Examples
///
/// ```
/// use brazilian_customer_core::sanitize::sanitize_name;
///
/// assert_eq!(sanitize_name("José da Silva"), "Jose da Silva");
/// assert_eq!(sanitize_name("Conceição"), "Conceicao");
/// assert_eq!(sanitize_name("Maria ✨ Souza!!"), "Maria  Souza");
/// ```
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || ACCENTED_LETTERS.contains(*c))
        .collect::<String>()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Normalize an email address: trim surrounding whitespace and lowercase.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
