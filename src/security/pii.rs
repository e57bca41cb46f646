//! PII heuristics for incident descriptions.
//!
//! Screens free text for content that could identify a person or place:
//! - Phone-like digit runs
//! - Street addresses with a house number
//! - Five-digit postal codes
//!
//! Best effort only. Rules run in a fixed order and the first hit wins, so
//! the reported reason is deterministic.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum description length in characters, after trimming.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

lazy_static! {
    /// Six or more phone characters, starting and ending on a digit, `+` or bracket
    static ref PHONE_PATTERN: Regex = Regex::new(
        r"[\d+()][\d\s\-+()]{4,}[\d+()]"
    ).unwrap();

    /// Street suffix followed by a house number
    static ref ADDRESS_PATTERN: Regex = Regex::new(
        r"(?i)(?:straße|strasse|str\.|weg|platz|allee|gasse|street|road|avenue|square|alley|lane)\s*\.?\s*\d+"
    ).unwrap();

    /// Standalone five-digit number
    static ref POSTAL_CODE_PATTERN: Regex = Regex::new(
        r"\b\d{5}\b"
    ).unwrap();
}

/// Why a description was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiReason {
    TooShort,
    PhoneNumber,
    ExactAddress,
    PostalCode,
}

impl PiiReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PiiReason::TooShort => "too_short",
            PiiReason::PhoneNumber => "phone_number",
            PiiReason::ExactAddress => "exact_address",
            PiiReason::PostalCode => "postal_code",
        }
    }

    /// Message shown next to the description field.
    pub fn user_message(&self) -> &'static str {
        match self {
            PiiReason::TooShort => "Bitte mindestens 10 Zeichen eingeben.",
            PiiReason::PhoneNumber => "Bitte keine Telefonnummern angeben.",
            PiiReason::ExactAddress => "Bitte keine genauen Adressen angeben.",
            PiiReason::PostalCode => "Bitte keine Postleitzahlen angeben.",
        }
    }
}

/// Result of screening one description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiCheck {
    pub valid: bool,
    pub reason: Option<PiiReason>,
}

impl PiiCheck {
    pub fn passed() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: PiiReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    pub fn into_result(self) -> Result<(), PiiReason> {
        match self.reason {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

/// Screen a description. Operates on the trimmed text.
pub fn validate_description(text: &str) -> PiiCheck {
    let trimmed = text.trim();

    if trimmed.chars().count() < MIN_DESCRIPTION_CHARS {
        return PiiCheck::rejected(PiiReason::TooShort);
    }
    if PHONE_PATTERN.is_match(trimmed) {
        return PiiCheck::rejected(PiiReason::PhoneNumber);
    }
    if ADDRESS_PATTERN.is_match(trimmed) {
        return PiiCheck::rejected(PiiReason::ExactAddress);
    }
    if POSTAL_CODE_PATTERN.is_match(trimmed) {
        return PiiCheck::rejected(PiiReason::PostalCode);
    }

    PiiCheck::passed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes() {
        assert_eq!(validate_description("Kurzer Text"), PiiCheck::passed());
        assert!(validate_description("Aufkleber an der Bushaltestelle gesehen").valid);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            validate_description("ab"),
            PiiCheck::rejected(PiiReason::TooShort)
        );
        // Padding does not count toward the length
        assert_eq!(
            validate_description("   ab      "),
            PiiCheck::rejected(PiiReason::TooShort)
        );
        // Characters, not bytes
        assert!(validate_description("äöüäöüäöüä").valid);
    }

    #[test]
    fn test_phone_number() {
        assert_eq!(
            validate_description("Ruf mich an unter 0151 2345678").reason,
            Some(PiiReason::PhoneNumber)
        );
        assert_eq!(
            validate_description("Kontakt: +49 (30) 123-45").reason,
            Some(PiiReason::PhoneNumber)
        );
    }

    #[test]
    fn test_exact_address() {
        assert_eq!(
            validate_description("Hauptstraße 12 in der Nähe").reason,
            Some(PiiReason::ExactAddress)
        );
        assert_eq!(
            validate_description("Am Marktplatz 3 gesehen").reason,
            Some(PiiReason::ExactAddress)
        );
        assert_eq!(
            validate_description("Seen near Baker Street 221").reason,
            Some(PiiReason::ExactAddress)
        );
        assert_eq!(
            validate_description("In der Bahnhofstr. 7 passiert").reason,
            Some(PiiReason::ExactAddress)
        );
    }

    #[test]
    fn test_street_without_number_passes() {
        assert!(validate_description("Auf der Hauptstraße beim Bäcker").valid);
    }

    #[test]
    fn test_postal_code() {
        assert_eq!(
            validate_description("Postleitzahl 10115 Berlin").reason,
            Some(PiiReason::PostalCode)
        );
    }

    #[test]
    fn test_rule_order_is_fixed() {
        // Matches both address and postal code; address is checked first
        assert_eq!(
            validate_description("Lindenallee 5 und dann 12345 weiter").reason,
            Some(PiiReason::ExactAddress)
        );
        assert_eq!(
            validate_description("0151234567").reason,
            Some(PiiReason::PhoneNumber)
        );
        // Too short wins over everything else
        assert_eq!(
            validate_description("weg 1").reason,
            Some(PiiReason::TooShort)
        );
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(PiiReason::TooShort.code(), "too_short");
        assert_eq!(PiiReason::PhoneNumber.code(), "phone_number");
        assert_eq!(PiiReason::ExactAddress.code(), "exact_address");
        assert_eq!(PiiReason::PostalCode.code(), "postal_code");
        assert_eq!(
            PiiCheck::rejected(PiiReason::PostalCode).into_result(),
            Err(PiiReason::PostalCode)
        );
    }
}
