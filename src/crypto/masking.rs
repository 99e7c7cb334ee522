//! Display masks for decrypted values
//!
//! A mask keeps just enough of a value for the owner to recognise it
//! (usually the last four digits) and hides the rest.

use serde::{Deserialize, Serialize};
use std::fmt;

const MASK_CHAR: char = '•';
const FULL_MASK: &str = "••••••••";

/// How a sensitive value is rendered when it has not been revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskType {
    /// `***-**-1234`
    Ssn,
    /// `**-***1234`
    TaxId,
    /// `****1234`
    BankAccount,
    /// Every character but the last four replaced
    LastFour,
    /// `(***) ***-1234`
    Phone,
    /// `j***@example.com`
    Email,
    /// `**/**/1990`
    Date,
    /// Nothing shown
    Full,
}

impl fmt::Display for MaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MaskType::Ssn => "ssn",
            MaskType::TaxId => "tax_id",
            MaskType::BankAccount => "bank_account",
            MaskType::LastFour => "last_four",
            MaskType::Phone => "phone",
            MaskType::Email => "email",
            MaskType::Date => "date",
            MaskType::Full => "full",
        };
        write!(f, "{}", name)
    }
}

/// Mask a plaintext value for display
pub fn mask(value: &str, mask_type: MaskType) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }

    match mask_type {
        MaskType::Ssn => digit_mask(value, "***-**-"),
        MaskType::TaxId => digit_mask(value, "**-***"),
        MaskType::BankAccount => digit_mask(value, "****"),
        MaskType::Phone => digit_mask(value, "(***) ***-"),
        MaskType::LastFour => mask_last_four(value),
        MaskType::Email => mask_email(value),
        MaskType::Date => mask_date(value),
        MaskType::Full => FULL_MASK.to_string(),
    }
}

/// Mask a JSON scalar; non-string scalars are masked by their text form
pub fn mask_json(value: &serde_json::Value, mask_type: MaskType) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => mask(s, mask_type),
        other => mask(&other.to_string(), mask_type),
    }
}

fn last_digits(value: &str, count: usize) -> Option<String> {
    let digits: Vec<char> = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < count {
        return None;
    }
    Some(digits[digits.len() - count..].iter().collect())
}

fn digit_mask(value: &str, prefix: &str) -> String {
    match last_digits(value, 4) {
        Some(tail) => format!("{}{}", prefix, tail),
        None => FULL_MASK.to_string(),
    }
}

fn mask_last_four(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return FULL_MASK.to_string();
    }

    let hidden = chars.len() - 4;
    let mut masked: String = std::iter::repeat(MASK_CHAR).take(hidden).collect();
    masked.extend(&chars[hidden..]);
    masked
}

fn mask_email(value: &str) -> String {
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            let first = local.chars().next().unwrap_or(MASK_CHAR);
            format!("{}***@{}", first, domain)
        }
        _ => FULL_MASK.to_string(),
    }
}

fn mask_date(value: &str) -> String {
    let year = if let Some((year, _)) = value.split_once('-') {
        year
    } else {
        value.rsplit('/').next().unwrap_or_default()
    };

    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        format!("**/**/{}", year)
    } else {
        FULL_MASK.to_string()
    }
}
