//! Type-specific validators applied to pattern-rule matches

use chrono::{Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // The loose pattern in the rule table finds candidates; this
    // anchored pattern confirms them.
    static ref STRICT_EMAIL: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid regex");
}

/// Date layouts attempted in order; the first that parses wins.
const DOB_FORMATS: [&str; 9] = [
    "%Y-%m-%d", // ISO
    "%m/%d/%Y", // US
    "%d/%m/%Y", // EU
    "%Y.%m.%d",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%Y%m%d",   // compact
    "%d %B %Y", // 15 May 1990
    "%B %d %Y",
];

fn strip_non_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn validate_email(email: &str) -> bool {
    STRICT_EMAIL.is_match(email.trim())
}

/// Typical phone numbers carry 10 to 15 digits
pub fn validate_phone(phone: &str) -> bool {
    let digits = strip_non_digits(phone);
    (10..=15).contains(&digits.len())
}

/// Accepts iff 13-19 digits and the Luhn checksum is 0 mod 10
pub fn validate_credit_card(card_number: &str) -> bool {
    let digits = strip_non_digits(card_number);
    (13..=19).contains(&digits.len()) && luhn_valid(&digits)
}

pub fn luhn_valid(digits: &str) -> bool {
    let mut total = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let mut n = match c.to_digit(10) {
            Some(d) => d,
            None => return false,
        };
        if i % 2 == 1 {
            n *= 2;
            if n > 9 {
                n -= 9;
            }
        }
        total += n;
    }
    total % 10 == 0
}

/// Accepts iff some supported layout parses, the year is at least 1900,
/// and the date is not in the future.
pub fn validate_dob(date_str: &str) -> bool {
    for fmt in DOB_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, fmt) {
            return date.year() >= 1900 && date <= Utc::now().date_naive();
        }
    }
    false
}
