//! Built-in string formats.

use std::net::IpAddr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

use crate::rule::IpVersion;

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("valid regex"))
}

pub(crate) fn is_alphanum(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric())
}

pub(crate) fn is_token(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn is_email(s: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    pattern(&EMAIL, r"^[^\s@]+@[^\s@]+\.[^\s@.]+$").is_match(s)
}

/// Returns the scheme of `s` if it looks like an absolute URI.
pub(crate) fn uri_scheme(s: &str) -> Option<&str> {
    static URI: OnceLock<Regex> = OnceLock::new();
    let re = pattern(&URI, r"^([A-Za-z][A-Za-z0-9+.\-]*):[^\s]+$");
    re.captures(s).and_then(|c| c.get(1)).map(|m| m.as_str())
}

pub(crate) fn is_guid(s: &str) -> bool {
    static GUID: OnceLock<Regex> = OnceLock::new();
    pattern(
        &GUID,
        r"^[\[{(]?[0-9A-Fa-f]{8}-?[0-9A-Fa-f]{4}-?[0-9A-Fa-f]{4}-?[0-9A-Fa-f]{4}-?[0-9A-Fa-f]{12}[\]})]?$",
    )
    .is_match(s)
}

pub(crate) fn is_hex(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_hexdigit())
}

pub(crate) fn is_hostname(s: &str) -> bool {
    static HOSTNAME: OnceLock<Regex> = OnceLock::new();
    if s.parse::<IpAddr>().is_ok() {
        return true;
    }
    s.len() <= 255
        && pattern(
            &HOSTNAME,
            r"^([A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9\-]{0,61}[A-Za-z0-9])(\.([A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9\-]{0,61}[A-Za-z0-9]))*$",
        )
        .is_match(s)
}

/// Parses an IP address; `None` if `s` is not one.
pub(crate) fn ip_version(s: &str) -> Option<IpVersion> {
    match s.parse::<IpAddr>().ok()? {
        IpAddr::V4(_) => Some(IpVersion::V4),
        IpAddr::V6(_) => Some(IpVersion::V6),
    }
}

pub(crate) fn is_iso_date(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Luhn check over the digits of `s`.
pub(crate) fn is_credit_card(s: &str) -> bool {
    let digits: Option<Vec<u32>> = s.chars().map(|c| c.to_digit(10)).collect();
    let Some(digits) = digits else {
        return false;
    };
    if digits.len() < 12 || digits.len() > 19 {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}
