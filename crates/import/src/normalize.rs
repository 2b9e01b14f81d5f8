use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use conciliador_core::Money;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Integer part may carry `.` thousands separators; `,` introduces the decimals.
re!(re_br_number, r"^\d[\d.]*(?:,\d+)?$");
// Stricter form for hand-typed values: `.` only between 3-digit groups.
re!(re_grouped_number, r"^(?:\d{1,3}(?:\.\d{3})+|\d+)(?:,\d+)?$");

const CURRENCY_PREFIX: &str = "R$";

// Keeps any realistic sum of ledger amounts inside `Decimal`'s range.
const MAX_INTEGER_DIGITS: usize = 15;

/// How a ledger writes its amount column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountFormat {
    /// `3.256,00C` / `3.256,00D`; no letter means a credit.
    #[default]
    SuffixSign,
    /// `-R$ 1.234,56`, `R$ 1.234,56`, `1.234,56`.
    PrefixedCurrency,
    /// Like [`AmountFormat::SuffixSign`] but whitespace-tolerant, and a leading
    /// `-` wins over the trailing letter: `- 850,00 D`.
    ExtendedSuffix,
}

impl AmountFormat {
    /// Parses a raw amount token. `None` marks an unparseable cell; the caller
    /// decides how to report it.
    pub fn parse(self, raw: &str) -> Option<Money> {
        let token = raw.trim().to_uppercase();
        if token.is_empty() || token == "NAN" || !token.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }

        match self {
            AmountFormat::SuffixSign => parse_suffix_sign(&token),
            AmountFormat::PrefixedCurrency => parse_prefixed_currency(&token),
            AmountFormat::ExtendedSuffix => parse_extended_suffix(&token),
        }
    }
}

fn parse_suffix_sign(token: &str) -> Option<Money> {
    let (letter_debit, body) = split_sign_letter(token);
    let body = body.trim_end();

    let (leading_negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    // A leading minus next to a sign letter is ambiguous in this layout.
    if leading_negative && letter_debit.is_some() {
        return None;
    }

    let value = parse_br_number(body)?;
    Some(signed(value, leading_negative || letter_debit == Some(true)))
}

fn parse_extended_suffix(token: &str) -> Option<Money> {
    let (leading_negative, rest) = match token.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, token),
    };
    let (letter_debit, body) = split_sign_letter(rest.trim_end());
    let value = parse_br_number(body.trim())?;

    Some(signed(value, leading_negative || letter_debit == Some(true)))
}

fn parse_prefixed_currency(token: &str) -> Option<Money> {
    let (mut negative, rest) = match token.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, token),
    };
    let rest = rest.strip_prefix(CURRENCY_PREFIX).unwrap_or(rest).trim_start();
    let rest = match rest.strip_prefix('-') {
        Some(_) if negative => return None,
        Some(after) => {
            negative = true;
            after.trim_start()
        }
        None => rest,
    };

    let value = parse_br_number(rest)?;
    Some(signed(value, negative))
}

/// Parses an amount typed by a person, e.g. an opening balance on the command
/// line. Same convention as [`AmountFormat::PrefixedCurrency`], but a `.` that
/// does not separate thousands (`1500.50`) is rejected rather than dropped.
pub fn parse_typed_amount(raw: &str) -> Option<Money> {
    let token = raw.trim().to_uppercase();
    let body = token.trim_start_matches('-').trim_start();
    let body = body.strip_prefix(CURRENCY_PREFIX).unwrap_or(body).trim_start();
    let body = body.trim_start_matches('-').trim_start();
    if !re_grouped_number().is_match(body) {
        return None;
    }
    AmountFormat::PrefixedCurrency.parse(&token)
}

/// Removes a trailing `C`/`D`; `Some(true)` means a debit letter was present.
fn split_sign_letter(token: &str) -> (Option<bool>, &str) {
    if let Some(body) = token.strip_suffix('D') {
        (Some(true), body)
    } else if let Some(body) = token.strip_suffix('C') {
        (Some(false), body)
    } else {
        (None, token)
    }
}

fn signed(value: Money, negative: bool) -> Money {
    if negative && !value.is_zero() {
        -value
    } else {
        value
    }
}

/// Parses an unsigned `1.234,56` body. Dots are only stripped from the
/// integer part; the decimal comma becomes a point.
fn parse_br_number(body: &str) -> Option<Money> {
    if !re_br_number().is_match(body) {
        return None;
    }
    let (int_part, frac_part) = body.split_once(',').unwrap_or((body, ""));
    let int_part = int_part.replace('.', "");
    if int_part.trim_start_matches('0').len() > MAX_INTEGER_DIGITS {
        return None;
    }
    let normalized = if frac_part.is_empty() {
        int_part
    } else {
        format!("{int_part}.{frac_part}")
    };
    Decimal::from_str(&normalized).ok().map(Money::from_decimal)
}

/// Parses a ledger date cell. Spreadsheet exports sometimes append a time
/// component, which is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let token = raw.split_whitespace().next()?;
    ["%d/%m/%y", "%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}
