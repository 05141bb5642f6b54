//! Fixed-point money codec.
//!
//! Every amount inside the engine is an `i64` count of the currency's minor
//! unit (cents for USD, yen for JPY). Decimal text coming from the user is
//! converted exactly, digit by digit, and minor units are printed back with
//! integer division only, so a value survives decode → encode without drift.
//!
//! Rounding policy: ties round toward positive infinity (`2.5 → 3`,
//! `-2.5 → -2`). The same rule is used for escalation, compounding and
//! averages so that every rounded figure in a report agrees.

use rustc_hash::FxHashMap;

/// Precision used for currency codes missing from the table.
pub const DEFAULT_DECIMALS: u8 = 2;

/// Per-currency decimal precision.
#[derive(Debug, Clone)]
pub struct CurrencyTable {
    decimals: FxHashMap<String, u8>,
}

impl Default for CurrencyTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for code in ["HKD", "EUR", "USD", "GBP"] {
            table.insert(code, 2);
        }
        table.insert("JPY", 0);
        table
    }
}

impl CurrencyTable {
    /// A table with no entries; every lookup falls back to [`DEFAULT_DECIMALS`].
    pub fn empty() -> Self {
        Self {
            decimals: FxHashMap::default(),
        }
    }

    /// Register (or override) the precision of a currency code.
    pub fn insert(&mut self, code: &str, decimals: u8) {
        self.decimals.insert(code.to_ascii_uppercase(), decimals);
    }

    pub fn contains(&self, code: &str) -> bool {
        self.decimals.contains_key(&code.to_ascii_uppercase())
    }

    /// Decimal places for `code`.
    pub fn decimals(&self, code: &str) -> u8 {
        self.decimals
            .get(&code.to_ascii_uppercase())
            .copied()
            .unwrap_or(DEFAULT_DECIMALS)
    }

    /// Known codes, sorted.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.decimals.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

/// Round to the nearest integer, ties toward positive infinity.
#[inline]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Integer division rounded to nearest, ties toward positive infinity.
/// `divisor` must be positive. The quotient is clamped to the `i64` range.
#[inline]
pub fn div_round_half_up(numerator: i128, divisor: i64) -> i64 {
    let divisor = i128::from(divisor);
    let quotient = numerator
        .saturating_mul(2)
        .saturating_add(divisor)
        .div_euclid(2 * divisor);
    quotient.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Convert user-entered decimal text into minor units.
///
/// Plain decimal notation (`"1200"`, `"-3.5"`, `".75"`, `"+12.345"`) is
/// converted exactly; digits beyond the currency precision are rounded.
/// Anything else that still parses as a finite number (e.g. `"1e3"`) goes
/// through floating point. Returns `None` for blank or non-numeric text.
pub fn to_minor(text: &str, decimals: u8) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    parse_exact(text, decimals).or_else(|| {
        let value: f64 = text.parse().ok()?;
        value.is_finite().then(|| to_minor_f64(value, decimals))
    })
}

/// Convert a numeric amount (starting balance, cash floor) into minor units.
/// Non-finite input yields zero.
pub fn to_minor_f64(amount: f64, decimals: u8) -> i64 {
    if !amount.is_finite() {
        return 0;
    }
    round_half_up(amount * 10f64.powi(decimals as i32)) as i64
}

fn parse_exact(text: &str, decimals: u8) -> Option<i64> {
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let scale = 10i64.checked_pow(decimals as u32)?;
    let mut minor: i64 = 0;
    for b in whole.bytes() {
        minor = minor.checked_mul(10)?.checked_add((b - b'0') as i64)?;
    }
    minor = minor.checked_mul(scale)?;

    let mut digits = fraction.bytes();
    let mut place = scale;
    for _ in 0..decimals {
        place /= 10;
        let digit = digits.next().map_or(0, |b| (b - b'0') as i64);
        minor = minor.checked_add(digit * place)?;
    }

    // First dropped digit decides rounding; ties go toward +infinity, so a
    // negative value only rounds away from zero when something follows the 5.
    let mut rest = digits;
    if let Some(first) = rest.next() {
        let first = first - b'0';
        let tail_nonzero = rest.any(|b| b != b'0');
        let round_up_magnitude = if negative {
            first > 5 || (first == 5 && tail_nonzero)
        } else {
            first >= 5
        };
        if round_up_magnitude {
            minor = minor.checked_add(1)?;
        }
    }

    Some(if negative { -minor } else { minor })
}

/// Lossless decimal rendering of a minor-unit amount (`123456, 2 → "1234.56"`).
pub fn minor_to_decimal_string(minor: i64, decimals: u8) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    if decimals == 0 {
        return format!("{sign}{abs}");
    }
    let factor = 10u64.pow(decimals as u32);
    let whole = abs / factor;
    let fraction = abs % factor;
    format!(
        "{sign}{whole}.{fraction:0width$}",
        width = decimals as usize
    )
}
