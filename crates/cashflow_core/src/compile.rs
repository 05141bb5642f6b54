//! Rule compilation
//!
//! Turns user-entered [`RawRule`]s into [`CompiledRule`]s for one simulation
//! window. Checks run in a fixed order and the first failure decides the
//! rule's [`RuleStatus`]; an invalid rule is excluded from the run but never
//! aborts it.

use jiff::civil::Date;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::date_math::{add_days, days_in_month, MAX_YEAR, MIN_YEAR};
use crate::error::RuleError;
use crate::model::{
    CategoryRegistry, CompiledRule, Escalation, RawRule, RuleStatus, SimulationWindow,
    UNCATEGORIZED,
};
use crate::money::to_minor;

/// Compiled rules of one pass plus one status per input rule
#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
    pub rules: Vec<CompiledRule>,
    pub status: Vec<RuleStatus>,
}

/// Parse `"D.M"` or `"D.M."` (one or two digits each, surrounding whitespace
/// ignored). The day is only checked against 1..=31 here.
pub fn parse_day_month(text: &str) -> Option<(i8, i8)> {
    let text = text.trim();
    let text = text.strip_suffix('.').unwrap_or(text);
    let (day, month) = text.split_once('.')?;
    let day = parse_short_number(day)?;
    let month = parse_short_number(month)?;
    ((1..=31).contains(&day) && (1..=12).contains(&month)).then_some((day, month))
}

fn parse_short_number(text: &str) -> Option<i8> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_iso_date(text: &str) -> Option<Date> {
    let text = text.trim();
    if !text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        return None;
    }
    let mut parts = text.splitn(3, '-');
    let year: i16 = parts.next()?.parse().ok()?;
    let month: i8 = parts.next()?.parse().ok()?;
    let day: i8 = parts.next()?.parse().ok()?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&(year as i32)) {
        return None;
    }
    Date::new(year, month, day).ok()
}

/// Parse an anchor year, `None` when blank, zero or outside the calendar.
fn parse_year(text: &str) -> Option<i16> {
    let year: i32 = text.trim().parse().ok()?;
    (MIN_YEAR..=MAX_YEAR).contains(&year).then_some(year as i16)
}

/// Trim labels, drop blanks and keep the first spelling of each
/// case-insensitive duplicate, preserving order.
pub fn normalize_labels<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    labels
        .iter()
        .map(|label| label.as_ref().trim())
        .filter(|label| !label.is_empty() && seen.insert(label.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Every distinct label across `rules`, sorted case-insensitively.
pub fn collect_all_labels(rules: &[RawRule]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut labels: Vec<String> = rules
        .iter()
        .flat_map(|rule| normalize_labels(&rule.labels))
        .filter(|label| seen.insert(label.to_lowercase()))
        .collect();
    labels.sort_by_cached_key(|label| label.to_lowercase());
    labels
}

/// The first year in which `day.month` (clamped to the month length) falls on
/// or after `start`.
pub fn infer_year(start: Date, day: i8, month: i8) -> i16 {
    let year = start.year();
    let day = day.min(days_in_month(year, month));
    if jiff::civil::date(year, month, day) >= start {
        year
    } else {
        year.saturating_add(1).min(MAX_YEAR as i16)
    }
}

/// Escalation settings, or `None` when they would not change any amount.
/// Bad input disables escalation rather than invalidating the rule.
fn parse_escalation(rule: &RawRule) -> Option<Escalation> {
    let pct_text = rule.escalation_pct.trim();
    let percent: f64 = if pct_text.is_empty() {
        0.0
    } else {
        pct_text.parse().ok()?
    };
    if !percent.is_finite() || percent == 0.0 || percent <= -100.0 {
        return None;
    }

    let every_text = rule.escalation_every.trim();
    let every: f64 = if every_text.is_empty() {
        1.0
    } else {
        every_text.parse().ok()?
    };
    if !every.is_finite() {
        return None;
    }
    let every = every.trunc().clamp(1.0, u32::MAX as f64) as u32;

    Some(Escalation {
        percent,
        every,
        unit: rule.escalation_unit,
    })
}

/// Compile one raw rule against `window`.
///
/// Returns the rule's status and, when the rule contributes to the window, its
/// compiled form. Category names are interned into `categories`.
pub fn compile_rule(
    source_index: usize,
    rule: &RawRule,
    window: &SimulationWindow,
    decimals: u8,
    categories: &mut CategoryRegistry,
) -> (RuleStatus, Option<CompiledRule>) {
    if rule.is_empty() {
        return (RuleStatus::Empty, None);
    }

    let Some((day, month)) = parse_day_month(&rule.date_str) else {
        return invalid(RuleError::MalformedDayMonth(rule.date_str.clone()));
    };
    let Some(year) = parse_year(&rule.year) else {
        return invalid(RuleError::MissingYear(rule.year.clone()));
    };
    if day > days_in_month(year, month) {
        return invalid(RuleError::DayOutOfRange { day, month, year });
    }

    let amount = to_minor(&rule.amount, decimals).unwrap_or(0);
    if amount == 0 {
        return (RuleStatus::Valid, None);
    }
    let amount_minor = amount.saturating_mul(rule.direction.sign());

    let first_occurrence = jiff::civil::date(year, month, day);
    if first_occurrence >= window.end {
        return (RuleStatus::Valid, None);
    }

    let end_exclusive = if rule.end_date.trim().is_empty() {
        window.end
    } else {
        let Some(end) = parse_iso_date(&rule.end_date) else {
            return invalid(RuleError::MalformedEndDate(rule.end_date.clone()));
        };
        add_days(end, 1).min(window.end)
    };

    let labels = normalize_labels(&rule.labels);
    let rule_categories = if labels.is_empty() {
        vec![categories.intern(UNCATEGORIZED)]
    } else {
        labels.iter().map(|label| categories.intern(label)).collect()
    };

    let compiled = CompiledRule {
        source_index,
        amount_minor,
        first_occurrence,
        anchor_day: day,
        anchor_month: month,
        frequency: rule.frequency,
        effective: rule.effective,
        categories: rule_categories,
        end_exclusive,
        escalation: parse_escalation(rule),
    };
    (RuleStatus::Valid, Some(compiled))
}

fn invalid(error: RuleError) -> (RuleStatus, Option<CompiledRule>) {
    (RuleStatus::Invalid(error), None)
}

/// Compile every rule in order.
pub fn compile_rules(
    rules: &[RawRule],
    window: &SimulationWindow,
    decimals: u8,
    categories: &mut CategoryRegistry,
) -> CompiledRules {
    let mut out = CompiledRules {
        rules: Vec::with_capacity(rules.len()),
        status: Vec::with_capacity(rules.len()),
    };
    for (index, rule) in rules.iter().enumerate() {
        let (status, compiled) = compile_rule(index, rule, window, decimals, categories);
        if let RuleStatus::Invalid(err) = &status {
            debug!(rule = index, error = %err, "Skipping invalid rule");
        }
        out.status.push(status);
        out.rules.extend(compiled);
    }
    out
}
