//! Escalation of rule amounts
//!
//! A rule with escalation grows by a fixed percentage every `every` months or
//! years counted from its first occurrence.

use jiff::civil::Date;

use crate::model::CompiledRule;
use crate::money::round_half_up;

/// Upper bound on boundaries walked for a single occurrence
pub const MAX_ESCALATION_STEPS: u32 = 10_000;

/// Number of escalation boundaries after the rule's first occurrence that are
/// on or before `date`. Occurrences on or before the first occurrence get 0.
/// The walk stops at [`MAX_ESCALATION_STEPS`].
pub fn count_escalation_steps(rule: &CompiledRule, date: Date) -> u32 {
    let Some(escalation) = rule.escalation else {
        return 0;
    };
    if date <= rule.first_occurrence {
        return 0;
    }
    let advance = |d: Date| {
        escalation
            .unit
            .advance(d, escalation.every, rule.anchor_day, rule.anchor_month)
    };

    let mut steps = 0;
    let mut boundary = advance(rule.first_occurrence);
    while boundary <= date && steps < MAX_ESCALATION_STEPS {
        steps += 1;
        let next = advance(boundary);
        if next <= boundary {
            // Pinned at the calendar edge
            break;
        }
        boundary = next;
    }
    steps
}

/// The rule's signed amount at `date`, `round(base * (1 + p/100)^steps)`.
/// Falls back to the base amount when the growth factor is unusable.
pub fn escalated_amount(rule: &CompiledRule, date: Date) -> i64 {
    let Some(escalation) = rule.escalation else {
        return rule.amount_minor;
    };
    let steps = count_escalation_steps(rule, date);
    if steps == 0 {
        return rule.amount_minor;
    }
    let factor = 1.0 + escalation.percent / 100.0;
    if !factor.is_finite() || factor <= 0.0 {
        return rule.amount_minor;
    }
    let amount = round_half_up(rule.amount_minor as f64 * factor.powi(steps as i32));
    if amount.is_finite() {
        // `as` saturates at the i64 bounds
        amount as i64
    } else {
        rule.amount_minor
    }
}
