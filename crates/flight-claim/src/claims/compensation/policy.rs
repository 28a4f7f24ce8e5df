use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::classifier::{ClaimScenario, DelayBucket, InformedDate, IssueKind, NoticeBucket};
use super::config::CompensationConfig;

/// Machine-readable explanation attached to every verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    DelayOverThreeHours,
    DelayTooShort,
    CancelledShortNotice,
    CancelledReducedNotice,
    CancelledAdequateNotice,
    Overbooked,
    MissedConnectionOverThreeHours,
    MissedConnectionTooShort,
    InformedDateExpired,
    NotAnswered,
}

impl ReasonCode {
    pub fn summary(self) -> &'static str {
        match self {
            ReasonCode::DelayOverThreeHours => "arrival delayed by more than three hours",
            ReasonCode::DelayTooShort => "delay shorter than three hours",
            ReasonCode::CancelledShortNotice => "cancelled with less than seven days notice",
            ReasonCode::CancelledReducedNotice => {
                "cancelled 8-14 days ahead, reduced compensation"
            }
            ReasonCode::CancelledAdequateNotice => "cancelled more than 14 days ahead",
            ReasonCode::Overbooked => "denied boarding due to overbooking",
            ReasonCode::MissedConnectionOverThreeHours => {
                "missed connection with more than three hours delay"
            }
            ReasonCode::MissedConnectionTooShort => {
                "missed connection with less than three hours delay"
            }
            ReasonCode::InformedDateExpired => "claim older than the limitation period",
            ReasonCode::NotAnswered => "assessment incomplete",
        }
    }
}

/// Outcome of the rule table before any amount is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RuleOutcome {
    pub eligible: bool,
    pub reduction_factor: f64,
    pub reason: ReasonCode,
}

impl RuleOutcome {
    fn eligible(reason: ReasonCode) -> Self {
        Self {
            eligible: true,
            reduction_factor: 1.0,
            reason,
        }
    }

    fn ineligible(reason: ReasonCode) -> Self {
        Self {
            eligible: false,
            reduction_factor: 1.0,
            reason,
        }
    }
}

pub(crate) fn decide(
    scenario: &ClaimScenario,
    config: &CompensationConfig,
    today: NaiveDate,
) -> RuleOutcome {
    let outcome = match scenario.issue {
        Some(IssueKind::Delayed) => match scenario.delay {
            Some(DelayBucket::OverThreeHours) => {
                RuleOutcome::eligible(ReasonCode::DelayOverThreeHours)
            }
            Some(_) => RuleOutcome::ineligible(ReasonCode::DelayTooShort),
            None => RuleOutcome::ineligible(ReasonCode::NotAnswered),
        },
        Some(IssueKind::Cancelled) => match scenario.notice {
            Some(NoticeBucket::NoNotice | NoticeBucket::ZeroToSevenDays) => {
                RuleOutcome::eligible(ReasonCode::CancelledShortNotice)
            }
            Some(NoticeBucket::EightToFourteenDays) => RuleOutcome {
                eligible: true,
                reduction_factor: config.cancellation_reduction_factor,
                reason: ReasonCode::CancelledReducedNotice,
            },
            Some(NoticeBucket::OverFourteenDays) => {
                RuleOutcome::ineligible(ReasonCode::CancelledAdequateNotice)
            }
            None => RuleOutcome::ineligible(ReasonCode::NotAnswered),
        },
        Some(IssueKind::Overbooked) => RuleOutcome::eligible(ReasonCode::Overbooked),
        Some(IssueKind::MissedConnection) => match scenario.delay {
            Some(DelayBucket::OverThreeHours) => {
                RuleOutcome::eligible(ReasonCode::MissedConnectionOverThreeHours)
            }
            Some(_) => RuleOutcome::ineligible(ReasonCode::MissedConnectionTooShort),
            None => RuleOutcome::ineligible(ReasonCode::NotAnswered),
        },
        None => RuleOutcome::ineligible(ReasonCode::NotAnswered),
    };

    if outcome.eligible
        && scenario.issue == Some(IssueKind::Cancelled)
        && informed_date_expired(scenario.informed_date, config, today)
    {
        return RuleOutcome::ineligible(ReasonCode::InformedDateExpired);
    }

    outcome
}

fn informed_date_expired(
    informed: Option<InformedDate>,
    config: &CompensationConfig,
    today: NaiveDate,
) -> bool {
    let Some(InformedDate::On(date)) = informed else {
        return false;
    };
    let months = config.informed_date_lookback_years.saturating_mul(12);
    match today.checked_sub_months(Months::new(months)) {
        Some(cutoff) => date < cutoff,
        None => false,
    }
}
