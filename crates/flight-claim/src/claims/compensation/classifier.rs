use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::claims::domain::WizardAnswer;

pub const ISSUE_QUESTION_IDS: [&str; 2] = ["what_happened", "issue_type"];
pub const DELAY_QUESTION_ID: &str = "delay_duration";
pub const NOTICE_QUESTION_ID: &str = "cancellation_notice";
pub const INFORMED_DATE_QUESTION_ID: &str = "informed_date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Delayed,
    Cancelled,
    Overbooked,
    MissedConnection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayBucket {
    UnderTwoHours,
    TwoToThreeHours,
    OverThreeHours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeBucket {
    NoNotice,
    ZeroToSevenDays,
    EightToFourteenDays,
    OverFourteenDays,
}

/// When the passenger learned about the cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "date", rename_all = "snake_case")]
pub enum InformedDate {
    OnDepartureDay,
    On(NaiveDate),
}

/// Normalized view of what happened to the flight.
///
/// `None` marks an unanswered (or unrecognized) question. Buckets that do not
/// belong to the active issue kind are carried but ignored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClaimScenario {
    pub issue: Option<IssueKind>,
    pub delay: Option<DelayBucket>,
    pub notice: Option<NoticeBucket>,
    pub informed_date: Option<InformedDate>,
}

/// Derive a scenario from raw wizard answers. The last answer for a question wins.
pub fn classify(answers: &[WizardAnswer]) -> ClaimScenario {
    ClaimScenario {
        issue: last_value(answers, &ISSUE_QUESTION_IDS).and_then(parse_issue),
        delay: last_value(answers, &[DELAY_QUESTION_ID]).and_then(parse_delay),
        notice: last_value(answers, &[NOTICE_QUESTION_ID]).and_then(parse_notice),
        informed_date: last_value(answers, &[INFORMED_DATE_QUESTION_ID])
            .and_then(parse_informed_date),
    }
}

fn last_value<'a>(answers: &'a [WizardAnswer], ids: &[&str]) -> Option<&'a str> {
    answers
        .iter()
        .rev()
        .find(|answer| {
            let id = answer.question_id.trim();
            ids.iter().any(|candidate| id.eq_ignore_ascii_case(candidate))
        })
        .map(|answer| answer.value.as_str())
}

fn normalize(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .replace(['-', ' '], "_")
}

fn parse_issue(value: &str) -> Option<IssueKind> {
    match normalize(value).as_str() {
        "delayed" | "delay" | "flight_delayed" => Some(IssueKind::Delayed),
        "cancelled" | "canceled" | "cancellation" | "flight_cancelled" => {
            Some(IssueKind::Cancelled)
        }
        "overbooked" | "overbooking" | "denied_boarding" => Some(IssueKind::Overbooked),
        "missed_connection" | "connection_missed" => Some(IssueKind::MissedConnection),
        _ => None,
    }
}

fn parse_delay(value: &str) -> Option<DelayBucket> {
    match normalize(value).as_str() {
        "less_than_2" | "under_2" | "less_than_2_hours" => Some(DelayBucket::UnderTwoHours),
        "2_to_3" | "between_2_and_3" | "2_3" | "2_to_3_hours" => {
            Some(DelayBucket::TwoToThreeHours)
        }
        "more_than_3" | "over_3" | "more_than_3_hours" => Some(DelayBucket::OverThreeHours),
        _ => None,
    }
}

// "7-14" (seen in older payloads) is deliberately not mapped; see DESIGN.md.
fn parse_notice(value: &str) -> Option<NoticeBucket> {
    match normalize(value).as_str() {
        "none" | "no_notice" | "not_informed" => Some(NoticeBucket::NoNotice),
        "0_7_days" | "less_than_7_days" => Some(NoticeBucket::ZeroToSevenDays),
        "8_14_days" => Some(NoticeBucket::EightToFourteenDays),
        "more_than_14_days" | "over_14_days" | "14_plus_days" => {
            Some(NoticeBucket::OverFourteenDays)
        }
        _ => None,
    }
}

fn parse_informed_date(value: &str) -> Option<InformedDate> {
    match normalize(value).as_str() {
        "on_departure_day" | "day_of_departure" | "same_day" => {
            return Some(InformedDate::OnDepartureDay)
        }
        _ => {}
    }

    let raw = value.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|moment| moment.date_naive())
        })
        .map(InformedDate::On)
}
