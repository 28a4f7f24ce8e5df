use crate::infra::{parse_date, parse_iata};
use chrono::{Local, NaiveDate};
use clap::Args;
use flight_claim::claims::compensation::{
    DELAY_QUESTION_ID, INFORMED_DATE_QUESTION_ID, ISSUE_QUESTION_IDS, NOTICE_QUESTION_ID,
};
use flight_claim::claims::{
    classify, BaseAmountQuote, ClaimService, CompensationConfig, CompensationEngine,
    CompensationVerdict, HttpClaimsGateway, IataCode, WizardAnswer,
};
use flight_claim::config::AppConfig;
use flight_claim::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Great-circle flight distance in kilometers
    #[arg(long)]
    pub(crate) distance_km: Option<f64>,
    /// What happened: delayed, cancelled, overbooked or missed_connection
    #[arg(long)]
    pub(crate) issue: String,
    /// Arrival delay bucket, e.g. more_than_3
    #[arg(long)]
    pub(crate) delay: Option<String>,
    /// Cancellation notice bucket, e.g. 0-7-days
    #[arg(long)]
    pub(crate) notice: Option<String>,
    /// When the cancellation was announced (YYYY-MM-DD or on_departure_day)
    #[arg(long)]
    pub(crate) informed_date: Option<String>,
    /// Departure airport IATA code
    #[arg(long, value_parser = parse_iata)]
    pub(crate) from: Option<IataCode>,
    /// Arrival airport IATA code
    #[arg(long, value_parser = parse_iata)]
    pub(crate) to: Option<IataCode>,
    /// Ask the claims API for the route amount
    #[arg(long, requires_all = ["from", "to"])]
    pub(crate) live: bool,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

impl EstimateArgs {
    fn answers(&self) -> Vec<WizardAnswer> {
        let mut answers = vec![WizardAnswer::new(ISSUE_QUESTION_IDS[0], self.issue.as_str())];
        let optional = [
            (DELAY_QUESTION_ID, &self.delay),
            (NOTICE_QUESTION_ID, &self.notice),
            (INFORMED_DATE_QUESTION_ID, &self.informed_date),
        ];
        for (question, value) in optional {
            if let Some(value) = value {
                answers.push(WizardAnswer::new(question, value.as_str()));
            }
        }
        answers
    }
}

pub(crate) async fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let quote = match (&args.from, &args.to) {
        (Some(from), Some(to)) if args.live => {
            let config = AppConfig::load()?;
            let gateway = HttpClaimsGateway::new(&config.upstream)?;
            let service = ClaimService::new(Arc::new(gateway), CompensationConfig::default());
            service.base_quote(from, to).await
        }
        _ => BaseAmountQuote::NotRequested,
    };

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let verdict = estimate_from_args(&args, quote, today);
    println!("{}", render(&args, &verdict));
    Ok(())
}

pub(crate) fn estimate_from_args(
    args: &EstimateArgs,
    quote: BaseAmountQuote,
    today: NaiveDate,
) -> CompensationVerdict {
    let scenario = classify(&args.answers());
    CompensationEngine::default().evaluate_distance(&scenario, args.distance_km, quote, today)
}

pub(crate) fn render(args: &EstimateArgs, verdict: &CompensationVerdict) -> String {
    let route = match (&args.from, &args.to) {
        (Some(from), Some(to)) => format!("{from} -> {to}"),
        _ => "unspecified route".to_string(),
    };

    let mut lines = vec![
        "Flight compensation estimate".to_string(),
        format!("  Route: {route}"),
        format!("  Verdict: {}", verdict.summary()),
        format!(
            "  Base amount: {} EUR ({:?})",
            verdict.base_amount, verdict.basis
        ),
    ];
    if verdict.reduction_factor < 1.0 {
        lines.push(format!(
            "  Reduction applied: {:.0}%",
            (1.0 - verdict.reduction_factor) * 100.0
        ));
    }
    if verdict.fallback {
        lines.push("  Claims API unavailable; fallback amount shown".to_string());
    }
    lines.push("  Estimate only; the claims API decides at submission.".to_string());
    lines.join("\n")
}
