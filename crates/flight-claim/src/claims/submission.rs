use serde::{Deserialize, Serialize};

use super::domain::FlightLeg;

/// How the passenger actually travelled compared to the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyFactType {
    None,
    #[serde(rename = "self")]
    SelfArranged,
    Provided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Salutation {
    #[serde(rename = "mr", alias = "herr", alias = "Herr", alias = "Mr")]
    Mr,
    #[serde(rename = "mrs", alias = "frau", alias = "Frau", alias = "Mrs")]
    Mrs,
}

/// Payload for the upstream eligibility check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimEvaluationRequest {
    pub booked_flight_ids: Vec<String>,
    #[serde(default)]
    pub actual_flight_ids: Vec<String>,
    #[serde(default)]
    pub information_received_date: Option<String>,
    #[serde(default)]
    pub delay_minutes: Option<u32>,
    pub locale: String,
}

impl ClaimEvaluationRequest {
    /// Fill `delay_minutes` from the flown leg unless the caller already sent it.
    pub fn with_flight_delay(mut self, leg: &FlightLeg) -> Self {
        if self.delay_minutes.is_none() {
            self.delay_minutes = leg.arrival_delay_minutes();
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Accept,
    Reject,
}

/// Upstream eligibility answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimEvaluation {
    pub status: EvaluationStatus,
    #[serde(default)]
    pub contract_amount: Option<f64>,
}

/// Evaluation result surfaced to callers. Transport failures are data here, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimEvaluationOutcome {
    Accepted { contract_amount: Option<f64> },
    Rejected,
    Failed { status: Option<u16>, message: String },
}

impl From<ClaimEvaluation> for ClaimEvaluationOutcome {
    fn from(value: ClaimEvaluation) -> Self {
        match value.status {
            EvaluationStatus::Accept => ClaimEvaluationOutcome::Accepted {
                contract_amount: value.contract_amount,
            },
            EvaluationStatus::Reject => ClaimEvaluationOutcome::Rejected,
        }
    }
}

/// Claim order as entered, before required-field checks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimOrderDraft {
    pub booked_flight_ids: Vec<String>,
    pub actual_flight_ids: Vec<String>,
    pub information_received_date: Option<String>,
    pub booking_reference: Option<String>,
    pub journey_fact_type: Option<JourneyFactType>,
    pub salutation: Option<Salutation>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub marketable_status: Option<bool>,
    pub contract_signature: Option<String>,
    pub terms_accepted: Option<bool>,
    pub data_processing_consent: Option<bool>,
}

/// Complete order ready for transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimOrder {
    pub booked_flight_ids: Vec<String>,
    pub actual_flight_ids: Vec<String>,
    pub information_received_date: String,
    pub booking_reference: String,
    pub journey_fact_type: JourneyFactType,
    pub salutation: Salutation,
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub email: String,
    pub marketable_status: bool,
    pub contract_signature: String,
    pub terms_accepted: bool,
    pub data_processing_consent: bool,
}

/// Required fields that were absent, in form order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("claim order is missing required fields: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

impl ClaimOrderDraft {
    /// Check every required field and produce the transmittable order.
    ///
    /// Consent flags count as missing unless they are `true`. The country is
    /// upper-cased.
    pub fn validate(self) -> Result<ClaimOrder, MissingFields> {
        let mut missing = Vec::new();

        let booked_flight_ids = non_empty_ids(self.booked_flight_ids);
        if booked_flight_ids.is_empty() {
            missing.push("booked_flight_ids");
        }
        let actual_flight_ids = non_empty_ids(self.actual_flight_ids);
        if actual_flight_ids.is_empty() {
            missing.push("actual_flight_ids");
        }

        let information_received_date = required(
            self.information_received_date,
            "information_received_date",
            &mut missing,
        );
        let booking_reference = required(self.booking_reference, "booking_reference", &mut missing);
        if self.journey_fact_type.is_none() {
            missing.push("journey_fact_type");
        }
        if self.salutation.is_none() {
            missing.push("salutation");
        }
        let first_name = required(self.first_name, "first_name", &mut missing);
        let last_name = required(self.last_name, "last_name", &mut missing);
        let street = required(self.street, "street", &mut missing);
        let postal_code = required(self.postal_code, "postal_code", &mut missing);
        let city = required(self.city, "city", &mut missing);
        let country = required(self.country, "country", &mut missing);
        let email = required(self.email, "email", &mut missing);
        if self.marketable_status.is_none() {
            missing.push("marketable_status");
        }
        let contract_signature =
            required(self.contract_signature, "contract_signature", &mut missing);
        if self.terms_accepted != Some(true) {
            missing.push("terms_accepted");
        }
        if self.data_processing_consent != Some(true) {
            missing.push("data_processing_consent");
        }

        match (
            self.journey_fact_type,
            self.salutation,
            self.marketable_status,
        ) {
            (Some(journey_fact_type), Some(salutation), Some(marketable_status))
                if missing.is_empty() =>
            {
                Ok(ClaimOrder {
                    booked_flight_ids,
                    actual_flight_ids,
                    information_received_date,
                    booking_reference,
                    journey_fact_type,
                    salutation,
                    first_name,
                    last_name,
                    street,
                    postal_code,
                    city,
                    country: country.to_uppercase(),
                    email,
                    marketable_status,
                    contract_signature,
                    terms_accepted: true,
                    data_processing_consent: true,
                })
            }
            _ => Err(MissingFields(missing)),
        }
    }
}

fn required(value: Option<String>, field: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value.map(|inner| inner.trim().to_string()) {
        Some(inner) if !inner.is_empty() => inner,
        _ => {
            missing.push(field);
            String::new()
        }
    }
}

fn non_empty_ids(ids: Vec<String>) -> Vec<String> {
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Upstream acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(default, alias = "id")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Result of a submission attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Submitted { receipt: OrderReceipt },
    /// Rejected locally; the claims API was not called.
    Incomplete { missing_fields: Vec<&'static str> },
    /// The claims API did not confirm the order. After a timeout or a dropped
    /// connection the order may still have been received.
    Failed { status: Option<u16>, message: String },
}
