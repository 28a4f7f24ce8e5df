use serde::{Deserialize, Serialize};

const DEFAULT_FALLBACK_AMOUNT: u32 = 250;
const DEFAULT_REDUCTION_FACTOR: f64 = 0.5;
const DEFAULT_LOOKBACK_YEARS: u32 = 3;

/// Dials for the compensation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationConfig {
    /// Amount used when the live route lookup fails.
    pub fallback_amount: u32,
    /// Share of the base amount paid for cancellations announced 8-14 days ahead.
    pub cancellation_reduction_factor: f64,
    pub informed_date_lookback_years: u32,
}

impl CompensationConfig {
    /// Clamp the reduction factor into `0.0..=1.0`, falling back to the default when it is not finite.
    pub fn sanitized(mut self) -> Self {
        self.cancellation_reduction_factor = if self.cancellation_reduction_factor.is_finite() {
            self.cancellation_reduction_factor.clamp(0.0, 1.0)
        } else {
            DEFAULT_REDUCTION_FACTOR
        };
        self
    }
}

impl Default for CompensationConfig {
    fn default() -> Self {
        Self {
            fallback_amount: DEFAULT_FALLBACK_AMOUNT,
            cancellation_reduction_factor: DEFAULT_REDUCTION_FACTOR,
            informed_date_lookback_years: DEFAULT_LOOKBACK_YEARS,
        }
    }
}
