const SHORT_HAUL_MAX_KM: f64 = 1500.0;
const MEDIUM_HAUL_MAX_KM: f64 = 3500.0;

pub const SHORT_HAUL_AMOUNT: u32 = 250;
pub const MEDIUM_HAUL_AMOUNT: u32 = 400;
pub const LONG_HAUL_AMOUNT: u32 = 600;

/// EU261 distance band amount in whole EUR.
///
/// Total over every `f64`: zero, negative and NaN distances land in the
/// shortest band.
pub fn lookup_base_amount(distance_km: f64) -> u32 {
    if distance_km.is_nan() || distance_km <= SHORT_HAUL_MAX_KM {
        SHORT_HAUL_AMOUNT
    } else if distance_km <= MEDIUM_HAUL_MAX_KM {
        MEDIUM_HAUL_AMOUNT
    } else {
        LONG_HAUL_AMOUNT
    }
}
