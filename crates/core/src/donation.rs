//! Donation rules: types, validation, donor display names and period
//! statistics.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

pub const ANONYMOUS_DONOR: &str = "Anonymous";
pub const UNKNOWN_DONOR: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationType {
    Tithe,
    Offering,
    BuildingFund,
    Missions,
    Special,
    Other,
}

impl DonationType {
    pub const ALL: [DonationType; 6] = [
        DonationType::Tithe,
        DonationType::Offering,
        DonationType::BuildingFund,
        DonationType::Missions,
        DonationType::Special,
        DonationType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DonationType::Tithe => "TITHE",
            DonationType::Offering => "OFFERING",
            DonationType::BuildingFund => "BUILDING_FUND",
            DonationType::Missions => "MISSIONS",
            DonationType::Special => "SPECIAL",
            DonationType::Other => "OTHER",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DonationType::Tithe => "Regular tithe donation",
            DonationType::Offering => "General offering",
            DonationType::BuildingFund => "Building fund contribution",
            DonationType::Missions => "Missions support",
            DonationType::Special => "Special occasion donation",
            DonationType::Other => "Other donation type",
        }
    }
}

impl fmt::Display for DonationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        DonationType::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| CoreError::Validation(format!("Unknown donation type: {s}")))
    }
}

/// Amounts are stored as `NUMERIC(10,2)`.
pub const AMOUNT_SCALE: u32 = 2;

/// Exclusive upper bound of a storable amount (eight integer digits).
pub const MAX_AMOUNT_EXCLUSIVE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Check the amount and date of a new donation against `now`.
pub fn validate_donation(amount: Decimal, donation_date: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if amount <= Decimal::ZERO {
        return Err(CoreError::Validation(
            "Donation amount must be greater than 0".into(),
        ));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(CoreError::Validation(
            "Donation amount cannot have more than 2 decimal places".into(),
        ));
    }
    if amount >= MAX_AMOUNT_EXCLUSIVE {
        return Err(CoreError::Validation(
            "Donation amount must be less than 100000000".into(),
        ));
    }
    if donation_date > now {
        return Err(CoreError::Validation(
            "Donation date cannot be in the future".into(),
        ));
    }
    Ok(())
}

/// Display name for the donor. Anonymous wins over a linked member.
pub fn donor_name(anonymous: bool, member_full_name: Option<&str>) -> String {
    if anonymous {
        return ANONYMOUS_DONOR.to_string();
    }
    member_full_name.unwrap_or(UNKNOWN_DONOR).to_string()
}

/// Sum a sequence of amounts; empty input sums to zero.
pub fn calculate_total<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, |acc, a| acc + a)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

/// Per-type totals over a period. Every type has an entry, zero when no
/// donations of that type fall inside the period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonationStatistics {
    pub total_amount: Decimal,
    pub donations_by_type: BTreeMap<DonationType, Decimal>,
    pub period: DateRange,
}

impl DonationStatistics {
    /// Build statistics from `(type, total)` pairs as returned by a grouped
    /// query. Types missing from `totals` are zero-filled.
    pub fn from_totals<I>(totals: I, start_date: Timestamp, end_date: Timestamp) -> Self
    where
        I: IntoIterator<Item = (DonationType, Decimal)>,
    {
        let mut donations_by_type: BTreeMap<DonationType, Decimal> =
            DonationType::ALL.into_iter().map(|t| (t, Decimal::ZERO)).collect();
        for (kind, amount) in totals {
            *donations_by_type.entry(kind).or_insert(Decimal::ZERO) += amount;
        }
        let total_amount = calculate_total(donations_by_type.values().copied());
        DonationStatistics {
            total_amount,
            donations_by_type,
            period: DateRange { start_date, end_date },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    // -- DonationType ---------------------------------------------------------

    #[test]
    fn type_parses_from_name() {
        assert_eq!("building_fund".parse::<DonationType>().unwrap(), DonationType::BuildingFund);
        assert_eq!("TITHE".parse::<DonationType>().unwrap(), DonationType::Tithe);
        assert!("PLEDGE".parse::<DonationType>().is_err());
    }

    #[test]
    fn type_serializes_as_screaming_snake() {
        let json = serde_json::to_string(&DonationType::BuildingFund).unwrap();
        assert_eq!(json, "\"BUILDING_FUND\"");
    }

    // -- validation -----------------------------------------------------------

    #[test]
    fn rejects_non_positive_amounts() {
        let now = Utc::now();
        for amount in ["0", "-5.00"] {
            let err = validate_donation(dec(amount), now, now).unwrap_err();
            assert_matches!(err, CoreError::Validation(msg) if msg == "Donation amount must be greater than 0");
        }
    }

    #[test]
    fn rejects_future_dates() {
        let now = Utc::now();
        let err = validate_donation(dec("10"), now + Duration::days(1), now).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg == "Donation date cannot be in the future");
    }

    #[test]
    fn accepts_valid_donation() {
        let now = Utc::now();
        assert!(validate_donation(dec("0.01"), now - Duration::hours(2), now).is_ok());
        assert!(validate_donation(dec("99999999.99"), now, now).is_ok());
        assert!(validate_donation(dec("12.500"), now, now).is_ok());
    }

    #[test]
    fn rejects_amounts_beyond_two_decimals() {
        let now = Utc::now();
        for amount in ["0.001", "10.005"] {
            let err = validate_donation(dec(amount), now, now).unwrap_err();
            assert_matches!(
                err,
                CoreError::Validation(msg) if msg == "Donation amount cannot have more than 2 decimal places"
            );
        }
    }

    #[test]
    fn rejects_amounts_too_large_to_store() {
        let now = Utc::now();
        for amount in ["100000000", "100000000.00", "123456789.10"] {
            let err = validate_donation(dec(amount), now, now).unwrap_err();
            assert_matches!(err, CoreError::Validation(msg) if msg == "Donation amount must be less than 100000000");
        }
    }

    // -- donor name -----------------------------------------------------------

    #[test]
    fn donor_name_variants() {
        assert_eq!(donor_name(true, Some("John Doe")), "Anonymous");
        assert_eq!(donor_name(false, None), "Unknown");
        assert_eq!(donor_name(false, Some("John Doe")), "John Doe");
    }

    // -- totals and statistics ------------------------------------------------

    #[test]
    fn total_of_empty_is_zero() {
        assert_eq!(calculate_total(Vec::new()), Decimal::ZERO);
        assert_eq!(calculate_total([dec("100.50"), dec("49.50")]), dec("150.00"));
    }

    #[test]
    fn statistics_zero_fill_every_type() {
        let start = Utc::now() - Duration::days(30);
        let end = Utc::now();
        let stats = DonationStatistics::from_totals(
            [(DonationType::Tithe, dec("100")), (DonationType::Missions, dec("25.5"))],
            start,
            end,
        );
        assert_eq!(stats.donations_by_type.len(), DonationType::ALL.len());
        assert_eq!(stats.donations_by_type[&DonationType::Offering], Decimal::ZERO);
        assert_eq!(stats.total_amount, dec("125.5"));
        assert_eq!(stats.period.start_date, start);
    }
}
