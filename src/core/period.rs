//! Trailing window labels shared by the market fetch and the local filter.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum Period {
    #[default]
    #[serde(rename = "1M", alias = "1個月")]
    OneMonth,
    #[serde(rename = "3M", alias = "3個月")]
    ThreeMonths,
    #[serde(rename = "6M", alias = "6個月")]
    SixMonths,
    #[serde(rename = "1Y", alias = "1年")]
    OneYear,
    #[serde(rename = "2Y", alias = "2年")]
    TwoYears,
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Period::OneMonth => "1M",
                Period::ThreeMonths => "3M",
                Period::SixMonths => "6M",
                Period::OneYear => "1Y",
                Period::TwoYears => "2Y",
            }
        )
    }
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
    ];

    /// Number of calendar days looked back from the end of a series.
    pub fn lookback_days(&self) -> i64 {
        match self {
            Period::OneMonth => 30,
            Period::ThreeMonths => 90,
            Period::SixMonths => 180,
            Period::OneYear => 365,
            Period::TwoYears => 730,
        }
    }

    pub fn to_duration(&self) -> Duration {
        Duration::days(self.lookback_days())
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1M" | "1個月" => Ok(Period::OneMonth),
            "3M" | "3個月" => Ok(Period::ThreeMonths),
            "6M" | "6個月" => Ok(Period::SixMonths),
            "1Y" | "1年" => Ok(Period::OneYear),
            "2Y" | "2年" => Ok(Period::TwoYears),
            _ => Err(anyhow::anyhow!(
                "Invalid period: {}, expected one of 1M, 3M, 6M, 1Y, 2Y",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_table() {
        let days: Vec<i64> = Period::ALL.iter().map(|p| p.lookback_days()).collect();
        assert_eq!(days, vec![30, 90, 180, 365, 730]);
        assert_eq!(Period::OneYear.to_duration(), Duration::days(365));
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("1m".parse::<Period>().unwrap(), Period::OneMonth);
        assert_eq!("2Y".parse::<Period>().unwrap(), Period::TwoYears);
        assert_eq!("6個月".parse::<Period>().unwrap(), Period::SixMonths);
        assert_eq!("1年".parse::<Period>().unwrap(), Period::OneYear);
        assert!("5Y".parse::<Period>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for period in Period::ALL {
            assert_eq!(period.to_string().parse::<Period>().unwrap(), period);
        }
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let period: Period = serde_yaml::from_str("3M").unwrap();
        assert_eq!(period, Period::ThreeMonths);
        let period: Period = serde_yaml::from_str("2年").unwrap();
        assert_eq!(period, Period::TwoYears);
    }
}
