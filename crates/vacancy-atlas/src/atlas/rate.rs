use serde::Serialize;

/// Shading class for a region. A rate of exactly zero (which includes regions
/// with no reported statistic) gets its own palest class; positive rates are
/// graded over seven steps, palest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBucket {
    NoVacancy,
    Minimal,
    VeryLow,
    Low,
    Moderate,
    Elevated,
    High,
    Severe,
}

impl ColorBucket {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::NoVacancy,
            Self::Minimal,
            Self::VeryLow,
            Self::Low,
            Self::Moderate,
            Self::Elevated,
            Self::High,
            Self::Severe,
        ]
    }

    pub const fn palest() -> Self {
        Self::NoVacancy
    }

    /// Exclusive lower bound in percent: rates strictly above it fall in this
    /// bucket or a darker one. `None` for the zero bucket.
    pub const fn lower_bound(self) -> Option<f64> {
        match self {
            Self::NoVacancy => None,
            Self::Minimal => Some(0.0),
            Self::VeryLow => Some(2.5),
            Self::Low => Some(5.0),
            Self::Moderate => Some(7.5),
            Self::Elevated => Some(10.0),
            Self::High => Some(15.0),
            Self::Severe => Some(20.0),
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::NoVacancy => "#FFEDA0",
            Self::Minimal => "#FED976",
            Self::VeryLow => "#FEB24C",
            Self::Low => "#FD8D3C",
            Self::Moderate => "#FC4E2A",
            Self::Elevated => "#E31A1C",
            Self::High => "#BD0026",
            Self::Severe => "#800026",
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NoVacancy => "0%",
            Self::Minimal => "Up to 2.5%",
            Self::VeryLow => "2.5% to 5%",
            Self::Low => "5% to 7.5%",
            Self::Moderate => "7.5% to 10%",
            Self::Elevated => "10% to 15%",
            Self::High => "15% to 20%",
            Self::Severe => "Over 20%",
        }
    }
}

/// Legend row handed to presenters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub bucket: ColorBucket,
    pub index: u8,
    /// Rates strictly above this value; absent for the zero bucket.
    pub above_pct: Option<f64>,
    pub color: &'static str,
    pub label: &'static str,
}

pub struct RateCalculator;

impl RateCalculator {
    /// Vacant share of total units in percent, rounded to one decimal place.
    /// Zero total always yields 0.0.
    pub fn compute_rate(total: u64, vacant: u64) -> f64 {
        if total == 0 {
            return 0.0;
        }

        round_to_tenth(vacant as f64 / total as f64 * 100.0)
    }

    /// Darkest bucket whose bound the rate exceeds; zero (or anything not above
    /// zero) is the palest.
    pub fn bucket(rate_pct: f64) -> ColorBucket {
        ColorBucket::ordered()
            .into_iter()
            .rev()
            .find(|bucket| bucket.lower_bound().is_some_and(|bound| rate_pct > bound))
            .unwrap_or(ColorBucket::palest())
    }

    pub fn palette() -> Vec<LegendEntry> {
        ColorBucket::ordered()
            .into_iter()
            .map(|bucket| LegendEntry {
                bucket,
                index: bucket.index(),
                above_pct: bucket.lower_bound(),
                color: bucket.color(),
                label: bucket.label(),
            })
            .collect()
    }
}

pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_never_divides() {
        assert_eq!(RateCalculator::compute_rate(0, 0), 0.0);
        assert_eq!(RateCalculator::compute_rate(0, 250), 0.0);
    }

    #[test]
    fn rate_is_rounded_to_one_decimal() {
        assert_eq!(RateCalculator::compute_rate(100, 10), 10.0);
        assert_eq!(RateCalculator::compute_rate(3, 1), 33.3);
        assert_eq!(RateCalculator::compute_rate(1_000, 125), 12.5);
        assert_eq!(RateCalculator::compute_rate(7, 0), 0.0);
    }

    #[test]
    fn rate_is_never_negative() {
        for total in [0_u64, 1, 9, 400, u32::MAX as u64] {
            for vacant in [0_u64, 1, 5, 400] {
                assert!(RateCalculator::compute_rate(total, vacant) >= 0.0);
            }
        }
    }

    #[test]
    fn zero_has_its_own_bucket() {
        assert_eq!(RateCalculator::bucket(0.0), ColorBucket::NoVacancy);
        let low = RateCalculator::bucket(RateCalculator::compute_rate(1_000, 12));
        assert_eq!(low, ColorBucket::Minimal);
        assert_ne!(RateCalculator::bucket(0.0), low);
        assert_eq!(low.color(), "#FED976");
    }

    #[test]
    fn bounds_belong_to_the_paler_bucket() {
        assert_eq!(RateCalculator::bucket(0.1), ColorBucket::Minimal);
        assert_eq!(RateCalculator::bucket(2.5), ColorBucket::Minimal);
        assert_eq!(RateCalculator::bucket(2.6), ColorBucket::VeryLow);
        assert_eq!(RateCalculator::bucket(7.5), ColorBucket::Low);
        assert_eq!(RateCalculator::bucket(12.0).color(), "#E31A1C");
        assert_eq!(RateCalculator::bucket(20.0), ColorBucket::High);
        assert_eq!(RateCalculator::bucket(20.1), ColorBucket::Severe);
        assert_eq!(RateCalculator::bucket(250.0).color(), "#800026");
    }

    #[test]
    fn bucket_is_monotonic_in_rate() {
        let mut previous = RateCalculator::bucket(0.0);
        let mut rate = 0.0;
        while rate <= 40.0 {
            let current = RateCalculator::bucket(rate);
            assert!(current >= previous, "bucket fell back at {rate}");
            previous = current;
            rate += 0.1;
        }
    }

    #[test]
    fn palette_runs_pale_to_dark() {
        let palette = RateCalculator::palette();
        assert_eq!(palette.len(), 8);
        assert_eq!(palette[0].color, "#FFEDA0");
        assert_eq!(palette[0].above_pct, None);
        assert_eq!(palette[1].above_pct, Some(0.0));
        assert_eq!(palette[7].color, "#800026");
        assert_eq!(palette[7].above_pct, Some(20.0));
        assert!(palette
            .windows(2)
            .all(|pair| pair[0].index + 1 == pair[1].index));
        assert!(palette[1..]
            .windows(2)
            .all(|pair| pair[0].above_pct < pair[1].above_pct));
    }
}
