use crate::domain::model::Month;
use crate::utils::error::SurveyError;
use std::fmt;
use std::str::FromStr;

/// Observation counts per calendar month.
///
/// Textual form is `1:c1;2:c2;...;12:c12`, always all twelve pairs in month
/// order. Reports written by earlier runs are parsed with [`FromStr`], so the
/// shape must not change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyHistogram([u64; 12]);

impl MonthlyHistogram {
    pub fn record(&mut self, month: Month) {
        self.0[month.index()] += 1;
    }

    pub fn get(&self, month: Month) -> u64 {
        self.0[month.index()]
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Month, u64)> + '_ {
        Month::all().map(|month| (month, self.get(month)))
    }

    /// Month with the highest count; the earliest month wins a tie.
    /// `None` when nothing was recorded.
    pub fn peak_month(&self) -> Option<Month> {
        let mut peak: Option<(Month, u64)> = None;
        for (month, count) in self.iter() {
            if count == 0 {
                continue;
            }
            match peak {
                Some((_, best)) if best >= count => {}
                _ => peak = Some((month, count)),
            }
        }
        peak.map(|(month, _)| month)
    }
}

impl fmt::Display for MonthlyHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (month, count) in self.iter() {
            if month.number() > 1 {
                f.write_str(";")?;
            }
            write!(f, "{}:{}", month, count)?;
        }
        Ok(())
    }
}

impl FromStr for MonthlyHistogram {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| SurveyError::InvalidConfigValueError {
            field: "histogram_data".to_string(),
            value: s.to_string(),
            reason,
        };

        let mut counts = [None; 12];
        for pair in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (month, count) = pair
                .split_once(':')
                .ok_or_else(|| invalid(format!("expected month:count, got '{}'", pair)))?;
            let month = month
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(Month::new)
                .ok_or_else(|| invalid(format!("'{}' is not a month number", month)))?;
            let count = count
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid(format!("bad count for month {}: {}", month, e)))?;
            if counts[month.index()].replace(count).is_some() {
                return Err(invalid(format!("month {} listed twice", month)));
            }
        }

        let mut histogram = MonthlyHistogram::default();
        for (slot, count) in histogram.0.iter_mut().zip(counts) {
            *slot = count.ok_or_else(|| invalid("all twelve months are required".to_string()))?;
        }
        Ok(histogram)
    }
}

/// Per-species summary derived from its observation months.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationStat {
    pub total_count: u64,
    pub histogram: MonthlyHistogram,
    pub peak_month: Option<Month>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(n: u32) -> Month {
        Month::new(n).unwrap()
    }

    #[test]
    fn test_display_lists_all_months_in_order() {
        let mut histogram = MonthlyHistogram::default();
        histogram.record(month(2));
        histogram.record(month(2));
        histogram.record(month(12));

        assert_eq!(
            histogram.to_string(),
            "1:0;2:2;3:0;4:0;5:0;6:0;7:0;8:0;9:0;10:0;11:0;12:1"
        );
    }

    #[test]
    fn test_parse_accepts_written_form() {
        let parsed: MonthlyHistogram = "1:4;2:0;3:0;4:0;5:1;6:0;7:0;8:0;9:0;10:0;11:0;12:9"
            .parse()
            .unwrap();
        assert_eq!(parsed.get(month(1)), 4);
        assert_eq!(parsed.get(month(5)), 1);
        assert_eq!(parsed.get(month(12)), 9);
        assert_eq!(parsed.total(), 14);
    }

    #[test]
    fn test_parse_rejects_incomplete_or_malformed() {
        assert!("1:1;2:2".parse::<MonthlyHistogram>().is_err());
        assert!("".parse::<MonthlyHistogram>().is_err());
        assert!("1:0;2:0;3:0;4:0;5:0;6:0;7:0;8:0;9:0;10:0;11:0;13:0"
            .parse::<MonthlyHistogram>()
            .is_err());
        assert!("1:0;1:0;3:0;4:0;5:0;6:0;7:0;8:0;9:0;10:0;11:0;12:0"
            .parse::<MonthlyHistogram>()
            .is_err());
        assert!("1:x;2:0;3:0;4:0;5:0;6:0;7:0;8:0;9:0;10:0;11:0;12:0"
            .parse::<MonthlyHistogram>()
            .is_err());
    }

    #[test]
    fn test_peak_month_none_when_empty() {
        assert_eq!(MonthlyHistogram::default().peak_month(), None);
    }

    #[test]
    fn test_peak_month_prefers_earliest_on_tie() {
        let mut histogram = MonthlyHistogram::default();
        for m in [7, 3, 7, 3, 11] {
            histogram.record(month(m));
        }
        assert_eq!(histogram.peak_month(), Some(month(3)));
    }
}
