use crate::domain::model::Month;
use crate::domain::stats::{MonthlyHistogram, ObservationStat};

pub fn aggregate(months: &[Month]) -> ObservationStat {
    let mut histogram = MonthlyHistogram::default();
    for &month in months {
        histogram.record(month);
    }

    ObservationStat {
        total_count: months.len() as u64,
        histogram,
        peak_month: histogram.peak_month(),
    }
}
