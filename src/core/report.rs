use crate::domain::model::{OutputRow, Taxon};
use crate::domain::ports::Storage;
use crate::domain::stats::{MonthlyHistogram, ObservationStat};
use crate::utils::error::{Result, SurveyError};

pub const REPORT_COLUMNS: [&str; 8] = [
    "kingdom",
    "phylum",
    "common_name",
    "latin_name",
    "inat_id",
    "observation_count",
    "histogram_data",
    "month_with_most_observations",
];

impl OutputRow {
    pub fn new(taxon: &Taxon, stat: &ObservationStat) -> Self {
        Self {
            kingdom: taxon.kingdom.clone(),
            phylum: taxon.phylum.clone(),
            common_name: taxon.display_name().to_string(),
            latin_name: taxon.latin_name.clone(),
            inat_id: taxon.id.0,
            observation_count: stat.total_count,
            histogram_data: stat.histogram.to_string(),
            month_with_most_observations: stat.peak_month.map(|m| m.number()),
        }
    }

    pub fn histogram(&self) -> Result<MonthlyHistogram> {
        self.histogram_data.parse()
    }
}

/// Serializes rows to CSV with the fixed column order, header first.
pub fn render_csv(rows: &[OutputRow]) -> Result<Vec<u8>> {
    // Header written by hand so an empty report still carries it.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(REPORT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| SurveyError::IoError(e.into_error()))
}

pub fn parse_csv(data: &[u8]) -> Result<Vec<OutputRow>> {
    let mut reader = csv::Reader::from_reader(data);
    let headers = reader.headers()?.clone();
    if headers.iter().ne(REPORT_COLUMNS) {
        return Err(SurveyError::ProcessingError {
            message: format!(
                "unexpected report header '{}'",
                headers.iter().collect::<Vec<_>>().join(",")
            ),
        });
    }
    reader
        .deserialize()
        .map(|row| row.map_err(SurveyError::from))
        .collect()
}

pub struct ReportWriter<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> ReportWriter<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Any failure here is fatal for the run.
    pub async fn write(&self, path: &str, rows: &[OutputRow]) -> Result<()> {
        let data = render_csv(rows).map_err(SurveyError::output)?;
        tracing::debug!("Writing {} report rows ({} bytes) to {}", rows.len(), data.len(), path);
        self.storage
            .write_file(path, &data)
            .await
            .map_err(SurveyError::output)
    }
}

pub async fn read_report<S: Storage>(storage: &S, path: &str) -> Result<Vec<OutputRow>> {
    let data = storage.read_file(path).await?;
    parse_csv(&data)
}
