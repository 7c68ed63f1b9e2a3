use crate::domain::model::SpeciesId;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, SurveyError};
use std::collections::HashSet;

/// Allow-list of species ids, in file order without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesFilter {
    ids: Vec<SpeciesId>,
}

impl SpeciesFilter {
    pub fn new(ids: impl IntoIterator<Item = SpeciesId>) -> Self {
        let mut seen = HashSet::new();
        Self {
            ids: ids.into_iter().filter(|id| seen.insert(*id)).collect(),
        }
    }

    pub fn ids(&self) -> &[SpeciesId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Parses a CSV whose first column holds species ids. A non-numeric
    /// first record is taken as a header.
    pub fn from_csv(data: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(data);

        let mut ids = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let field = match record.get(0) {
                Some(field) if !field.is_empty() => field,
                _ => continue,
            };
            match field.parse::<u64>() {
                Ok(id) => ids.push(SpeciesId(id)),
                Err(_) if index == 0 => {
                    tracing::debug!("Treating '{}' as the filter file header", field);
                }
                Err(e) => {
                    let line = record
                        .position()
                        .map(|p| p.line())
                        .unwrap_or(index as u64 + 1);
                    return Err(SurveyError::InvalidConfigValueError {
                        field: format!("filter line {}", line),
                        value: field.to_string(),
                        reason: format!("not a species id: {}", e),
                    });
                }
            }
        }
        Ok(Self::new(ids))
    }

    /// Loads the filter at `path`; a missing file means no filter.
    pub async fn load<S: Storage>(storage: &S, path: &str) -> Result<Option<Self>> {
        let data = match storage.read_file(path).await {
            Ok(data) => data,
            Err(SurveyError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No species filter at {}, processing every species", path);
                return Ok(None);
            }
            Err(e) => {
                return Err(SurveyError::config(format!(
                    "cannot read species filter {}: {}",
                    path, e
                )))
            }
        };

        let filter = Self::from_csv(&data).map_err(|e| match e {
            SurveyError::CsvError(e) => {
                SurveyError::config(format!("species filter {} is not valid CSV: {}", path, e))
            }
            other => other,
        })?;
        if filter.is_empty() {
            tracing::warn!("⚠️ Species filter {} lists no ids, the report will be empty", path);
        } else {
            tracing::info!("Loaded {} species ids from {}", filter.len(), path);
        }
        Ok(Some(filter))
    }
}
