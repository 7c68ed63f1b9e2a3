use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic region identifier understood by the observation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub u64);

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calendar month, always within 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month(u8);

impl Month {
    pub fn new(number: u32) -> Option<Self> {
        if (1..=12).contains(&number) {
            Some(Month(number as u8))
        } else {
            None
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12u8).map(Month)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const UNKNOWN_RANK: &str = "Unknown";

/// Taxonomic metadata for one species as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
    pub id: SpeciesId,
    pub kingdom: String,
    pub phylum: String,
    pub common_name: Option<String>,
    pub latin_name: String,
}

impl Taxon {
    /// Placeholder used when no metadata could be obtained for an id.
    pub fn unknown(id: SpeciesId) -> Self {
        Self {
            id,
            kingdom: UNKNOWN_RANK.to_string(),
            phylum: UNKNOWN_RANK.to_string(),
            common_name: None,
            latin_name: String::new(),
        }
    }

    /// Preferred common name, falling back to the latin name.
    pub fn display_name(&self) -> &str {
        match self.common_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.latin_name,
        }
    }
}

/// One species-counts listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonCount {
    pub taxon: Taxon,
    pub count: u64,
}

/// One observation, reduced to what aggregation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub id: u64,
    pub month: Option<Month>,
    pub taxon: Option<Taxon>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total_results: u64,
}

impl<T> Page<T> {
    /// A page is the last one when it is empty or covers the final result.
    pub fn has_more(&self) -> bool {
        if self.results.is_empty() {
            return false;
        }
        u64::from(self.page) * u64::from(self.per_page) < self.total_results
    }
}

/// A species selected for processing, with metadata when the listing supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesEntry {
    pub id: SpeciesId,
    pub taxon: Option<Taxon>,
}

/// Everything fetched for a single species.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationBatch {
    pub months: Vec<Month>,
    pub undated: usize,
    pub taxon: Option<Taxon>,
}

/// A species whose observations are fully fetched, ready for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesObservations {
    pub taxon: Taxon,
    pub months: Vec<Month>,
}

/// A species left out of the report because its observations could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSpecies {
    pub id: SpeciesId,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub species: Vec<SpeciesObservations>,
    pub skipped: Vec<SkippedSpecies>,
}

/// One report line: a species flattened together with its statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    pub kingdom: String,
    pub phylum: String,
    pub common_name: String,
    pub latin_name: String,
    pub inat_id: u64,
    pub observation_count: u64,
    pub histogram_data: String,
    pub month_with_most_observations: Option<u8>,
}
