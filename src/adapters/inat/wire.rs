//! JSON payloads of the iNaturalist v1 API, limited to the fields used here.

use crate::domain::model::{Month, Observation, Page, SpeciesId, Taxon, TaxonCount};
use crate::domain::taxonomy::{kingdom_from_ancestors, phylum_from_ancestors};
use chrono::{DateTime, Datelike, NaiveDate};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct PagedResponse<T> {
    #[serde(default)]
    pub total_results: u64,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> PagedResponse<T> {
    /// Falls back to the requested paging when the response omits it.
    pub fn into_page<U>(self, page: u32, per_page: u32, map: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(map).collect(),
            page: self.page.unwrap_or(page),
            per_page: self.per_page.unwrap_or(per_page),
            total_results: self.total_results,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpeciesCountRecord {
    #[serde(default)]
    pub count: u64,
    pub taxon: TaxonRecord,
}

impl From<SpeciesCountRecord> for TaxonCount {
    fn from(record: SpeciesCountRecord) -> Self {
        TaxonCount {
            taxon: record.taxon.into(),
            count: record.count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaxonRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub preferred_common_name: Option<String>,
    #[serde(default)]
    pub ancestor_ids: Vec<u64>,
    #[serde(default)]
    pub ancestors: Vec<AncestorRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AncestorRecord {
    pub rank: Option<String>,
    pub name: Option<String>,
}

impl TaxonRecord {
    fn ancestor_named(&self, rank: &str) -> Option<String> {
        self.ancestors
            .iter()
            .find(|a| a.rank.as_deref() == Some(rank))
            .and_then(|a| a.name.clone())
    }
}

impl From<TaxonRecord> for Taxon {
    fn from(record: TaxonRecord) -> Self {
        let kingdom = record
            .ancestor_named("kingdom")
            .unwrap_or_else(|| kingdom_from_ancestors(&record.ancestor_ids));
        let phylum = record
            .ancestor_named("phylum")
            .unwrap_or_else(|| phylum_from_ancestors(&record.ancestor_ids));

        Taxon {
            id: SpeciesId(record.id),
            kingdom,
            phylum,
            common_name: record.preferred_common_name.filter(|n| !n.trim().is_empty()),
            latin_name: record.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObservationRecord {
    #[serde(default)]
    pub id: u64,
    pub observed_on: Option<String>,
    pub observed_on_details: Option<DateDetails>,
    pub time_observed_at: Option<String>,
    pub taxon: Option<TaxonRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DateDetails {
    pub month: Option<u32>,
}

impl ObservationRecord {
    fn month(&self) -> Option<Month> {
        if let Some(month) = self
            .observed_on_details
            .as_ref()
            .and_then(|d| d.month)
            .and_then(Month::new)
        {
            return Some(month);
        }

        if let Some(date) = self
            .observed_on
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        {
            return Month::new(date.month());
        }

        self.time_observed_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
            .and_then(|t| Month::new(t.month()))
    }
}

impl From<ObservationRecord> for Observation {
    fn from(record: ObservationRecord) -> Self {
        Observation {
            id: record.id,
            month: record.month(),
            taxon: record.taxon.map(Taxon::from),
        }
    }
}
