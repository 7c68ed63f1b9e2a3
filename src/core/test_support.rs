//! In-memory `ObservationSource` for unit tests.

use crate::domain::model::{
    Month, Observation, Page, PlaceId, SpeciesId, Taxon, TaxonCount, UNKNOWN_RANK,
};
use crate::domain::ports::ObservationSource;
use crate::utils::error::{Result, SurveyError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) const PER_PAGE: u32 = 2;

enum Step<T> {
    Page { results: Vec<T>, total: u64 },
    Fail,
}

impl<T: Clone> Step<T> {
    fn to_page(&self, page: u32, what: &str) -> Result<Page<T>> {
        match self {
            Step::Page { results, total } => Ok(Page {
                results: results.clone(),
                page,
                per_page: PER_PAGE,
                total_results: *total,
            }),
            Step::Fail => Err(SurveyError::ApiStatusError {
                status: 500,
                url: format!("scripted://{}/{}", what, page),
            }),
        }
    }
}

pub(crate) fn taxon(id: u64, latin_name: &str) -> TaxonCount {
    TaxonCount {
        taxon: Taxon {
            id: SpeciesId(id),
            kingdom: "Animalia".to_string(),
            phylum: UNKNOWN_RANK.to_string(),
            common_name: None,
            latin_name: latin_name.to_string(),
        },
        count: 1,
    }
}

pub(crate) fn observation(month: Option<u32>) -> Observation {
    observation_with_id(0, month)
}

pub(crate) fn observation_with_id(id: u64, month: Option<u32>) -> Observation {
    Observation {
        id,
        month: month.and_then(Month::new),
        taxon: None,
    }
}

#[derive(Default)]
pub(crate) struct ScriptedSource {
    species: Vec<Step<TaxonCount>>,
    observations: HashMap<SpeciesId, Vec<Step<Observation>>>,
    taxa: Option<Vec<Taxon>>,
    species_calls: Mutex<usize>,
    observation_calls: Mutex<Vec<(SpeciesId, u64)>>,
    taxa_calls: Mutex<usize>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_species_page(mut self, results: Vec<TaxonCount>, total: u64) -> Self {
        self.species.push(Step::Page { results, total });
        self
    }

    pub(crate) fn with_species_failure(mut self) -> Self {
        self.species.push(Step::Fail);
        self
    }

    pub(crate) fn with_observation_page(
        mut self,
        id: u64,
        results: Vec<Observation>,
        total: u64,
    ) -> Self {
        self.observations
            .entry(SpeciesId(id))
            .or_default()
            .push(Step::Page { results, total });
        self
    }

    pub(crate) fn with_observation_failure(mut self, id: u64) -> Self {
        self.observations
            .entry(SpeciesId(id))
            .or_default()
            .push(Step::Fail);
        self
    }

    /// Without this the taxa lookup fails.
    pub(crate) fn with_taxa(mut self, taxa: Vec<Taxon>) -> Self {
        self.taxa = Some(taxa);
        self
    }

    pub(crate) fn species_calls(&self) -> usize {
        *self.species_calls.lock().unwrap()
    }

    /// Each observations request as (species, id cursor).
    pub(crate) fn observation_calls(&self) -> Vec<(SpeciesId, u64)> {
        self.observation_calls.lock().unwrap().clone()
    }

    pub(crate) fn taxa_calls(&self) -> usize {
        *self.taxa_calls.lock().unwrap()
    }
}

fn empty_page<T>(page: u32) -> Page<T> {
    Page {
        results: Vec::new(),
        page,
        per_page: PER_PAGE,
        total_results: 0,
    }
}

#[async_trait]
impl ObservationSource for ScriptedSource {
    async fn species_counts(&self, _place: PlaceId, page: u32) -> Result<Page<TaxonCount>> {
        *self.species_calls.lock().unwrap() += 1;
        match self.species.get(page as usize - 1) {
            Some(step) => step.to_page(page, "species_counts"),
            None => Ok(empty_page(page)),
        }
    }

    async fn observations(
        &self,
        species: SpeciesId,
        _place: PlaceId,
        after: u64,
    ) -> Result<Page<Observation>> {
        // Steps are served in order, one per request for the species.
        let request = {
            let mut calls = self.observation_calls.lock().unwrap();
            calls.push((species, after));
            calls.iter().filter(|(id, _)| *id == species).count()
        };
        match self
            .observations
            .get(&species)
            .and_then(|steps| steps.get(request - 1))
        {
            Some(step) => step.to_page(1, "observations"),
            None => Ok(empty_page(1)),
        }
    }

    async fn taxa(&self, ids: &[SpeciesId]) -> Result<Vec<Taxon>> {
        *self.taxa_calls.lock().unwrap() += 1;
        match &self.taxa {
            Some(taxa) => Ok(taxa
                .iter()
                .filter(|t| ids.contains(&t.id))
                .cloned()
                .collect()),
            None => Err(SurveyError::ApiStatusError {
                status: 503,
                url: "scripted://taxa".to_string(),
            }),
        }
    }
}
