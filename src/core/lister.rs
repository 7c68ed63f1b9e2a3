use crate::core::filter::SpeciesFilter;
use crate::core::pagination::collect_pages;
use crate::domain::model::{PlaceId, SpeciesEntry};
use crate::domain::ports::ObservationSource;
use crate::utils::error::Result;
use std::collections::HashSet;

/// Produces the species to process for a place.
pub struct SpeciesLister<'a, A: ObservationSource> {
    source: &'a A,
    max_pages: u32,
}

impl<'a, A: ObservationSource> SpeciesLister<'a, A> {
    pub fn new(source: &'a A, max_pages: u32) -> Self {
        Self { source, max_pages }
    }

    /// With a filter, returns exactly the filtered ids without touching the
    /// API. Otherwise pages through the place's species counts; any failed
    /// page fails the whole listing.
    pub async fn list(
        &self,
        place: PlaceId,
        filter: Option<&SpeciesFilter>,
    ) -> Result<Vec<SpeciesEntry>> {
        if let Some(filter) = filter {
            tracing::info!(
                "Using species filter with {} ids, skipping species discovery",
                filter.len()
            );
            return Ok(filter
                .ids()
                .iter()
                .map(|&id| SpeciesEntry { id, taxon: None })
                .collect());
        }

        tracing::info!("Listing species observed at place {}", place);
        let source = self.source;
        let counts = collect_pages("species counts", self.max_pages, move |page| {
            source.species_counts(place, page)
        })
        .await?;

        let mut seen = HashSet::new();
        let species: Vec<SpeciesEntry> = counts
            .into_iter()
            .filter(|entry| seen.insert(entry.taxon.id))
            .map(|entry| {
                tracing::debug!(
                    "Listed {} ({}) with {} observations",
                    entry.taxon.id,
                    entry.taxon.latin_name,
                    entry.count
                );
                SpeciesEntry {
                    id: entry.taxon.id,
                    taxon: Some(entry.taxon),
                }
            })
            .collect();

        tracing::info!("Found {} distinct species at place {}", species.len(), place);
        Ok(species)
    }
}
