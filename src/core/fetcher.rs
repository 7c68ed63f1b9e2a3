use crate::core::pagination::collect_after;
use crate::domain::model::{Observation, ObservationBatch, PlaceId, SpeciesId};
use crate::domain::ports::ObservationSource;
use crate::utils::error::Result;

/// Retrieves every observation of one species at one place.
pub struct ObservationFetcher<'a, A: ObservationSource> {
    source: &'a A,
    max_pages: u32,
}

impl<'a, A: ObservationSource> ObservationFetcher<'a, A> {
    pub fn new(source: &'a A, max_pages: u32) -> Self {
        Self { source, max_pages }
    }

    pub async fn fetch(&self, species: SpeciesId, place: PlaceId) -> Result<ObservationBatch> {
        let source = self.source;
        let what = format!("observations of species {}", species);
        let observations = collect_after(
            &what,
            self.max_pages,
            |observation: &Observation| observation.id,
            move |after| source.observations(species, place, after),
        )
        .await?;

        let mut batch = ObservationBatch {
            months: Vec::with_capacity(observations.len()),
            undated: 0,
            taxon: None,
        };
        for observation in observations {
            match observation.month {
                Some(month) => batch.months.push(month),
                None => batch.undated += 1,
            }
            // Descendant taxa (subspecies) are also returned; only the species itself counts.
            if batch.taxon.is_none() {
                batch.taxon = observation.taxon.filter(|t| t.id == species);
            }
        }

        if batch.undated > 0 {
            tracing::debug!(
                "Species {} has {} observations without a usable date",
                species,
                batch.undated
            );
        }
        Ok(batch)
    }
}
