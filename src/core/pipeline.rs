use crate::core::aggregator::aggregate;
use crate::core::fetcher::ObservationFetcher;
use crate::core::filter::SpeciesFilter;
use crate::core::lister::SpeciesLister;
use crate::core::report::ReportWriter;
use crate::core::{ConfigProvider, ObservationSource, Pipeline, Storage};
use crate::domain::model::{
    Extraction, OutputRow, SkippedSpecies, SpeciesEntry, SpeciesId, SpeciesObservations, Taxon,
};
use crate::utils::error::{Result, SurveyError};
use std::collections::HashMap;

/// List species at a place, fetch each one's observations, aggregate and
/// write the CSV summary.
pub struct SurveyPipeline<S: Storage, C: ConfigProvider, A: ObservationSource> {
    storage: S,
    config: C,
    source: A,
}

impl<S: Storage, C: ConfigProvider, A: ObservationSource> SurveyPipeline<S, C, A> {
    pub fn new(storage: S, config: C, source: A) -> Self {
        Self {
            storage,
            config,
            source,
        }
    }

    pub fn source(&self) -> &A {
        &self.source
    }

    async fn load_filter(&self) -> Result<Option<SpeciesFilter>> {
        match self.config.filter_path() {
            Some(path) => SpeciesFilter::load(&self.storage, path).await,
            None => Ok(None),
        }
    }

    /// Metadata for species the listing did not describe. Failure only costs
    /// metadata, never the species.
    async fn lookup_taxa(&self, entries: &[SpeciesEntry]) -> HashMap<SpeciesId, Taxon> {
        let missing: Vec<SpeciesId> = entries
            .iter()
            .filter(|e| e.taxon.is_none())
            .map(|e| e.id)
            .collect();
        if missing.is_empty() {
            return HashMap::new();
        }

        match self.source.taxa(&missing).await {
            Ok(taxa) => taxa.into_iter().map(|t| (t.id, t)).collect(),
            Err(e) => {
                tracing::warn!(
                    "⚠️ Taxon lookup for {} filtered species failed, using observation metadata: {}",
                    missing.len(),
                    e
                );
                HashMap::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, A: ObservationSource> Pipeline for SurveyPipeline<S, C, A> {
    async fn extract(&self) -> Result<Extraction> {
        let place = self.config.place_id();
        let max_pages = self.config.max_pages();
        let filter = self.load_filter().await?;

        let entries = SpeciesLister::new(&self.source, max_pages)
            .list(place, filter.as_ref())
            .await
            .map_err(SurveyError::listing)?;
        let mut known = self.lookup_taxa(&entries).await;

        let fetcher = ObservationFetcher::new(&self.source, max_pages);
        let mut extraction = Extraction::default();
        let total = entries.len();

        for (index, entry) in entries.into_iter().enumerate() {
            let name = entry
                .taxon
                .as_ref()
                .or_else(|| known.get(&entry.id))
                .map(|t| t.latin_name.clone())
                .unwrap_or_default();
            tracing::info!(
                "[{}/{}] Fetching observations for {} (ID: {})",
                index + 1,
                total,
                name,
                entry.id
            );

            match fetcher.fetch(entry.id, place).await {
                Ok(batch) => {
                    let taxon = entry
                        .taxon
                        .or_else(|| known.remove(&entry.id))
                        .or(batch.taxon)
                        .unwrap_or_else(|| {
                            tracing::warn!("No taxonomy available for species {}", entry.id);
                            Taxon::unknown(entry.id)
                        });
                    extraction.species.push(SpeciesObservations {
                        taxon,
                        months: batch.months,
                    });
                }
                Err(e) => {
                    tracing::warn!("⚠️ Skipping species {}: {}", entry.id, e);
                    extraction.skipped.push(SkippedSpecies {
                        id: entry.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(extraction)
    }

    async fn transform(&self, data: Vec<SpeciesObservations>) -> Result<Vec<OutputRow>> {
        let mut rows = Vec::with_capacity(data.len());
        for species in data {
            let stat = aggregate(&species.months);
            if stat.peak_month.is_none() {
                tracing::warn!(
                    "WARNING: No histogram data for {} (ID: {})",
                    species.taxon.latin_name,
                    species.taxon.id
                );
            }
            rows.push(OutputRow::new(&species.taxon, &stat));
        }
        Ok(rows)
    }

    async fn load(&self, rows: Vec<OutputRow>) -> Result<String> {
        let path = self.config.output_path();
        ReportWriter::new(&self.storage).write(path, &rows).await?;
        Ok(path.to_string())
    }
}
