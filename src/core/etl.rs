use crate::core::Pipeline;
use crate::domain::model::SkippedSpecies;
use crate::utils::error::Result;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub rows_written: usize,
    pub empty_histograms: usize,
    pub skipped: Vec<SkippedSpecies>,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        tracing::info!("Starting species survey");

        let extraction = self.pipeline.extract().await?;
        tracing::info!(
            "Fetched observations for {} species ({} skipped)",
            extraction.species.len(),
            extraction.skipped.len()
        );

        let rows = self.pipeline.transform(extraction.species).await?;
        let empty_histograms = rows
            .iter()
            .filter(|row| row.month_with_most_observations.is_none())
            .count();

        let rows_written = rows.len();
        let output_path = self.pipeline.load(rows).await?;

        if !extraction.skipped.is_empty() {
            tracing::warn!(
                "⚠️ {} species were skipped because their observations could not be fetched:",
                extraction.skipped.len()
            );
            for skipped in &extraction.skipped {
                tracing::warn!("  - {}: {}", skipped.id, skipped.reason);
            }
        }
        if empty_histograms > 0 {
            tracing::warn!("{} species have no histogram data", empty_histograms);
        }
        tracing::info!(
            "Wrote {} species to {} in {:?}",
            rows_written,
            output_path,
            started.elapsed()
        );

        Ok(RunSummary {
            output_path,
            rows_written,
            empty_histograms,
            skipped: extraction.skipped,
        })
    }
}
