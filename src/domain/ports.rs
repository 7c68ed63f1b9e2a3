use crate::domain::model::{
    Extraction, Observation, OutputRow, Page, PlaceId, SpeciesId, SpeciesObservations, Taxon,
    TaxonCount,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn place_id(&self) -> PlaceId;
    fn output_path(&self) -> &str;
    fn filter_path(&self) -> Option<&str>;
    fn max_pages(&self) -> u32;
}

/// Read-only access to the remote observation API, one page per call.
#[async_trait]
pub trait ObservationSource: Send + Sync {
    async fn species_counts(&self, place: PlaceId, page: u32) -> Result<Page<TaxonCount>>;

    /// Observations with an id above `after`, in ascending id order.
    /// `total_results` counts every matching record left, not just this page.
    async fn observations(
        &self,
        species: SpeciesId,
        place: PlaceId,
        after: u64,
    ) -> Result<Page<Observation>>;

    /// Metadata for the given ids; ids unknown to the API are simply absent.
    async fn taxa(&self, ids: &[SpeciesId]) -> Result<Vec<Taxon>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Extraction>;
    async fn transform(&self, data: Vec<SpeciesObservations>) -> Result<Vec<OutputRow>>;
    async fn load(&self, rows: Vec<OutputRow>) -> Result<String>;
}
