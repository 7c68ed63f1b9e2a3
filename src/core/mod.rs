pub mod aggregator;
pub mod etl;
pub mod fetcher;
pub mod filter;
pub mod lister;
pub mod pagination;
pub mod pipeline;
pub mod rate_limiter;
pub mod report;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{Extraction, OutputRow, SpeciesObservations};
pub use crate::domain::ports::{ConfigProvider, ObservationSource, Pipeline, Storage};
pub use crate::utils::error::Result;
