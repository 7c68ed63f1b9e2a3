pub mod wire;

use crate::config::ApiConfig;
use crate::core::rate_limiter::RateLimiter;
use crate::domain::model::{Observation, Page, PlaceId, SpeciesId, Taxon, TaxonCount};
use crate::domain::ports::ObservationSource;
use crate::utils::error::{Result, SurveyError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Mutex;
use wire::{ObservationRecord, PagedResponse, SpeciesCountRecord, TaxonRecord};

/// Most ids the taxa endpoint accepts in one call.
pub const TAXA_BATCH_SIZE: usize = 30;

/// HTTP client for the iNaturalist v1 API.
///
/// Every request, whichever endpoint, first passes through the shared rate
/// limiter.
pub struct InatClient {
    client: Client,
    base_url: String,
    quality_grade: Option<String>,
    species_per_page: u32,
    observations_per_page: u32,
    api_token: Option<String>,
    limiter: Mutex<RateLimiter>,
}

impl InatClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            quality_grade: config.quality_grade().map(str::to_string),
            species_per_page: config.species_per_page,
            observations_per_page: config.observations_per_page,
            api_token: config.api_token().map(str::to_string),
            limiter: Mutex::new(RateLimiter::per_minute(config.calls_per_minute)),
        })
    }

    /// Replaces the limiter built from `calls_per_minute`.
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Mutex::new(limiter);
        self
    }

    fn base_query(&self, per_page: u32) -> Vec<(&'static str, String)> {
        let mut query = vec![("per_page", per_page.to_string())];
        if let Some(grade) = &self.quality_grade {
            query.push(("quality_grade", grade.clone()));
        }
        query
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        self.limiter.lock().await.acquire().await;

        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("API call: GET {} with params: {:?}", url, query);

        let mut request = self.client.get(&url).query(query);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(SurveyError::ApiStatusError {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ObservationSource for InatClient {
    async fn species_counts(&self, place: PlaceId, page: u32) -> Result<Page<TaxonCount>> {
        let mut query = self.base_query(self.species_per_page);
        query.push(("page", page.to_string()));
        query.push(("place_id", place.to_string()));

        let response: PagedResponse<SpeciesCountRecord> = self
            .get_json("observations/species_counts", &query)
            .await?;
        Ok(response.into_page(page, self.species_per_page, TaxonCount::from))
    }

    async fn observations(
        &self,
        species: SpeciesId,
        place: PlaceId,
        after: u64,
    ) -> Result<Page<Observation>> {
        // Numbered pages stop working past 10,000 results; an id cursor does not.
        let mut query = self.base_query(self.observations_per_page);
        query.push(("taxon_id", species.to_string()));
        query.push(("place_id", place.to_string()));
        query.push(("order_by", "id".to_string()));
        query.push(("order", "asc".to_string()));
        query.push(("id_above", after.to_string()));

        let response: PagedResponse<ObservationRecord> =
            self.get_json("observations", &query).await?;
        Ok(response.into_page(1, self.observations_per_page, Observation::from))
    }

    async fn taxa(&self, ids: &[SpeciesId]) -> Result<Vec<Taxon>> {
        let mut taxa = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(TAXA_BATCH_SIZE) {
            let joined = chunk
                .iter()
                .map(SpeciesId::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let query = [("per_page", TAXA_BATCH_SIZE.to_string())];

            let response: PagedResponse<TaxonRecord> =
                self.get_json(&format!("taxa/{}", joined), &query).await?;
            taxa.extend(response.results.into_iter().map(Taxon::from));
        }
        Ok(taxa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn config(server: &MockServer) -> ApiConfig {
        ApiConfig {
            base_url: server.base_url(),
            calls_per_minute: 1_000,
            ..ApiConfig::default()
        }
    }

    #[tokio::test]
    async fn test_species_counts_sends_paging_and_filters() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/observations/species_counts")
                .query_param("place_id", "51347")
                .query_param("quality_grade", "research")
                .query_param("per_page", "500")
                .query_param("page", "2");
            then.status(200).json_body(serde_json::json!({
                "total_results": 501,
                "page": 2,
                "per_page": 500,
                "results": [
                    {"count": 12, "taxon": {"id": 47763, "name": "Katharina tunicata",
                        "preferred_common_name": "Black Katy Chiton",
                        "ancestor_ids": [48460, 1, 47115, 47763]}}
                ]
            }));
        });

        let client = InatClient::new(&config(&server)).unwrap();
        let page = client.species_counts(PlaceId(51347), 2).await.unwrap();

        api_mock.assert();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].count, 12);
        assert_eq!(page.results[0].taxon.phylum, "Mollusca");
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_observations_query_and_months() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/observations")
                .query_param("taxon_id", "100")
                .query_param("place_id", "51347")
                .query_param("order_by", "id")
                .query_param("order", "asc")
                .query_param("id_above", "0")
                .query_param("per_page", "200");
            then.status(200).json_body(serde_json::json!({
                "total_results": 2,
                "page": 1,
                "per_page": 200,
                "results": [
                    {"id": 401, "observed_on": "2022-01-03", "observed_on_details": {"month": 1}},
                    {"id": 977, "observed_on": "2022-05-20"}
                ]
            }));
        });

        let client = InatClient::new(&config(&server)).unwrap();
        let page = client
            .observations(SpeciesId(100), PlaceId(51347), 0)
            .await
            .unwrap();

        api_mock.assert();
        let ids: Vec<u64> = page.results.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![401, 977]);
        let months: Vec<u8> = page
            .results
            .iter()
            .filter_map(|o| o.month)
            .map(|m| m.number())
            .collect();
        assert_eq!(months, vec![1, 5]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/observations/species_counts");
            then.status(429);
        });

        let client = InatClient::new(&config(&server)).unwrap();
        let err = client.species_counts(PlaceId(1), 1).await.unwrap_err();

        assert!(matches!(err, SurveyError::ApiStatusError { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/observations");
            then.status(200).body("<html>maintenance</html>");
        });

        let client = InatClient::new(&config(&server)).unwrap();
        let err = client
            .observations(SpeciesId(1), PlaceId(1), 0)
            .await
            .unwrap_err();

        assert!(matches!(err, SurveyError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_taxa_lookup_and_bearer_token() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/taxa/5,9")
                .header("Authorization", "Bearer t0ken");
            then.status(200).json_body(serde_json::json!({
                "total_results": 1,
                "results": [{"id": 5, "name": "Pisaster ochraceus",
                    "ancestors": [{"rank": "kingdom", "name": "Animalia"},
                                  {"rank": "phylum", "name": "Echinodermata"}]}]
            }));
        });

        let mut api = config(&server);
        api.api_token = Some("t0ken".to_string());
        let client = InatClient::new(&api).unwrap();
        let taxa = client.taxa(&[SpeciesId(5), SpeciesId(9)]).await.unwrap();

        api_mock.assert();
        assert_eq!(taxa.len(), 1);
        assert_eq!(taxa[0].phylum, "Echinodermata");
    }

    #[tokio::test]
    async fn test_any_quality_grade_is_not_sent() {
        let server = MockServer::start();
        let graded = server.mock(|when, then| {
            when.method(GET)
                .path("/observations/species_counts")
                .query_param_exists("quality_grade");
            then.status(500);
        });
        let ungraded = server.mock(|when, then| {
            when.method(GET).path("/observations/species_counts");
            then.status(200)
                .json_body(serde_json::json!({"total_results": 0, "results": []}));
        });

        let mut api = config(&server);
        api.quality_grade = "any".to_string();
        let client = InatClient::new(&api).unwrap();
        let page = client.species_counts(PlaceId(1), 1).await.unwrap();

        graded.assert_hits(0);
        ungraded.assert();
        assert!(page.results.is_empty());
    }
    #[tokio::test]
    async fn test_every_endpoint_waits_for_the_rate_limiter() {
        let server = MockServer::start();
        let empty = serde_json::json!({"total_results": 0, "results": []});
        let species = server.mock(|when, then| {
            when.method(GET).path("/observations/species_counts");
            then.status(200).json_body(empty.clone());
        });
        let observations = server.mock(|when, then| {
            when.method(GET).path("/observations");
            then.status(200).json_body(empty.clone());
        });
        let taxa = server.mock(|when, then| {
            when.method(GET).path("/taxa/5");
            then.status(200).json_body(empty.clone());
        });

        let window = Duration::from_millis(300);
        let client = InatClient::new(&config(&server))
            .unwrap()
            .with_rate_limiter(RateLimiter::new(1, window));

        let started = std::time::Instant::now();
        client.species_counts(PlaceId(1), 1).await.unwrap();
        client
            .observations(SpeciesId(5), PlaceId(1), 0)
            .await
            .unwrap();
        client.taxa(&[SpeciesId(5)]).await.unwrap();

        // One call per window: the second and third calls each wait a full window.
        assert!(started.elapsed() >= window * 2);
        species.assert();
        observations.assert();
        taxa.assert();
    }
}
