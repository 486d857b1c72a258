//! BigQuery query execution client.
//!
//! Provides the [`WarehouseClient`] seam used by the HTTP layer and its
//! production implementation, [`BigQueryClient`], which runs a query job with
//! Application Default Credentials, polls until the job completes, follows
//! result pages, and decodes everything into [`WarehouseRow`]s.

use std::time::Duration;

use async_trait::async_trait;
use gcp_bigquery_client::client_builder::ClientBuilder;
use gcp_bigquery_client::error::BQError;
use gcp_bigquery_client::model::get_query_results_parameters::GetQueryResultsParameters;
use gcp_bigquery_client::model::get_query_results_response::GetQueryResultsResponse;
use gcp_bigquery_client::model::query_request::QueryRequest;
use gcp_bigquery_client::model::query_response::QueryResponse;
use gcp_bigquery_client::model::table_row::TableRow;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use userlake_core::WarehouseRow;

use crate::config::BigQueryConfig;
use crate::result::{columns_from_schema, decode_rows, WarehouseColumn};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors that can occur while executing a warehouse query.
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// The caller's cancellation token fired before the query finished.
    #[error("query was cancelled")]
    Cancelled,

    /// The BigQuery client could not be constructed (credentials, TLS, ...).
    #[error("BigQuery client error: {0}")]
    Client(String),

    /// BigQuery rejected or failed the query (auth, quota, syntax, missing table, network).
    #[error("BigQuery query failed: {0}")]
    QueryFailed(String),

    /// The response did not have the shape the REST API documents.
    #[error("malformed BigQuery response: {0}")]
    MalformedResponse(String),
}

impl From<BQError> for WarehouseError {
    fn from(e: BQError) -> Self {
        WarehouseError::QueryFailed(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Seam
// ---------------------------------------------------------------------------

/// Something that can run a SQL statement and hand back decoded rows.
///
/// Implementations must return [`WarehouseError::Cancelled`] (and nothing
/// else) once `cancel` fires, and must be safe to share across requests.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    async fn execute_query(
        &self,
        sql: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<WarehouseRow>, WarehouseError>;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Initial delay between `getQueryResults` polls.
const INITIAL_POLL_DELAY_MS: u64 = 200;
const MAX_POLL_DELAY_MS: u64 = 2000;
const POLL_BACKOFF_FACTOR: f64 = 1.5;

/// Client for executing queries against BigQuery.
///
/// Wraps the `gcp-bigquery-client` job API and adds:
/// - Polling with exponential backoff while the job is still running
/// - Result pagination via `pageToken`
/// - Cancellation through a [`CancellationToken`]
///
/// No retries: a failed call surfaces immediately.
pub struct BigQueryClient {
    config: BigQueryConfig,
    client: gcp_bigquery_client::Client,
}

impl BigQueryClient {
    /// Create a new [`BigQueryClient`] using Application Default Credentials.
    ///
    /// Credentials come from the platform (metadata server, workload identity,
    /// or `GOOGLE_APPLICATION_CREDENTIALS`); nothing is read from our config.
    pub async fn new(config: BigQueryConfig) -> Result<Self, WarehouseError> {
        let client = ClientBuilder::new()
            .build_from_application_default_credentials()
            .await
            .map_err(|e| WarehouseError::Client(e.to_string()))?;

        info!(
            project_id = %config.project_id,
            location = config.location.as_deref().unwrap_or("(auto)"),
            "BigQueryClient initialised"
        );

        Ok(Self { config, client })
    }

    /// Full lifecycle of one query, without cancellation handling:
    /// 1. `jobs.query`
    /// 2. Poll `getQueryResults` until the job is complete
    /// 3. Follow `pageToken` until every row has been fetched
    async fn run(&self, sql: &str) -> Result<Vec<WarehouseRow>, WarehouseError> {
        info!(sql = %sql, "Starting BigQuery query");

        let mut request = QueryRequest::new(sql);
        request.timeout_ms = Some(self.poll_timeout_ms());
        request.location = self.config.location.clone();

        let mut page = ResultPage::from(
            self.client
                .job()
                .query(&self.config.project_id, request)
                .await?,
        );

        let mut delay_ms = INITIAL_POLL_DELAY_MS;
        while !page.complete {
            let job_id = page.require_job_id()?;
            debug!(job_id = %job_id, delay_ms, "Query still running");
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            delay_ms = ((delay_ms as f64 * POLL_BACKOFF_FACTOR) as u64).min(MAX_POLL_DELAY_MS);

            page = self.fetch_page(&job_id, page.location.clone(), None).await?;
        }

        let columns = page.columns.clone();
        let mut rows = decode_rows(&columns, &page.rows);

        while let Some(token) = page.page_token.take() {
            let job_id = page.require_job_id()?;
            page = self
                .fetch_page(&job_id, page.location.clone(), Some(token))
                .await?;
            rows.extend(decode_rows(&columns, &page.rows));
        }

        debug!(columns = columns.len(), rows = rows.len(), "Parsed BigQuery results");
        Ok(rows)
    }

    async fn fetch_page(
        &self,
        job_id: &str,
        location: Option<String>,
        page_token: Option<String>,
    ) -> Result<ResultPage, WarehouseError> {
        let params = GetQueryResultsParameters {
            location: location.or_else(|| self.config.location.clone()),
            page_token,
            timeout_ms: Some(self.poll_timeout_ms()),
            ..Default::default()
        };
        let resp = self
            .client
            .job()
            .get_query_results(&self.config.project_id, job_id, params)
            .await?;
        Ok(ResultPage::from(resp))
    }

    fn poll_timeout_ms(&self) -> i32 {
        i32::try_from(self.config.poll_timeout_ms).unwrap_or(i32::MAX)
    }
}

#[async_trait]
impl WarehouseClient for BigQueryClient {
    async fn execute_query(
        &self,
        sql: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<WarehouseRow>, WarehouseError> {
        // TODO: issue jobs.cancel for the in-flight job once cancellation is
        // observed; today we only stop waiting on it.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("BigQuery query cancelled before completion");
                Err(WarehouseError::Cancelled)
            }
            result = self.run(sql) => result,
        }
    }
}

// ---------------------------------------------------------------------------
// Response normalisation
// ---------------------------------------------------------------------------

/// The parts of `jobs.query` / `getQueryResults` responses we act on.
struct ResultPage {
    complete: bool,
    job_id: Option<String>,
    location: Option<String>,
    page_token: Option<String>,
    columns: Vec<WarehouseColumn>,
    rows: Vec<TableRow>,
}

impl ResultPage {
    fn require_job_id(&self) -> Result<String, WarehouseError> {
        self.job_id.clone().ok_or_else(|| {
            WarehouseError::MalformedResponse("response has no job reference".into())
        })
    }
}

impl From<QueryResponse> for ResultPage {
    fn from(resp: QueryResponse) -> Self {
        let job = resp.job_reference.as_ref();
        Self {
            complete: resp.job_complete.unwrap_or(false),
            job_id: job.and_then(|j| j.job_id.clone()),
            location: job.and_then(|j| j.location.clone()),
            page_token: resp.page_token.clone(),
            columns: columns_from_schema(resp.schema.as_ref()),
            rows: resp.rows.unwrap_or_default(),
        }
    }
}

impl From<GetQueryResultsResponse> for ResultPage {
    fn from(resp: GetQueryResultsResponse) -> Self {
        let job = resp.job_reference.as_ref();
        Self {
            complete: resp.job_complete.unwrap_or(false),
            job_id: job.and_then(|j| j.job_id.clone()),
            location: job.and_then(|j| j.location.clone()),
            page_token: resp.page_token.clone(),
            columns: columns_from_schema(resp.schema.as_ref()),
            rows: resp.rows.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests: error shaping and the seam only, no GCP calls
// ---------------------------------------------------------------------------
