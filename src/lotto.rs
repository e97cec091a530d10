use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{RelayError, RelayResult};

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

// Prize tier and running-number ids used by the upstream payload.
pub const PRIZE_FIRST: &str = "prizeFirst";
pub const PRIZE_FIRST_NEAR: &str = "prizeFirstNear";
pub const PRIZE_SECOND: &str = "prizeSecond";
pub const PRIZE_THIRD: &str = "prizeThird";
pub const PRIZE_FOURTH: &str = "prizeFourth";
pub const PRIZE_FIFTH: &str = "prizeFifth";
pub const RUNNING_FRONT_THREE: &str = "runningNumberFrontThree";
pub const RUNNING_BACK_THREE: &str = "runningNumberBackThree";
pub const RUNNING_BACK_TWO: &str = "runningNumberBackTwo";

/// Client for the lottery result API (`GET {base}/latest`).
pub struct LottoClient {
    client: Client,
    base_url: String,
}

impl LottoClient {
    pub fn new(base_url: impl Into<String>) -> RelayResult<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| RelayError::Upstream(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch the latest draw. No side effects; safe to call repeatedly.
    pub async fn latest(&self) -> RelayResult<DrawResult> {
        let url = format!("{}/latest", self.base_url.trim_end_matches('/'));
        debug!("Fetching lottery result from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Upstream(format!(
                "lottery API returned HTTP {status}"
            )));
        }

        let body: LottoResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Upstream(format!("failed to decode payload: {e}")))?;

        if body.status != "success" {
            return Err(RelayError::Upstream(format!(
                "lottery API status was {:?}",
                body.status
            )));
        }

        body.response
            .ok_or_else(|| RelayError::Upstream("payload had no result object".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct LottoResponse {
    #[serde(default)]
    status: String,
    response: Option<DrawResult>,
}

/// The latest draw as reported upstream. Missing sub-collections decode as
/// empty; completeness is a formatting concern, not a fetch error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub prizes: Vec<PrizeTier>,
    #[serde(default)]
    pub running_numbers: Vec<RunningNumbers>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrizeTier {
    pub id: String,
    #[serde(default)]
    pub number: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunningNumbers {
    pub id: String,
    #[serde(default)]
    pub number: Vec<String>,
}

impl DrawResult {
    /// Identity used for broadcast dedup: the reported date, falling back to
    /// the detail endpoint. `None` means there is nothing to send yet.
    pub fn identity(&self) -> Option<&str> {
        self.date
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.endpoint.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn prize(&self, id: &str) -> Option<&PrizeTier> {
        self.prizes.iter().find(|p| p.id == id)
    }

    pub fn running(&self, id: &str) -> Option<&RunningNumbers> {
        self.running_numbers.iter().find(|r| r.id == id)
    }
}
