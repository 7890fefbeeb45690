//! Remote annealing service client (behind the `remote` feature).
//!
//! Posts the model artifact and asks for `num_reads` samples. The service
//! answers with bitstrings only; shape and energies are checked locally.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::artifact::QuboArtifact;
use crate::qubo::QuboModel;

use super::algorithm::{collect_samples, QuboSolver};
use super::error::SolverUnavailableError;
use super::types::{Sample, SolverConfig};

/// Timeout used when the config has no time limit.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RemoteSolver {
    endpoint: String,
}

impl RemoteSolver {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Serialize)]
struct RemoteRequest<'a> {
    artifact: &'a QuboArtifact,
    num_reads: usize,
    seed: u64,
}

#[derive(Deserialize)]
struct RemoteResponse {
    samples: Vec<RemoteSample>,
}

#[derive(Deserialize)]
struct RemoteSample {
    bits: Vec<u8>,
    #[serde(default = "one")]
    num_occurrences: u32,
}

fn one() -> u32 {
    1
}

impl QuboSolver for RemoteSolver {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn solve(
        &self,
        model: &QuboModel,
        config: &SolverConfig,
    ) -> Result<Vec<Sample>, SolverUnavailableError> {
        let timeout = config
            .time_limit_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SolverUnavailableError::Backend(err.to_string()))?;

        let artifact = QuboArtifact::from_model(model)
            .map_err(|err| SolverUnavailableError::Backend(err.to_string()))?;
        let body = RemoteRequest {
            artifact: &artifact,
            num_reads: config.num_reads,
            seed: config.seed,
        };

        let map_transport = |err: reqwest::Error| {
            if err.is_timeout() {
                SolverUnavailableError::Timeout {
                    limit_ms: timeout.as_millis() as u64,
                }
            } else {
                SolverUnavailableError::Backend(err.to_string())
            }
        };

        let response: RemoteResponse = client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(map_transport)?
            .error_for_status()
            .map_err(map_transport)?
            .json()
            .map_err(map_transport)?;

        tracing::debug!(
            endpoint = %self.endpoint,
            samples = response.samples.len(),
            "remote solver answered"
        );

        collect_samples(
            model,
            response
                .samples
                .into_iter()
                .map(|sample| (sample.bits, sample.num_occurrences)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::two_request_pool_model;

    #[test]
    fn unreachable_endpoint_is_unavailable() {
        let model = two_request_pool_model();
        let config = SolverConfig::default().with_time_limit_ms(500);
        let error = RemoteSolver::new("http://127.0.0.1:9/")
            .solve(&model, &config)
            .expect_err("nothing listens on the discard port");
        assert!(matches!(
            error,
            SolverUnavailableError::Backend(_) | SolverUnavailableError::Timeout { .. }
        ));
    }
}
