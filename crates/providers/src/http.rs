//! Shared HTTP plumbing for the reqwest-based adapters.

use std::time::Duration;

use veloce_core::error::ProviderError;
use tracing::warn;

/// Build a client with a request timeout.
pub fn client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

/// Map a transport failure (connect, timeout, body read) to a provider error.
pub fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Pass 2xx responses through; turn everything else into a provider error.
pub async fn check_status(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(service, status = status.as_u16(), body = %body, "Upstream returned error");
    Err(ProviderError::from_status(status.as_u16(), body))
}

/// Decode a JSON body, reporting shape mismatches as `InvalidResponse`.
pub async fn json_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_success_status_is_mapped() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(429)
            .create_async()
            .await;

        let response = client(5).get(server.url()).send().await.unwrap();
        let err = check_status("test", response).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let err = client(2)
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .map_err(transport_error)
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Network(_) | ProviderError::Timeout(_)
        ));
    }
}
