//! 서버 가용성 점검.
//!
//! `GET <url>/health` 성공 시 가용, 실패하면 루트(`GET <url>`)로 재확인한다.

use chatlink_core::error::CoreError;
use std::time::Duration;
use tracing::{debug, info};

/// 서버 점검기
pub struct ServerProbe {
    client: reqwest::Client,
}

impl ServerProbe {
    /// 새 점검기 생성 (요청당 타임아웃)
    pub fn new(timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 생성 실패: {e}")))?;
        Ok(Self { client })
    }

    /// 단일 서버 점검 (health → 루트)
    pub async fn check(&self, server_url: &str) -> bool {
        let base = normalize(server_url);
        if self.is_ok(&format!("{base}/health")).await {
            return true;
        }
        self.is_ok(&base).await
    }

    /// 후보 목록 중 가용 서버
    ///
    /// 모든 후보의 `/health`를 먼저 확인하고, 하나도 응답하지 않으면
    /// 루트 엔드포인트로 다시 확인한다.
    pub async fn available(&self, candidates: &[String]) -> Vec<String> {
        let mut available = Vec::new();
        for candidate in candidates {
            let base = normalize(candidate);
            if self.is_ok(&format!("{base}/health")).await {
                info!("서버 가용: {base}");
                available.push(candidate.clone());
            }
        }

        if available.is_empty() {
            for candidate in candidates {
                let base = normalize(candidate);
                if self.is_ok(&base).await {
                    info!("서버 가용 (root): {base}");
                    available.push(candidate.clone());
                }
            }
        }

        available
    }

    async fn is_ok(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                debug!("점검 {url}: {}", resp.status());
                ok
            }
            Err(e) => {
                debug!("점검 실패 {url}: {e}");
                false
            }
        }
    }
}

/// 스킴이 없으면 `http://`를 붙이고 끝의 `/`를 제거
fn normalize(server_url: &str) -> String {
    let trimmed = server_url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe() -> ServerProbe {
        ServerProbe::new(Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn normalize_adds_scheme_and_strips_slash() {
        assert_eq!(normalize("10.0.2.2:3000/"), "http://10.0.2.2:3000");
        assert_eq!(normalize("https://chat.example.org/"), "https://chat.example.org");
    }

    #[tokio::test]
    async fn health_endpoint_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(200)
            .create_async()
            .await;

        assert!(probe().check(&server.url()).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn falls_back_to_root() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(404)
            .create_async()
            .await;
        let root = server.mock("GET", "/").with_status(200).create_async().await;

        assert!(probe().check(&server.url()).await);
        root.assert_async().await;
    }

    #[tokio::test]
    async fn unavailable_server() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(500)
            .create_async()
            .await;
        server.mock("GET", "/").with_status(503).create_async().await;

        assert!(!probe().check(&server.url()).await);
    }

    #[tokio::test]
    async fn available_filters_candidates() {
        let mut up = mockito::Server::new_async().await;
        up.mock("GET", "/health")
            .with_status(200)
            .create_async()
            .await;
        let mut down = mockito::Server::new_async().await;
        down.mock("GET", "/health")
            .with_status(500)
            .create_async()
            .await;

        let candidates = vec![down.url(), up.url()];
        let available = probe().available(&candidates).await;
        assert_eq!(available, vec![up.url()]);
    }
}
