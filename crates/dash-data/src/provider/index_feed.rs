//! KRX 지수 피드 클라이언트.
//!
//! 한국거래소 정보데이터시스템의 `getJsonData.cmd` 엔드포인트에서
//! 코스피/코스닥 지수 정보를 가져옵니다. 응답의 `output` 배열에서
//! 대표 지수 행(두 번째 행)을 키-값 맵 그대로 반환합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Local;
use serde_json::Value;
use tracing::{debug, info};

use crate::source::IndexFeed;
use crate::{DataError, Result};

/// 지수 통계 화면의 bld 코드.
const INDEX_BLD: &str = "dbms/MDC/STAT/standard/MDCSTAT00101";

/// KRX 정보데이터시스템 지수 피드.
#[derive(Clone)]
pub struct KrxIndexFeed {
    client: reqwest::Client,
    base_url: String,
}

impl Default for KrxIndexFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl KrxIndexFeed {
    /// 운영 엔드포인트를 바라보는 클라이언트 생성.
    pub fn new() -> Self {
        Self::with_base_url("https://data.krx.co.kr")
    }

    /// Base URL 지정 생성 (테스트용).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl IndexFeed for KrxIndexFeed {
    async fn fetch_index(&self, midclss_cd: &str) -> Result<HashMap<String, String>> {
        let url = format!("{}/comm/bldAttendant/getJsonData.cmd", self.base_url);
        let today = Local::now().format("%Y%m%d").to_string();

        let form: [(&str, &str); 7] = [
            ("bld", INDEX_BLD),
            ("locale", "ko_KR"),
            ("idxIndMidclssCd", midclss_cd),
            ("trdDd", &today),
            ("share", "2"),
            ("money", "3"),
            ("csvxls_isNo", "false"),
        ];

        debug!(url = %url, midclss_cd = midclss_cd, "지수 데이터 요청");

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("Origin", "https://data.krx.co.kr")
            .header(
                "Referer",
                "https://data.krx.co.kr/contents/MDC/MDI/mdiLoader/index.cmd?menuId=MDC0201010105",
            )
            .header("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DataError::FetchError(format!(
                "지수 조회 실패 [{}]: HTTP {}",
                midclss_cd,
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let row = body
            .get("output")
            .and_then(Value::as_array)
            // 첫 행은 섹션 합계, 두 번째 행이 대표 지수
            .and_then(|rows| rows.get(1))
            .and_then(Value::as_object)
            .ok_or_else(|| {
                DataError::ParseError(format!("지수 응답에 output[1]이 없음 [{}]", midclss_cd))
            })?;

        let record: HashMap<String, String> = row
            .iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), text)
            })
            .collect();

        info!(midclss_cd = midclss_cd, fields = record.len(), "지수 데이터 수신 완료");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_for(server: &mockito::ServerGuard) -> KrxIndexFeed {
        KrxIndexFeed::with_base_url(server.url())
    }

    #[tokio::test]
    async fn fetch_index_returns_second_output_row() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/comm/bldAttendant/getJsonData.cmd")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "output": [
                        {"IDX_NM": "KRX 300", "CLSPRC_IDX": "1,700.11"},
                        {"IDX_NM": "코스피", "CLSPRC_IDX": "2,600.50", "FLUC_RT": "0.85"},
                        {"IDX_NM": "코스피 200", "CLSPRC_IDX": "350.20"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let record = feed_for(&server).fetch_index("02").await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.get("IDX_NM").map(String::as_str), Some("코스피"));
        assert_eq!(
            record.get("CLSPRC_IDX").map(String::as_str),
            Some("2,600.50")
        );
        assert_eq!(record.get("FLUC_RT").map(String::as_str), Some("0.85"));
    }

    #[tokio::test]
    async fn fetch_index_rejects_short_output() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/comm/bldAttendant/getJsonData.cmd")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"output": [{"IDX_NM": "KRX 300"}]}"#)
            .create_async()
            .await;

        let err = feed_for(&server).fetch_index("02").await.unwrap_err();
        assert!(matches!(err, DataError::ParseError(_)));
    }

    #[tokio::test]
    async fn fetch_index_propagates_http_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/comm/bldAttendant/getJsonData.cmd")
            .with_status(502)
            .create_async()
            .await;

        let err = feed_for(&server).fetch_index("03").await.unwrap_err();
        assert!(matches!(err, DataError::FetchError(_)));
    }
}
