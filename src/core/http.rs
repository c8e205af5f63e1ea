use crate::utils::error::{Result, TravelError};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// 發出單一 GET 請求並解析 JSON。
///
/// 查詢字串帶有金鑰，所以日誌與錯誤訊息只保留端點本身。
pub async fn fetch_json(
    client: &Client,
    endpoint: &str,
    params: &[(&str, String)],
    timeout: Duration,
) -> Result<Value> {
    tracing::debug!("📡 Making API request to: {}", endpoint);

    let response = client
        .get(endpoint)
        .query(params)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| TravelError::Transport(e.without_url()))?;

    let status = response.status();
    tracing::debug!("📡 API response status: {}", status);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        tracing::error!("❌ API request to {} failed with status: {}", endpoint, status);
        return Err(TravelError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    let json_data: Value = response
        .json()
        .await
        .map_err(|e| TravelError::Transport(e.without_url()))?;
    Ok(json_data)
}

/// Google 服務的 `status` 欄位
pub fn provider_status(payload: &Value) -> &str {
    payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN")
}
