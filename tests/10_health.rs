mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    // We consider OK or SERVICE_UNAVAILABLE acceptable as a basic liveness check
    assert!(
        res.status() == StatusCode::OK || res.status() == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        res.status()
    );

    // Should be valid JSON with the envelope fields
    let body = res.json::<serde_json::Value>().await?;
    assert!(body.get("success").is_some());
    Ok(())
}

#[tokio::test]
async fn serves_static_frontend_at_root() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/", server.base_url)).send().await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await?;
    assert!(body.contains("Datadock"), "unexpected index page: {}", body);
    Ok(())
}
