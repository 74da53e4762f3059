mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn protected_routes_reject_missing_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/api/data", "/api/data/types", "/api/data/fields", "/api/data/aggregate"] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await?;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path: {}", path);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["code"], "UNAUTHORIZED", "path: {}", path);
    }
    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_garbage_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/data/types", server.base_url))
        .bearer_auth("not.a.real.token")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn fields_requires_record_type() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/data/fields", server.base_url))
        .bearer_auth(common::mint_token("tester"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Missing recordType");
    Ok(())
}

#[tokio::test]
async fn aggregate_rejects_unknown_operation() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/data/aggregate", server.base_url))
        .query(&[("recordType", "sales"), ("field", "price"), ("op", "median")])
        .bearer_auth(common::mint_token("tester"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "invalid operation: median");
    Ok(())
}

#[tokio::test]
async fn upload_rejects_unsupported_file_type() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new()
        .part(
            "datafile",
            reqwest::multipart::Part::bytes(b"a,b\n1,2\n".to_vec()).file_name("records.xml"),
        )
        .text("recordType", "sales");

    let res = client
        .post(format!("{}/api/data/upload", server.base_url))
        .bearer_auth(common::mint_token("tester"))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Unsupported file type. Upload CSV or JSON.");
    Ok(())
}

#[tokio::test]
async fn upload_requires_record_type() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().part(
        "datafile",
        reqwest::multipart::Part::bytes(b"userId,price\nu-1,2\n".to_vec()).file_name("records.csv"),
    );

    let res = client
        .post(format!("{}/api/data/upload", server.base_url))
        .bearer_auth(common::mint_token("tester"))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Missing recordType");
    Ok(())
}
