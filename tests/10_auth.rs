mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::Value;

#[tokio::test]
async fn health_endpoint_is_public() -> Result<()> {
    let Some(ctx) = common::setup().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", ctx.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "jotadb");
    Ok(())
}

#[tokio::test]
async fn bearer_gate_rejects_missing_header() -> Result<()> {
    let Some(ctx) = common::setup().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/tasks", ctx.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<Value>().await?;
    assert!(body["detail"].is_string());
    Ok(())
}

#[tokio::test]
async fn bearer_gate_rejects_malformed_scheme() -> Result<()> {
    let Some(ctx) = common::setup().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/tasks", ctx.base_url))
        .header("Authorization", format!("Token {}", common::SECRET))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn bearer_gate_rejects_wrong_secret() -> Result<()> {
    let Some(ctx) = common::setup().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/tasks", ctx.base_url))
        .bearer_auth("not-the-secret")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn auth_client_validates_a_known_key() -> Result<()> {
    let Some(ctx) = common::setup().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = common::authed(&client, Method::GET, format!("{}/auth/client", ctx.base_url))
        .header("X-API-Key", common::CLIENT_A_KEY)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["client_key"], common::CLIENT_A_KEY);
    assert_eq!(body["id"], ctx.client_a.id.to_string());
    Ok(())
}

#[tokio::test]
async fn auth_client_rejects_unknown_and_inactive_keys() -> Result<()> {
    let Some(ctx) = common::setup().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = common::authed(&client, Method::GET, format!("{}/auth/client", ctx.base_url))
        .header("X-API-Key", "no-such-key")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = common::authed(&client, Method::GET, format!("{}/auth/client", ctx.base_url))
        .header("X-API-Key", common::RETIRED_CLIENT_KEY)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn auth_internal_validates_service_credentials() -> Result<()> {
    let Some(ctx) = common::setup().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = common::authed(&client, Method::GET, format!("{}/auth/internal", ctx.base_url))
        .header("X-Client-ID", common::SERVICE_ID)
        .header("X-API-Key", common::SERVICE_KEY)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["id"], common::SERVICE_ID);
    assert_eq!(body["role"], ctx.service.role.clone().unwrap_or_default());

    // Wrong key for a known id
    let res = common::authed(&client, Method::GET, format!("{}/auth/internal", ctx.base_url))
        .header("X-Client-ID", common::SERVICE_ID)
        .header("X-API-Key", "wrong-key")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Unknown id
    let res = common::authed(&client, Method::GET, format!("{}/auth/internal", ctx.base_url))
        .header("X-Client-ID", "NoSuchService")
        .header("X-API-Key", common::SERVICE_KEY)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
