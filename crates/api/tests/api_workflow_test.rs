use chrono::{NaiveDate, TimeZone, Utc};
use kabuka_api::server::{AppState, build_router};
use kabuka_core::common::time::FakeClockProvider;
use kabuka_core::market::entity::{
    RawFinancialRecord, RawMasterRecord, RawNumber, RawPriceRecord,
};
use kabuka_core::market::mock::MockMarketData;
use kabuka_core::market::port::MarketDataProvider;
use kabuka_screener::service::ScreeningService;
use kabuka_screener::settings::ScreeningSettings;
use reqwest::StatusCode;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

fn master_row(code: &str, name: &str) -> RawMasterRecord {
    RawMasterRecord {
        code: code.into(),
        name: Some(name.into()),
        market_code: Some("0111".into()),
        market_name: Some("プライム".into()),
        sector_name: Some("輸送用機器".into()),
    }
}

fn seeded_market() -> MockMarketData {
    let bars_day = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
    MockMarketData::new()
        .with_master(vec![master_row("72030", "Toyota"), master_row("67580", "Sony")])
        .with_bars_on(
            bars_day,
            vec![RawPriceRecord {
                date: "2026-03-03".into(),
                code: "72030".into(),
                close: Some(2490.0),
                adjusted_close: Some(2500.0),
                ..Default::default()
            }],
        )
        .with_financials(
            "72030",
            vec![RawFinancialRecord {
                fiscal_year: Some("2025".into()),
                eps: Some(RawNumber::from("125")),
                bps: Some(RawNumber::from("1500")),
                dividend_annual: Some(RawNumber::from("50")),
                net_income: Some(RawNumber::from("2000")),
                equity: Some(RawNumber::from("10000")),
                total_assets: Some(RawNumber::from("20000")),
                ..Default::default()
            }],
        )
        .with_financials(
            "7203",
            (2019..=2025)
                .map(|y| RawFinancialRecord {
                    fiscal_year: Some(y.to_string()),
                    revenue: Some(RawNumber::from(format!("{}", y * 10).as_str())),
                    ..Default::default()
                })
                .collect(),
        )
        .with_bars_for(
            "7203",
            vec![
                RawPriceRecord {
                    date: "2026-03-03".into(),
                    code: "72030".into(),
                    close: Some(2500.0),
                    ..Default::default()
                },
                RawPriceRecord {
                    date: "2026-03-02".into(),
                    code: "72030".into(),
                    close: Some(2480.0),
                    adjusted_close: Some(2470.0),
                    ..Default::default()
                },
            ],
        )
        .fail_financials_with("9999", 500)
}

// 帮助函数：在随机端口启动测试服务器
async fn spawn_test_server(
    mock: Arc<MockMarketData>,
    static_dir: Option<PathBuf>,
) -> String {
    // 重复安装会返回 Err，多个测试共享进程时忽略即可
    drop(rustls::crypto::ring::default_provider().install_default());

    let clock = Arc::new(FakeClockProvider::new(
        Utc.with_ymd_and_hms(2026, 3, 4, 1, 0, 0).unwrap(),
    ));
    let settings = ScreeningSettings {
        request_interval: Duration::ZERO,
        rate_limit_cooldown: Duration::ZERO,
        ..Default::default()
    };
    let provider: Arc<dyn MarketDataProvider> = mock;
    let service = Arc::new(ScreeningService::new(provider, clock, settings));
    let app = build_router(AppState { service }, static_dir);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_screening_payload_and_cache() -> anyhow::Result<()> {
    let mock = Arc::new(seeded_market());
    let base = spawn_test_server(mock.clone(), None).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/api/screening", base)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;

    assert_eq!(body["total"], 2);
    let toyota = &body["stocks"][0];
    assert_eq!(toyota["code"], "7203");
    assert_eq!(toyota["price"], 2500.0);
    assert_eq!(toyota["per"], 20.0);
    assert_eq!(toyota["dividendYield"], 2.0);
    assert_eq!(toyota["roe"], 20.0);
    assert_eq!(toyota["equityRatio"], 50.0);
    let sony = &body["stocks"][1];
    assert!(sony["price"].is_null());
    assert!(sony["per"].is_null());
    assert_eq!(sony["valueScore"], 0);

    let health: Value = client
        .get(format!("{}/api/health", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["cached"], true);

    let again: Value = client
        .get(format!("{}/api/screening", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(again, body);
    assert_eq!(mock.master_calls(), 1);

    let refreshed = client
        .post(format!("{}/api/screening/refresh", base))
        .send()
        .await?;
    assert_eq!(refreshed.status(), StatusCode::OK);
    assert_eq!(mock.master_calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_rankings_endpoint() -> anyhow::Result<()> {
    let mock = Arc::new(seeded_market());
    let base = spawn_test_server(mock, None).await;

    let body: Value = reqwest::get(format!("{}/api/rankings", base))
        .await?
        .json()
        .await?;

    assert_eq!(body["per"][0]["code"], "7203");
    assert_eq!(body["per"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["valueScore"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_master_failure_returns_error_body() -> anyhow::Result<()> {
    let mock = Arc::new(MockMarketData::new().fail_master_with(401));
    let base = spawn_test_server(mock, None).await;

    let res = reqwest::get(format!("{}/api/screening", base)).await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert!(body["error"].as_str().is_some_and(|m| m.contains("401")));
    Ok(())
}

#[tokio::test]
async fn test_chart_endpoint_normalises_period() -> anyhow::Result<()> {
    let mock = Arc::new(seeded_market());
    let base = spawn_test_server(mock.clone(), None).await;

    let body: Value = reqwest::get(format!("{}/api/chart/7203?period=1Y", base))
        .await?
        .json()
        .await?;
    assert_eq!(body["code"], "7203");
    assert_eq!(body["period"], "1Y");
    assert_eq!(body["data"][0]["date"], "2026-03-02");
    assert_eq!(body["data"][0]["adjustedClose"], 2470.0);
    assert_eq!(body["data"][1]["adjustedClose"], 2500.0);

    let fallback: Value = reqwest::get(format!("{}/api/chart/7203?period=2Y", base))
        .await?
        .json()
        .await?;
    assert_eq!(fallback["period"], "1M");

    let lower: Value = reqwest::get(format!("{}/api/chart/7203?period=1y", base))
        .await?
        .json()
        .await?;
    assert_eq!(lower["period"], "1M");

    let ranges = mock.range_requests();
    let from_1y = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
    let from_1m = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
    assert_eq!(ranges[0].1, from_1y);
    assert_eq!(ranges[1].1, from_1m);
    assert_eq!(ranges[2].1, from_1m);
    assert_eq!(mock.master_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_financials_endpoint() -> anyhow::Result<()> {
    let mock = Arc::new(seeded_market());
    let base = spawn_test_server(mock, None).await;

    let body: Value = reqwest::get(format!("{}/api/financials/7203", base))
        .await?
        .json()
        .await?;
    let years: Vec<&str> = body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["fiscalYear"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(years, vec!["2021", "2022", "2023", "2024", "2025"]);
    assert_eq!(body["data"][4]["revenue"], 20250.0);
    assert_eq!(body["data"][4]["netIncome"], 0.0);

    let res = reqwest::get(format!("{}/api/financials/9999", base)).await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn test_openapi_and_static_fallback() -> anyhow::Result<()> {
    let dist = tempfile::tempdir()?;
    std::fs::write(dist.path().join("index.html"), "<html>kabuka</html>")?;
    std::fs::write(dist.path().join("app.js"), "console.log('kabuka')")?;

    let mock = Arc::new(seeded_market());
    let base = spawn_test_server(mock, Some(dist.path().to_path_buf())).await;

    let doc: Value = reqwest::get(format!("{}/api-docs/openapi.json", base))
        .await?
        .json()
        .await?;
    assert!(doc["paths"]["/api/screening"].is_object());
    assert!(doc["paths"]["/api/chart/{code}"].is_object());

    let asset = reqwest::get(format!("{}/app.js", base)).await?.text().await?;
    assert_eq!(asset, "console.log('kabuka')");

    let spa = reqwest::get(format!("{}/stocks/7203", base)).await?;
    assert_eq!(spa.status(), StatusCode::OK);
    assert_eq!(spa.text().await?, "<html>kabuka</html>");

    let missing = reqwest::get(format!("{}/api/unknown", base)).await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body: Value = missing.json().await?;
    assert!(body["error"].is_string());
    Ok(())
}
