use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use salesboard_api::app::{build_app, services::AppServices};
use salesboard_core::LedgerRow;
use salesboard_infra::{InMemoryLedgerSource, LedgerSource, PagingConfig, RowFilter, SourceError};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(source: Arc<dyn LedgerSource>) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let services = Arc::new(AppServices::new(source, PagingConfig::default()));
        let app = build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn with_rows(rows: Vec<LedgerRow>) -> Self {
        Self::spawn(Arc::new(InMemoryLedgerSource::new(rows))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Source whose every request fails permanently.
struct DownSource;

#[async_trait]
impl LedgerSource for DownSource {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn count(&self, _filter: RowFilter) -> Result<u64, SourceError> {
        Err(SourceError::Config("ledger table is missing".to_string()))
    }

    async fn fetch_page(
        &self,
        _filter: RowFilter,
        _offset: u64,
        _limit: u64,
    ) -> Result<Vec<LedgerRow>, SourceError> {
        Err(SourceError::Config("ledger table is missing".to_string()))
    }
}

fn row(client: &str, product: &str, amount: Decimal, y: i32, m: u32, d: u32) -> LedgerRow {
    let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
    LedgerRow::new(amount, date, client, product, "Recife")
}

fn pareto_ledger() -> Vec<LedgerRow> {
    vec![
        row("Y", "Porta", dec!(150), 2024, 1, 3),
        row("X", "Porta", dec!(500), 2024, 1, 4),
        row("Z", "Janela", dec!(50), 2024, 2, 1),
        row("X", "Porta", dec!(300), 2024, 2, 9),
    ]
}

fn forecast_ledger() -> Vec<LedgerRow> {
    vec![
        row("A", "Widget", dec!(60), 2024, 1, 5),
        row("B", "Widget", dec!(40), 2024, 1, 20),
        row("A", "Widget", dec!(300), 2024, 2, 14),
        row("C", "Gadget", dec!(999), 2024, 1, 7),
        row("C", "Porta Lisa", dec!(10), 2024, 3, 1),
    ]
}

fn decimal(value: &serde_json::Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
        .parse()
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::with_rows(Vec::new()).await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn abc_by_client_ranks_and_classifies() {
    let srv = TestServer::with_rows(pareto_ledger()).await;

    let res = reqwest::get(srv.url("/abc/client")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();

    assert_eq!(body["dimension"], "client");
    let groups = body["groups"].as_array().unwrap();
    let labels: Vec<&str> = groups.iter().map(|g| g["label"].as_str().unwrap()).collect();
    assert_eq!(labels, ["X", "Y", "Z"]);

    assert_eq!(decimal(&groups[0]["totalValue"]), dec!(800));
    assert_eq!(groups[0]["rowCount"], 2);
    assert_eq!(decimal(&groups[0]["cumulativePercent"]), dec!(80));
    assert_eq!(groups[0]["abcClass"], "A");
    assert_eq!(decimal(&groups[1]["cumulativePercent"]), dec!(95));
    assert_eq!(groups[1]["abcClass"], "B");
    assert_eq!(decimal(&groups[2]["cumulativePercent"]), dec!(100));
    assert_eq!(groups[2]["abcClass"], "C");

    assert_eq!(decimal(&body["summary"]["grandTotal"]), dec!(1000));
    assert_eq!(body["summary"]["groupCount"], 3);
}

#[tokio::test]
async fn abc_accepts_dimension_aliases() {
    let srv = TestServer::with_rows(pareto_ledger()).await;

    let body: serde_json::Value = reqwest::get(srv.url("/abc/descricao"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["dimension"], "product");
    assert_eq!(body["groups"][0]["label"], "Porta");
}

#[tokio::test]
async fn unknown_dimension_is_rejected() {
    let srv = TestServer::with_rows(pareto_ledger()).await;

    let res = reqwest::get(srv.url("/abc/region")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_dimension");
}

#[tokio::test]
async fn abc_overview_covers_every_dimension() {
    let srv = TestServer::with_rows(pareto_ledger()).await;

    let body: serde_json::Value = reqwest::get(srv.url("/abc")).await.unwrap().json().await.unwrap();
    let dimensions: Vec<&str> = body["dimensions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["dimension"].as_str().unwrap())
        .collect();
    assert_eq!(dimensions, ["client", "product", "city", "finish"]);

    // No row carries a finish label.
    assert_eq!(body["dimensions"][3]["summary"]["groupCount"], 0);
}

#[tokio::test]
async fn forecast_buckets_months_for_one_product() {
    let srv = TestServer::with_rows(forecast_ledger()).await;

    let res = reqwest::get(srv.url("/forecast?product=Widget")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();

    assert_eq!(body["product"], "Widget");
    let months = body["monthlyData"].as_array().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0]["monthKey"], "2024-01");
    assert_eq!(decimal(&months[0]["salesTotal"]), dec!(100));
    assert_eq!(months[1]["monthKey"], "2024-02");
    assert_eq!(decimal(&months[1]["salesTotal"]), dec!(300));

    assert_eq!(decimal(&body["averageTotal"]), dec!(200));
    assert_eq!(decimal(&body["maxSales"]), dec!(300));
    assert_eq!(decimal(&body["minSales"]), dec!(100));
    assert_eq!(decimal(&body["recommendation"]), dec!(260));
    assert_eq!(decimal(&body["safetyMargins"]["low"]), dec!(220));
    assert_eq!(decimal(&body["safetyMargins"]["medium"]), dec!(260));
    assert_eq!(decimal(&body["safetyMargins"]["critical"]), dec!(300));
}

#[tokio::test]
async fn unmatched_product_is_zeroed_unless_strict() {
    let srv = TestServer::with_rows(forecast_ledger()).await;

    let res = reqwest::get(srv.url("/forecast?product=Telha")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(decimal(&body["averageTotal"]), Decimal::ZERO);
    assert!(body["monthlyData"].as_array().unwrap().is_empty());

    let res = reqwest::get(srv.url("/forecast?product=Telha&strict=true")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "empty_product_scope");
}

#[tokio::test]
async fn forecast_export_is_a_csv_attachment() {
    let srv = TestServer::with_rows(forecast_ledger()).await;

    let res = reqwest::get(srv.url("/forecast/export.csv?product=Widget")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let content_type = res.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/csv"));
    let disposition = res.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("previsao_estoque.csv"));

    assert_eq!(res.text().await.unwrap(), "Mês,Vendas\n2024-01,100\n2024-02,300\n");
}

#[tokio::test]
async fn products_are_distinct_and_searchable() {
    let srv = TestServer::with_rows(forecast_ledger()).await;

    let body: serde_json::Value = reqwest::get(srv.url("/products")).await.unwrap().json().await.unwrap();
    let all: Vec<&str> = body["products"].as_array().unwrap().iter().map(|p| p.as_str().unwrap()).collect();
    assert_eq!(all.len(), 3);

    let body: serde_json::Value = reqwest::get(srv.url("/products?search=GET"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mut found: Vec<&str> = body["products"].as_array().unwrap().iter().map(|p| p.as_str().unwrap()).collect();
    found.sort();
    assert_eq!(found, ["Gadget", "Widget"]);
}

#[tokio::test]
async fn snapshot_is_cached_until_refreshed() {
    let srv = TestServer::with_rows(pareto_ledger()).await;
    let client = reqwest::Client::new();

    let first: serde_json::Value = client.get(srv.url("/snapshot")).send().await.unwrap().json().await.unwrap();
    assert_eq!(first["rowCount"], 4);
    assert_eq!(first["totalInSource"], 4);
    assert_eq!(first["complete"], true);

    let again: serde_json::Value = client.get(srv.url("/snapshot")).send().await.unwrap().json().await.unwrap();
    assert_eq!(again["id"], first["id"]);

    let res = client.post(srv.url("/snapshot/refresh")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let refreshed: serde_json::Value = res.json().await.unwrap();
    assert_ne!(refreshed["id"], first["id"]);

    let abc: serde_json::Value = client.get(srv.url("/abc/city")).send().await.unwrap().json().await.unwrap();
    assert_eq!(abc["snapshotId"], refreshed["id"]);
}

#[tokio::test]
async fn source_failure_maps_to_bad_gateway() {
    let srv = TestServer::spawn(Arc::new(DownSource)).await;

    for path in ["/abc/client", "/forecast?product=Widget", "/products", "/snapshot"] {
        let res = reqwest::get(srv.url(path)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY, "{path}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "source_unavailable");
    }
}
