//! Integration tests for FinanceService against a scripted invoker.

use std::sync::Arc;

use flowchain_client::{InvokeError, MockInvoker};
use flowchain_config::FlowDefinition;
use flowchain_finance::{FinanceError, FinanceService, MAX_COMPARE_SYMBOLS};
use flowchain_pipeline::FlowRegistry;
use serde_json::json;

fn registry(analysis_id: &str) -> Arc<FlowRegistry> {
    Arc::new(
        FlowRegistry::new([
            FlowDefinition::new("stock_finder", "wf-finder"),
            FlowDefinition::new("company_profiler", "wf-profiler"),
            FlowDefinition::new(analysis_id, "wf-analysis"),
        ])
        .unwrap(),
    )
}

fn service(mock: Arc<MockInvoker>) -> FinanceService {
    FinanceService::new(registry("comparative_analysis"), mock)
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_short_query_skips_remote_call() {
    let mock = Arc::new(MockInvoker::new());
    let results = service(mock.clone()).search_stocks("ap").await.unwrap();
    assert!(results.is_empty());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_search_stocks() {
    let mock = Arc::new(MockInvoker::new().with_result(
        "wf-finder",
        json!({"suggestions": [
            {"symbol": "AAPL", "name": "Apple Inc.", "currency": "USD",
             "exchangeFullName": "NASDAQ Global Select", "exchange": "NASDAQ"}
        ]}),
    ));
    let results = service(mock.clone()).search_stocks("apple").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].symbol, "AAPL");
    assert_eq!(
        mock.last_inputs("wf-finder").unwrap()["searchQuery"],
        json!("apple")
    );
}

#[tokio::test]
async fn test_company_profiles_requires_symbols() {
    let mock = Arc::new(MockInvoker::new());
    let err = service(mock.clone()).company_profiles(&[]).await.unwrap_err();
    assert_eq!(err.to_string(), "No symbols provided");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_company_profiles() {
    let mock = Arc::new(MockInvoker::new().with_result(
        "wf-profiler",
        json!({"profiles": [
            {"symbol": "AAPL", "companyName": "Apple Inc.", "price": 190.1, "sector": "Technology"},
            {"symbol": "MSFT", "companyName": "Microsoft"}
        ]}),
    ));
    let profiles = service(mock.clone())
        .company_profiles(&symbols(&["AAPL", "MSFT"]))
        .await
        .unwrap();

    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].sector, "Technology");
    assert_eq!(
        mock.last_inputs("wf-profiler").unwrap()["companies"],
        json!(["AAPL", "MSFT"])
    );
}

#[tokio::test]
async fn test_company_profiles_tolerate_nulls() {
    let mock = Arc::new(MockInvoker::new().with_result(
        "wf-profiler",
        json!({"profiles": [
            {"symbol": "SPY", "companyName": "SPDR S&P 500 ETF Trust", "ceo": null,
             "lastDividend": null, "sector": null, "isEtf": true},
            {"symbol": "AAPL", "companyName": "Apple Inc.", "ceo": "Tim Cook"}
        ]}),
    ));
    let profiles = service(mock)
        .company_profiles(&symbols(&["SPY", "AAPL"]))
        .await
        .unwrap();

    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].ceo, "");
    assert_eq!(profiles[0].last_dividend, 0.0);
    assert!(profiles[0].is_etf);
    assert_eq!(profiles[1].ceo, "Tim Cook");
}

#[tokio::test]
async fn test_null_charts_are_empty() {
    let mock = Arc::new(MockInvoker::new().with_result(
        "wf-analysis",
        json!({"comparative_analysis": "text", "charts": null}),
    ));
    let result = service(mock)
        .comparative_analysis(&symbols(&["AAPL"]))
        .await
        .unwrap();
    assert!(result.charts.is_empty());
}

#[tokio::test]
async fn test_comparative_analysis() {
    let mock = Arc::new(MockInvoker::new().with_result(
        "wf-analysis",
        json!({
            "comparative_analysis": "## Apple vs Microsoft",
            "charts": [{"title": "Revenue", "description": "Annual revenue", "code": "<BarChart />"}]
        }),
    ));
    let result = service(mock)
        .comparative_analysis(&symbols(&["AAPL", "MSFT"]))
        .await
        .unwrap();

    assert_eq!(result.analysis, "## Apple vs Microsoft");
    assert_eq!(result.charts.len(), 1);
    assert_eq!(result.charts[0].title, "Revenue");
}

#[tokio::test]
async fn test_comparative_analysis_legacy_spelling() {
    let mock = Arc::new(MockInvoker::new().with_result(
        "wf-analysis",
        json!({"comparitive_analysis": "legacy text"}),
    ));
    let service = FinanceService::new(registry("comparitive_analysis"), mock);

    let result = service
        .comparative_analysis(&symbols(&["AAPL"]))
        .await
        .unwrap();
    assert_eq!(result.analysis, "legacy text");
    assert!(result.charts.is_empty());
}

#[tokio::test]
async fn test_comparison_limit() {
    let mock = Arc::new(MockInvoker::new());
    let too_many: Vec<String> = (0..=MAX_COMPARE_SYMBOLS).map(|i| format!("S{i}")).collect();

    let err = service(mock.clone())
        .comparative_analysis(&too_many)
        .await
        .unwrap_err();
    assert!(matches!(err, FinanceError::TooManySymbols { count: 6, max: 5 }));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_missing_flow() {
    let service = FinanceService::new(
        Arc::new(FlowRegistry::new(Vec::new()).unwrap()),
        Arc::new(MockInvoker::new()),
    );
    let err = service.search_stocks("apple").await.unwrap_err();
    assert!(matches!(err, FinanceError::FlowNotConfigured(ref id) if id == "stock_finder"));
}

#[tokio::test]
async fn test_invoker_error_user_message() {
    let mock = Arc::new(
        MockInvoker::new().with_error("wf-finder", InvokeError::Auth("invalid key".into())),
    );
    let err = service(mock).search_stocks("apple").await.unwrap_err();
    assert!(err.user_message().contains("API key"));
}
