#![cfg(test)]
use std::time::Duration;

use chrono::NaiveDate;
use market_data_client::{
    FetchOutcome, MarketDataClient, ProviderKind, ProviderSettings, Symbol,
    providers::{DataProvider, DataSourceError, yahoo::provider::YahooProvider},
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

#[tokio::test]
async fn unreachable_endpoint_is_a_data_source_error() {
    // Port 9 (discard) on localhost is closed on any sane test host.
    let provider =
        YahooProvider::with_base_url("http://127.0.0.1:9/v8/finance/chart", Duration::from_secs(2))
            .unwrap();
    let client = MarketDataClient::new(Box::new(provider));

    let err = client
        .fetch(&Symbol::parse("aapl").unwrap(), start())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DataSourceError::Reqwest { .. } | DataSourceError::Timeout { .. }
    ));
    assert!(err.to_string().starts_with("API request"));
}

#[tokio::test]
#[ignore]
async fn test_yahoo_fetch_known_symbol() {
    let client = MarketDataClient::from_settings(&ProviderSettings {
        kind: ProviderKind::Yahoo,
        timeout: Duration::from_secs(30),
    })
    .unwrap();

    let outcome = client.fetch(&Symbol::parse("aapl").unwrap(), start()).await.unwrap();
    let FetchOutcome::Data(series) = outcome else {
        panic!("expected AAPL history");
    };
    assert!(series.len() > 250);
    assert!(series.first().unwrap().date >= start());
}

#[tokio::test]
#[ignore]
async fn test_yahoo_unknown_symbol_is_empty() {
    let provider = YahooProvider::new(Duration::from_secs(30)).unwrap();
    let params = market_data_client::models::request_params::BarsRequestParams::new(
        Symbol::parse("ZZZZQX.XX").unwrap(),
        start(),
    );
    let series = provider.fetch_bars(&params).await.unwrap();
    assert!(series.is_empty());
}
