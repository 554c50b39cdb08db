use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::{debug, info};

use crate::{
    models::{bar::Bar, request_params::BarsRequestParams, time_series::TimeSeries},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, DataSourceError, DecodeSnafu,
        InvalidApiKeySnafu, InvalidSeriesSnafu, MissingEnvVarSnafu, ProviderInitError,
        alpaca_rest::{
            params::{AlpacaBarsParams, construct_params},
            response::{AlpacaErrorBody, AlpacaResponse},
        },
    },
};

const BASE_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

pub struct AlpacaProvider {
    client: Client,
    params: AlpacaBarsParams,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new(timeout: Duration) -> Result<Self, ProviderInitError> {
        let api_key =
            SecretString::new(get_env_var("APCA_API_KEY_ID").context(MissingEnvVarSnafu)?.into());
        let secret_key = SecretString::new(
            get_env_var("APCA_API_SECRET_KEY")
                .context(MissingEnvVarSnafu)?
                .into(),
        );

        let mut headers = header::HeaderMap::new();
        let mut key_header =
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?;
        key_header.set_sensitive(true);
        let mut secret_header = header::HeaderValue::from_str(secret_key.expose_secret())
            .context(InvalidApiKeySnafu)?;
        secret_header.set_sensitive(true);
        headers.insert("APCA-API-KEY-ID", key_header);
        headers.insert("APCA-API-SECRET-KEY", secret_header);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            params: AlpacaBarsParams::default(),
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    fn name(&self) -> &'static str {
        "alpaca"
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<TimeSeries, DataSourceError> {
        let symbol = params.symbol.as_str();
        let mut bars: Vec<Bar> = Vec::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut query_params = construct_params(params, &self.params);
            if let Some(token) = &next_page_token {
                query_params.push(("page_token".to_string(), token.clone()));
            }

            let response = self
                .client
                .get(BASE_URL)
                .query(&query_params)
                .send()
                .await
                .map_err(DataSourceError::from_request)?;

            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(DataSourceError::from_request)?;

            if !status.is_success() {
                let message = serde_json::from_slice::<AlpacaErrorBody>(&body)
                    .map(|e| e.message)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
                return ApiSnafu {
                    status: status.as_u16(),
                    message,
                }
                .fail();
            }

            let page: AlpacaResponse = serde_json::from_slice(&body).context(DecodeSnafu)?;
            pages += 1;

            // Only one symbol is requested; other keys would be a vendor quirk.
            if let Some(page_bars) = page.bars.and_then(|mut m| m.swap_remove(symbol)) {
                for alpaca_bar in page_bars {
                    bars.push(alpaca_bar.into_bar()?);
                }
            }

            // If there's a next page token, use it for the next iteration. Otherwise, we're done.
            match page.next_page_token {
                Some(token) => {
                    debug!(symbol, pages, "following Alpaca page token");
                    next_page_token = Some(token);
                }
                None => break,
            }
        }

        info!(symbol, pages, bars = bars.len(), "fetched Alpaca bars");
        TimeSeries::new(params.symbol.clone(), bars).context(InvalidSeriesSnafu)
    }
}
