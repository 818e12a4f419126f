use async_trait::async_trait;
use confluence_core::{
    Capability, ConfluenceError, ExchangeSession, Interval, MarketCatalogue, MarketInfo,
    MarketType, OhlcvRow,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::OkxConnector;
use crate::error::OkxError;
use crate::wire::{self, CANDLES_PAGE_LIMIT, Envelope, InstrumentRow};

const INSTRUMENTS_PATH: &str = "/api/v5/public/instruments";
const CANDLES_PATH: &str = "/api/v5/market/candles";
const TICKER_PATH: &str = "/api/v5/market/ticker";
const FUNDING_RATE_PATH: &str = "/api/v5/public/funding-rate";
const OPEN_INTEREST_PATH: &str = "/api/v5/public/open-interest";

/// One OKX session. Owns its HTTP client until closed.
pub struct OkxSession {
    base_url: Url,
    client: Option<reqwest::Client>,
    market_type: MarketType,
    markets: MarketCatalogue,
}

impl OkxSession {
    pub(crate) fn new(base_url: Url, client: reqwest::Client, market_type: MarketType) -> Self {
        Self {
            base_url,
            client: Some(client),
            market_type,
            markets: MarketCatalogue::new(),
        }
    }

    fn instrument_id(&self, symbol: &str) -> String {
        self.markets
            .get(symbol)
            .map_or_else(|| wire::native_id(symbol), |m| m.native_id.clone())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, OkxError> {
        let client = self.client.as_ref().ok_or(OkxError::Closed)?;
        let url = self.base_url.join(path)?;
        tracing::debug!(path, ?query, "okx request");
        let resp = client.get(url).query(query).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        match serde_json::from_slice::<Envelope<T>>(&body) {
            Ok(env) if env.code == "0" => Ok(env.data),
            Ok(env) => Err(OkxError::Api {
                code: env.code,
                msg: env.msg,
            }),
            Err(_) if !status.is_success() => Err(OkxError::Status {
                status: status.as_u16(),
            }),
            Err(e) => Err(OkxError::Decode(e.to_string())),
        }
    }

    async fn first(&self, path: &str, symbol: &str, what: &str) -> Result<Value, OkxError> {
        let inst_id = self.instrument_id(symbol);
        self.get::<Value>(path, &[("instId", inst_id.as_str())])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| OkxError::Empty(format!("{what} for {symbol}")))
    }
}

#[async_trait]
impl ExchangeSession for OkxSession {
    async fn load_markets(&mut self) -> Result<MarketCatalogue, ConfluenceError> {
        let inst_type = wire::inst_type(self.market_type);
        let rows: Vec<InstrumentRow> = self
            .get(INSTRUMENTS_PATH, &[("instType", inst_type)])
            .await?;
        let market_type = self.market_type;
        let catalogue: MarketCatalogue = rows
            .into_iter()
            .filter_map(|row| {
                let unified = wire::unified_symbol(&row, market_type)?;
                Some((unified, MarketInfo {
                    native_id: row.inst_id,
                    market_type,
                }))
            })
            .collect();
        tracing::debug!(inst_type, markets = catalogue.len(), "loaded okx instruments");
        self.markets = catalogue.clone();
        Ok(catalogue)
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        interval: Interval,
        limit: u32,
    ) -> Result<Vec<OhlcvRow>, ConfluenceError> {
        let bar = wire::bar(interval).ok_or_else(|| {
            ConfluenceError::InvalidArg(format!("okx does not serve {interval} candles"))
        })?;
        let inst_id = self.instrument_id(symbol);

        // Pages arrive newest first; `after` asks for rows older than the given ts.
        let mut newest_first: Vec<OhlcvRow> = Vec::new();
        let mut remaining = limit;
        let mut after: Option<String> = None;
        while remaining > 0 {
            let page = remaining.min(CANDLES_PAGE_LIMIT);
            let page_str = page.to_string();
            let mut query = vec![
                ("instId", inst_id.as_str()),
                ("bar", bar),
                ("limit", page_str.as_str()),
            ];
            if let Some(cursor) = after.as_deref() {
                query.push(("after", cursor));
            }
            let raw: Vec<Vec<String>> = self.get(CANDLES_PATH, &query).await?;
            let got = raw.len();
            for row in &raw {
                newest_first.push(wire::parse_candle(row)?);
            }
            let Some(oldest) = newest_first.last() else {
                break;
            };
            after = Some(oldest.ts.to_string());
            remaining = remaining.saturating_sub(u32::try_from(got).unwrap_or(u32::MAX));
            if got < page as usize {
                break;
            }
        }
        newest_first.reverse();
        Ok(newest_first)
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Value, ConfluenceError> {
        Ok(self.first(TICKER_PATH, symbol, "ticker").await?)
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<Value, ConfluenceError> {
        if self.market_type == MarketType::Spot {
            return Err(ConfluenceError::unsupported(Capability::FundingRate.as_str()));
        }
        Ok(self
            .first(FUNDING_RATE_PATH, symbol, "funding rate")
            .await?)
    }

    async fn fetch_open_interest(&self, symbol: &str) -> Result<Value, ConfluenceError> {
        if self.market_type == MarketType::Spot {
            return Err(ConfluenceError::unsupported(Capability::OpenInterest.as_str()));
        }
        let inst_id = self.instrument_id(symbol);
        self.get::<Value>(
            OPEN_INTEREST_PATH,
            &[("instType", "SWAP"), ("instId", inst_id.as_str())],
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ConfluenceError::not_found(format!("open interest for {symbol}")))
    }

    async fn close(&mut self) -> Result<(), ConfluenceError> {
        if self.client.take().is_some() {
            tracing::debug!(connector = OkxConnector::NAME, "closed session");
        }
        Ok(())
    }
}
