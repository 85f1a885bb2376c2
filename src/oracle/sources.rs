//! Built-in price feed sources.
//!
//! Each source is a name, a URL template and the sequence of JSON keys
//! that leads to a numeric BTC price in its reply. Templates may use
//! `{currency}` (upper-case code) and `{currency_lc}` placeholders, in
//! the URL and in the key path.

use serde_json::Value;

use crate::types::MSATS_PER_BTC;

/// One external price endpoint.
#[derive(Debug, Clone)]
pub struct RateSource {
    pub name: &'static str,
    pub url_template: &'static str,
    pub json_path: &'static [&'static str],
}

impl RateSource {
    /// Expand the URL template for a currency code.
    pub fn url(&self, currency: &str) -> String {
        expand(self.url_template, currency)
    }

    /// Walk the reply's key path and parse the price.
    ///
    /// Accepts both JSON numbers and numeric strings (Coinbase quotes
    /// prices as strings). Any missing key or non-numeric leaf yields
    /// `None`; the caller treats that as a soft per-source failure.
    pub fn extract_price(&self, body: &Value, currency: &str) -> Option<f64> {
        let mut node = body;
        for key in self.json_path {
            node = node.get(expand(key, currency).as_str())?;
        }
        match node {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }
}

fn expand(template: &str, currency: &str) -> String {
    template
        .replace("{currency_lc}", &currency.to_lowercase())
        .replace("{currency}", &currency.to_uppercase())
}

/// Millisatoshis needed to buy one unit of the target currency at the
/// given BTC price. `None` for prices that are zero, negative, infinite
/// or so large that the rate truncates to nothing.
pub fn msat_per_unit(price: f64) -> Option<u64> {
    if !price.is_finite() || price <= 0.0 {
        return None;
    }
    let rate = (MSATS_PER_BTC as f64 / price).round();
    if rate < 1.0 || rate > u64::MAX as f64 {
        return None;
    }
    Some(rate as u64)
}

/// The default set of five feeds.
pub fn default_sources() -> Vec<RateSource> {
    vec![
        RateSource {
            name: "bitstamp",
            url_template: "https://www.bitstamp.net/api/v2/ticker/btc{currency_lc}/",
            json_path: &["last"],
        },
        RateSource {
            name: "coingecko",
            url_template:
                "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies={currency_lc}",
            json_path: &["bitcoin", "{currency_lc}"],
        },
        RateSource {
            name: "coindesk",
            url_template: "https://api.coindesk.com/v1/bpi/currentprice/{currency}.json",
            json_path: &["bpi", "{currency}", "rate_float"],
        },
        RateSource {
            name: "coinbase",
            url_template: "https://api.coinbase.com/v2/prices/spot?currency={currency}",
            json_path: &["data", "amount"],
        },
        RateSource {
            name: "blockchain.info",
            url_template: "https://blockchain.info/ticker",
            json_path: &["{currency}", "last"],
        },
    ]
}
