//! Series resolver
//!
//! Maps an instrument symbol and dataset variant to the collection (table)
//! that holds its minute series. The mapping is a static table; adding an
//! instrument means adding rows here, nothing else.
//!
//! Resolution is permissive:
//! - unknown symbols resolve to the default instrument's derived collection
//! - `raw` for a symbol without a raw feed resolves to that symbol's derived
//!   collection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instrument used when the requested symbol is not recognised
pub const DEFAULT_SYMBOL: &str = "BTC/USD";

/// Dataset flavour of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetVariant {
    #[default]
    Derived,
    Raw,
}

impl DatasetVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Derived => "derived",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for DatasetVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "derived" => Ok(Self::Derived),
            "raw" => Ok(Self::Raw),
            other => Err(format!("unknown dataset variant '{}'", other)),
        }
    }
}

/// `(symbol, variant, collection)`
const SERIES_TABLE: &[(&str, DatasetVariant, &str)] = &[
    ("BTC/USD", DatasetVariant::Derived, "mock_btc_minutes"),
    ("BTC/USD", DatasetVariant::Raw, "btc_eth_merged"),
    ("ETH/USD", DatasetVariant::Derived, "mock_eth_minutes"),
];

fn lookup(symbol: &str, variant: DatasetVariant) -> Option<&'static str> {
    SERIES_TABLE
        .iter()
        .find(|(s, v, _)| *s == symbol && *v == variant)
        .map(|(_, _, collection)| *collection)
}

/// Canonical symbol that will actually be queried for `symbol`
pub fn resolve_symbol(symbol: &str) -> &'static str {
    SERIES_TABLE
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(s, _, _)| *s)
        .unwrap_or(DEFAULT_SYMBOL)
}

/// Resolve a symbol/variant pair to its collection name. Total over all inputs.
pub fn resolve(symbol: &str, variant: DatasetVariant) -> &'static str {
    let symbol = resolve_symbol(symbol);

    lookup(symbol, variant)
        .or_else(|| lookup(symbol, DatasetVariant::Derived))
        .unwrap_or("mock_btc_minutes")
}

/// Every collection known to the resolver, deduplicated, in table order
pub fn collections() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::with_capacity(SERIES_TABLE.len());
    for (_, _, collection) in SERIES_TABLE {
        if !names.contains(collection) {
            names.push(collection);
        }
    }
    names
}

/// Symbols with at least one collection
pub fn symbols() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    for (symbol, _, _) in SERIES_TABLE {
        if !names.contains(symbol) {
            names.push(symbol);
        }
    }
    names
}
