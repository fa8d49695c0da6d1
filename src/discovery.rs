//! Discovery of perpetual-futures pairs common to both exchanges

use crate::exchange::{Exchange, ExchangeError, SymbolListing};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One base asset linked to its venue-native symbols
/// (e.g. "BTC" -> Gate "BTC_USDT", Phemex "BTCUSDT")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub name: String,
    pub gate: String,
    pub phemex: String,
}

/// Return the pairs available on **both** exchanges, sorted by base asset.
///
/// Propagates the first listing failure; callers fall back to a static
/// pair list in that case.
pub async fn discover_common_pairs(
    gate: &dyn Exchange,
    phemex: &dyn Exchange,
) -> Result<Vec<Pair>, ExchangeError> {
    let (gate_syms, phemex_syms) = tokio::try_join!(gate.list_symbols(), phemex.list_symbols())?;

    let pairs = intersect_listings(&gate_syms, &phemex_syms);
    tracing::info!(
        common = pairs.len(),
        gate = gate_syms.len(),
        phemex = phemex_syms.len(),
        "Discovered common pairs"
    );
    Ok(pairs)
}

/// Intersect two venue inventories by base asset, sorted for deterministic
/// output. A base listed twice on one venue keeps its first symbol.
pub fn intersect_listings(gate: &[SymbolListing], phemex: &[SymbolListing]) -> Vec<Pair> {
    let gate_map = base_map(gate);
    let phemex_map = base_map(phemex);

    let mut bases: Vec<&str> = gate_map
        .keys()
        .filter(|base| phemex_map.contains_key(**base))
        .copied()
        .collect();
    bases.sort_unstable();

    bases
        .into_iter()
        .map(|base| Pair {
            name: base.to_string(),
            gate: gate_map[base].to_string(),
            phemex: phemex_map[base].to_string(),
        })
        .collect()
}

fn base_map(listings: &[SymbolListing]) -> HashMap<&str, &str> {
    let mut map = HashMap::with_capacity(listings.len());
    for listing in listings {
        map.entry(listing.base.as_str())
            .or_insert(listing.symbol.as_str());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(base: &str, symbol: &str) -> SymbolListing {
        SymbolListing {
            base: base.to_string(),
            symbol: symbol.to_string(),
        }
    }

    #[test]
    fn test_intersection_sorted_by_base() {
        let gate = vec![
            listing("SENT", "SENT_USDT"),
            listing("BTC", "BTC_USDT"),
            listing("RIVER", "RIVER_USDT"),
        ];
        let phemex = vec![
            listing("RIVER", "RIVERUSDT"),
            listing("BTC", "BTCUSDT"),
            listing("DOGE", "DOGEUSDT"),
        ];

        let pairs = intersect_listings(&gate, &phemex);
        let names: Vec<&str> = pairs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["BTC", "RIVER"]);
        assert_eq!(pairs[0].gate, "BTC_USDT");
        assert_eq!(pairs[0].phemex, "BTCUSDT");
    }

    #[test]
    fn test_intersection_commutative_on_base_set() {
        let a = vec![listing("BTC", "BTC_USDT"), listing("ETH", "ETH_USDT")];
        let b = vec![listing("ETH", "ETHUSDT"), listing("BTC", "BTCUSDT")];

        let ab: Vec<String> = intersect_listings(&a, &b)
            .into_iter()
            .map(|p| p.name)
            .collect();
        let ba: Vec<String> = intersect_listings(&b, &a)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_intersection_deterministic() {
        let gate = vec![listing("A", "A_USDT"), listing("B", "B_USDT")];
        let phemex = vec![listing("B", "BUSDT"), listing("A", "AUSDT")];

        let first = intersect_listings(&gate, &phemex);
        let second = intersect_listings(&gate, &phemex);
        assert_eq!(first, second);
    }

    #[test]
    fn test_disjoint_inventories_yield_nothing() {
        let gate = vec![listing("BTC", "BTC_USDT")];
        let phemex = vec![listing("ETH", "ETHUSDT")];
        assert!(intersect_listings(&gate, &phemex).is_empty());
    }

    #[test]
    fn test_pair_json_shape() {
        let pair = Pair {
            name: "BTC".to_string(),
            gate: "BTC_USDT".to_string(),
            phemex: "BTCUSDT".to_string(),
        };
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(
            json,
            r#"{"name":"BTC","gate":"BTC_USDT","phemex":"BTCUSDT"}"#
        );
    }
}
