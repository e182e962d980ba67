//! Market table output

use tracing::info;

use metamoney_aggregator::MarketsView;
use metamoney_core::{Fetched, Market, TokenAmount, DEFAULT_DISPLAY_PRECISION};

fn amount(value: Option<TokenAmount>) -> String {
    value
        .map(|a| a.format(DEFAULT_DISPLAY_PRECISION))
        .unwrap_or_else(|| "-".to_string())
}

pub fn market_row(market: &Market) -> String {
    let price = match market.price {
        Fetched::Available(p) => format!("${:.2}", p),
        Fetched::Unavailable => "n/a".to_string(),
    };
    let deposit_usd = market
        .deposit_value_usd()
        .map(|v| format!("${:.2}", v))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<8} {:>7.2}% {:>12} {:>16} {:>14} {:>16}",
        market.symbol,
        market.interest_rate,
        price,
        amount(market.deposit_balance),
        deposit_usd,
        amount(market.wallet_balance),
    )
}

pub fn log_view(view: &MarketsView) {
    info!(
        "{} markets (generation {})",
        view.markets.len(),
        view.generation
    );
    for market in view.markets.iter() {
        info!("{}", market_row(market));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use metamoney_core::SymbolSource;

    #[test]
    fn test_row_formats_balances_and_missing_price() {
        let market = Market {
            address: Address::repeat_byte(1),
            symbol: "DAI".to_string(),
            symbol_source: SymbolSource::OnChain,
            interest_rate: 10.0,
            price: Fetched::Unavailable,
            decimals: Fetched::Available(18),
            deposit_balance: Some(TokenAmount::new(U256::from(1_500_000_000_000_000_000u64), 18)),
            wallet_balance: None,
        };

        let row = market_row(&market);
        assert!(row.starts_with("DAI"));
        assert!(row.contains("10.00%"));
        assert!(row.contains("n/a"));
        assert!(row.contains("1.50"));
        // deposit is worth nothing without a price
        assert!(row.contains("$0.00"));
        assert!(row.trim_end().ends_with('-'));
    }
}
