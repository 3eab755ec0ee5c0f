//! Ticker to news search keyword resolution.

/// Company names that search better than the bare ticker.
const COMPANY_NAMES: &[(&str, &str)] = &[
    ("ASIANPAINT", "Asian Paints"),
    ("HDFCBANK", "HDFC Bank"),
    ("NTPC", "NTPC"),
    ("MARUTI", "Maruti Suzuki"),
    ("WIPRO", "Wipro"),
    ("SUNPHARMA", "Sun Pharma"),
    ("ULTRACEMCO", "Ultratech Cement"),
    ("SHREECEM", "Shree Cement"),
    ("TECHM", "Tech Mahindra"),
    ("TATAMTRDVR", "Tata Motors DVR"),
    ("HINDUNILVR", "HUL"),
    ("BAJAJ-AUTO", "Bajaj Auto"),
    ("BAJAJAUTO", "Bajaj Auto"),
    ("M&M", "Mahindra and Mahindra"),
    ("MM", "Mahindra and Mahindra"),
    ("LT", "Larsen and Toubro"),
];

/// Search keyword for a matrix symbol such as `AUTO_MARUTI`: the part after
/// the last `_`, upper-cased, replaced by the company name when known.
pub fn search_keyword(symbol: &str) -> String {
    let ticker = symbol.rsplit('_').next().unwrap_or(symbol).to_uppercase();
    COMPANY_NAMES
        .iter()
        .find(|(t, _)| *t == ticker)
        .map(|(_, name)| name.to_string())
        .unwrap_or(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_symbols_map_to_company() {
        assert_eq!(search_keyword("BANK_HDFCBANK"), "HDFC Bank");
        assert_eq!(search_keyword("auto_maruti"), "Maruti Suzuki");
        assert_eq!(search_keyword("FMCG_HINDUNILVR"), "HUL");
        assert_eq!(search_keyword("M&M"), "Mahindra and Mahindra");
    }

    #[test]
    fn test_unknown_symbol_uses_ticker() {
        assert_eq!(search_keyword("IT_INFY"), "INFY");
        assert_eq!(search_keyword("reliance"), "RELIANCE");
    }
}
