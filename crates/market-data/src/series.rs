use analysis_core::{PriceMatrix, PricePoint, PriceSeries};

/// Project the matrix onto one symbol as a clean (date, price) series.
///
/// Absent symbols and empty matrices give an empty series; non-finite
/// prices are dropped without interpolation.
pub fn extract(matrix: &PriceMatrix, symbol: &str) -> PriceSeries {
    let Some(idx) = matrix.symbol_index(symbol) else {
        return PriceSeries::new(symbol, Vec::new());
    };

    let points = matrix
        .rows()
        .iter()
        .filter_map(|row| {
            let price = row.prices[idx];
            price.is_finite().then_some(PricePoint {
                date: row.date,
                price,
            })
        })
        .collect();

    PriceSeries::new(symbol, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_price_table;

    #[test]
    fn test_extract_known_symbol() {
        let m = parse_price_table("Date,AAA,BBB\n2024-01-01,1,10\n2024-01-02,2,20\n");
        let s = extract(&m, "BBB");
        assert_eq!(s.symbol, "BBB");
        assert_eq!(s.prices(), vec![10.0, 20.0]);
        assert!(s.points.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_extract_unknown_symbol() {
        let m = parse_price_table("Date,AAA\n2024-01-01,1\n");
        assert!(extract(&m, "ZZZ").is_empty());
        assert!(extract(&PriceMatrix::empty(), "AAA").is_empty());
    }
}
