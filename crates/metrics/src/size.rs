//! Size levels carried through unchanged from the filing.
use core_types::FundamentalRecord;

/// Raw scale columns, in `SUPPLEMENTARY_METRICS` order.
pub const SIZE_FEATURES: [(&str, fn(&FundamentalRecord) -> Option<f64>); 3] = [
    ("marketcap", |r| r.marketcap),
    ("revenue", |r| r.revenue),
    ("assets", |r| r.assets),
];
