//! Ratio formulas over raw quarterly fundamentals.
//!
//! Every function returns `None` when an input is missing or a denominator
//! is zero. Negative results are kept; the scoring engine decides whether a
//! metric admits them.
use core_types::FundamentalRecord;

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    let value = n / d;
    value.is_finite().then_some(value)
}

pub fn calculate_pe_ratio(r: &FundamentalRecord) -> Option<f64> {
    ratio(r.price, r.epsdil)
}

pub fn calculate_pb_ratio(r: &FundamentalRecord) -> Option<f64> {
    ratio(r.price, r.bvps)
}

pub fn calculate_ps_ratio(r: &FundamentalRecord) -> Option<f64> {
    ratio(r.price, r.sps)
}

/// Price over cash and equivalents per basic share.
pub fn calculate_pc_ratio(r: &FundamentalRecord) -> Option<f64> {
    ratio(r.price, ratio(r.cashneq, r.sharesbas))
}

pub fn calculate_ev_ebitda_ratio(r: &FundamentalRecord) -> Option<f64> {
    ratio(r.ev, r.ebitda)
}

pub fn calculate_roe(r: &FundamentalRecord) -> Option<f64> {
    ratio(r.netinccmn, r.equity)
}

/// Effective tax rate, zero when pre-tax earnings are missing or not positive.
pub fn effective_tax_rate(r: &FundamentalRecord) -> Option<f64> {
    match r.ebt {
        Some(ebt) if ebt > 0.0 => ratio(r.taxexp, Some(ebt)),
        _ => Some(0.0),
    }
}

/// After-tax EBIT over invested capital (debt + equity - cash).
pub fn calculate_roic(r: &FundamentalRecord) -> Option<f64> {
    let nopat = r.ebit? * (1.0 - effective_tax_rate(r)?);
    let invested_capital = r.debt? + r.equity? - r.cashneq?;
    ratio(Some(nopat), Some(invested_capital))
}

pub fn calculate_current_ratio(r: &FundamentalRecord) -> Option<f64> {
    ratio(r.assetsc, r.liabilitiesc)
}

pub fn calculate_interest_coverage(r: &FundamentalRecord) -> Option<f64> {
    ratio(r.ebit, r.intexp)
}

pub fn calculate_debt_to_equity(r: &FundamentalRecord) -> Option<f64> {
    ratio(r.debt, r.equity)
}

pub fn calculate_debt_to_assets(r: &FundamentalRecord) -> Option<f64> {
    ratio(r.debt, r.assets)
}

/// Formula for each catalog metric, in catalog order.
pub const RATIO_FORMULAS: [(&str, fn(&FundamentalRecord) -> Option<f64>); 11] = [
    ("pe_ratio", calculate_pe_ratio),
    ("pb_ratio", calculate_pb_ratio),
    ("ps_ratio", calculate_ps_ratio),
    ("pc_ratio", calculate_pc_ratio),
    ("ev_ebitda_ratio", calculate_ev_ebitda_ratio),
    ("roe_calculated", calculate_roe),
    ("roic_calculated", calculate_roic),
    ("current_ratio", calculate_current_ratio),
    ("interest_coverage", calculate_interest_coverage),
    ("debt_to_equity", calculate_debt_to_equity),
    ("debt_to_assets", calculate_debt_to_assets),
];

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core_types::METRIC_CATALOG;

    fn create_test_record() -> FundamentalRecord {
        FundamentalRecord {
            ticker: "ACME".to_string(),
            price: Some(50.0),
            epsdil: Some(2.5),
            bvps: Some(10.0),
            sps: Some(25.0),
            cashneq: Some(200.0),
            sharesbas: Some(100.0),
            ev: Some(6000.0),
            ebitda: Some(600.0),
            netinccmn: Some(250.0),
            equity: Some(1000.0),
            ebit: Some(400.0),
            ebt: Some(380.0),
            taxexp: Some(76.0),
            debt: Some(500.0),
            assets: Some(2500.0),
            assetsc: Some(900.0),
            liabilitiesc: Some(600.0),
            intexp: Some(20.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_valuation_ratios() {
        let r = create_test_record();
        assert_abs_diff_eq!(calculate_pe_ratio(&r).unwrap(), 20.0);
        assert_abs_diff_eq!(calculate_pb_ratio(&r).unwrap(), 5.0);
        assert_abs_diff_eq!(calculate_ps_ratio(&r).unwrap(), 2.0);
        assert_abs_diff_eq!(calculate_pc_ratio(&r).unwrap(), 25.0);
        assert_abs_diff_eq!(calculate_ev_ebitda_ratio(&r).unwrap(), 10.0);
    }

    #[test]
    fn test_roic_uses_effective_tax_rate() {
        let r = create_test_record();
        // t = 76 / 380 = 0.2, invested capital = 500 + 1000 - 200
        assert_abs_diff_eq!(calculate_roic(&r).unwrap(), 400.0 * 0.8 / 1300.0, epsilon = 1e-12);

        let loss_making = FundamentalRecord {
            ebt: Some(-10.0),
            ..create_test_record()
        };
        assert_abs_diff_eq!(calculate_roic(&loss_making).unwrap(), 400.0 / 1300.0, epsilon = 1e-12);

        let no_pretax_figure = FundamentalRecord {
            ebt: None,
            ..create_test_record()
        };
        assert_eq!(effective_tax_rate(&no_pretax_figure), Some(0.0));
        assert_abs_diff_eq!(calculate_roic(&no_pretax_figure).unwrap(), 400.0 / 1300.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_or_missing_denominator_is_none() {
        let r = FundamentalRecord {
            epsdil: Some(0.0),
            equity: None,
            ..create_test_record()
        };
        assert_eq!(calculate_pe_ratio(&r), None);
        assert_eq!(calculate_roe(&r), None);
        assert_eq!(calculate_debt_to_equity(&r), None);
        assert!(calculate_debt_to_assets(&r).is_some());
    }

    /// Raw inputs each formula reads.
    const FORMULA_INPUTS: [(&str, &[&str]); 11] = [
        ("pe_ratio", &["price", "epsdil"]),
        ("pb_ratio", &["price", "bvps"]),
        ("ps_ratio", &["price", "sps"]),
        ("pc_ratio", &["price", "cashneq", "sharesbas"]),
        ("ev_ebitda_ratio", &["ev", "ebitda"]),
        ("roe_calculated", &["netinccmn", "equity"]),
        ("roic_calculated", &["ebit", "ebt", "taxexp", "debt", "equity", "cashneq"]),
        ("current_ratio", &["assetsc", "liabilitiesc"]),
        ("interest_coverage", &["ebit", "intexp"]),
        ("debt_to_equity", &["debt", "equity"]),
        ("debt_to_assets", &["debt", "assets"]),
    ];

    const ALL_INPUTS: [&str; 18] = [
        "price", "epsdil", "bvps", "sps", "cashneq", "sharesbas", "ev", "ebitda", "netinccmn", "equity",
        "ebit", "ebt", "taxexp", "debt", "assets", "assetsc", "liabilitiesc", "intexp",
    ];

    fn without(field: &str) -> FundamentalRecord {
        let mut r = create_test_record();
        let slot = match field {
            "price" => &mut r.price,
            "epsdil" => &mut r.epsdil,
            "bvps" => &mut r.bvps,
            "sps" => &mut r.sps,
            "cashneq" => &mut r.cashneq,
            "sharesbas" => &mut r.sharesbas,
            "ev" => &mut r.ev,
            "ebitda" => &mut r.ebitda,
            "netinccmn" => &mut r.netinccmn,
            "equity" => &mut r.equity,
            "ebit" => &mut r.ebit,
            "ebt" => &mut r.ebt,
            "taxexp" => &mut r.taxexp,
            "debt" => &mut r.debt,
            "assets" => &mut r.assets,
            "assetsc" => &mut r.assetsc,
            "liabilitiesc" => &mut r.liabilitiesc,
            "intexp" => &mut r.intexp,
            other => panic!("unknown input {other}"),
        };
        *slot = None;
        r
    }

    #[test]
    fn test_each_missing_input_nulls_only_its_formulas() {
        let complete = create_test_record();
        for (name, formula) in RATIO_FORMULAS {
            let (_, inputs) = FORMULA_INPUTS.iter().find(|(n, _)| *n == name).unwrap();
            let baseline = formula(&complete);
            assert!(baseline.is_some(), "{name} on a complete record");

            for field in ALL_INPUTS {
                let result = formula(&without(field));
                match (name, field) {
                    // A missing pre-tax figure means a zero tax rate, not a missing ROIC.
                    ("roic_calculated", "ebt") => {
                        assert_abs_diff_eq!(result.unwrap(), 400.0 / 1300.0, epsilon = 1e-12)
                    }
                    _ if inputs.contains(&field) => assert_eq!(result, None, "{name} without {field}"),
                    _ => assert_eq!(result, baseline, "{name} should not read {field}"),
                }
            }
        }
    }

    #[test]
    fn test_negative_results_are_kept() {
        let r = FundamentalRecord {
            epsdil: Some(-1.0),
            ..create_test_record()
        };
        assert_abs_diff_eq!(calculate_pe_ratio(&r).unwrap(), -50.0);
    }

    #[test]
    fn test_formulas_cover_catalog_in_order() {
        let names: Vec<_> = RATIO_FORMULAS.iter().map(|(n, _)| *n).collect();
        let catalog: Vec<_> = METRIC_CATALOG.iter().map(|m| m.name).collect();
        assert_eq!(names, catalog);
    }
}
