//! Statement-derived metric assembly.
//!
//! Turns already-parsed yearly statement line items into the normalized
//! [`FinancialMetricsSnapshot`] the valuation engine consumes: EBIT (with a
//! gross-profit proxy), free cash flow, a multi-year tax rate, invested
//! capital, NOPAT and ROIC histories, and the built-up base-year FCFF.
//!
//! Fetching and parsing of raw statements is out of scope; this module
//! starts from typed records, most recent year first.

use std::collections::BTreeMap;

use intrinsic_common::numeric::{clamp, mean, sanitize};
use serde::{Deserialize, Serialize};

use super::types::{
    FcfObservation, FinancialMetricsSnapshot, NopatObservation, RoicObservation, YearLabel,
};
use crate::cost_of_capital::CapitalStructureInputs;

/// One fiscal year of statement line items.
///
/// Upstream label aliases ("Ebit"/"Operating Income", "Cash"/"Cash And Cash
/// Equivalents", and so on) are expected to be collapsed into these fields
/// by the parsing layer. Absent lines stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatementYear {
    /// Fiscal year, when the reporting label carried one.
    pub year: Option<i32>,

    // Income statement
    pub revenue: Option<f64>,
    pub ebit: Option<f64>,
    pub gross_profit: Option<f64>,
    pub research_development: Option<f64>,
    pub selling_general_admin: Option<f64>,
    pub pretax_income: Option<f64>,
    pub tax_expense: Option<f64>,
    pub interest_expense: Option<f64>,
    pub depreciation_amortization: Option<f64>,

    // Cash flow statement
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditures: Option<f64>,
    pub free_cash_flow: Option<f64>,

    // Balance sheet
    pub net_ppe: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub cash: Option<f64>,
    pub short_long_term_debt: Option<f64>,
    pub long_term_debt: Option<f64>,
}

/// A company's statement history, most recent year first.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StatementHistory {
    years: Vec<StatementYear>,
}

impl StatementHistory {
    /// Wrap an ordered (most recent first) list of statement years.
    pub fn new(years: Vec<StatementYear>) -> Self {
        Self { years }
    }

    pub fn years(&self) -> &[StatementYear] {
        &self.years
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    // ===== Series Views =====

    /// Per-year EBIT: reported values when any year carries one, otherwise
    /// the gross-profit proxy `gross - R&D - SG&A`.
    ///
    /// The choice is made once for the whole series, never mixed per year.
    fn ebit_view(&self) -> Vec<Option<f64>> {
        let has_reported = self
            .years
            .iter()
            .any(|y| finite(y.ebit).is_some());
        if has_reported {
            return self.years.iter().map(|y| finite(y.ebit)).collect();
        }

        let rd_present = self.years.iter().any(|y| y.research_development.is_some());
        let sga_present = self
            .years
            .iter()
            .any(|y| y.selling_general_admin.is_some());

        self.years
            .iter()
            .map(|y| {
                let gross = finite(y.gross_profit)?;
                let rd = if rd_present {
                    finite(y.research_development)?
                } else {
                    0.0
                };
                let sga = if sga_present {
                    finite(y.selling_general_admin)?
                } else {
                    0.0
                };
                Some(gross - rd - sga)
            })
            .collect()
    }

    /// Per-year free cash flow: reported values when any year carries one,
    /// otherwise operating cash flow minus capital expenditures.
    ///
    /// The subtraction is raw; capex keeps whatever sign the source used.
    fn fcf_view(&self) -> Vec<Option<f64>> {
        let has_reported = self
            .years
            .iter()
            .any(|y| finite(y.free_cash_flow).is_some());
        if has_reported {
            return self.years.iter().map(|y| finite(y.free_cash_flow)).collect();
        }

        self.years
            .iter()
            .map(|y| {
                let ocf = finite(y.operating_cash_flow)?;
                let capex = finite(y.capital_expenditures)?;
                Some(ocf - capex)
            })
            .collect()
    }

    // ===== Derived Series =====

    /// The FCF series as labelled observations, gaps dropped.
    pub fn fcf_observations(&self) -> Vec<FcfObservation> {
        self.years
            .iter()
            .zip(self.fcf_view())
            .filter_map(|(y, value)| {
                let value = value?;
                Some(FcfObservation {
                    label: y.year.map(|yr| YearLabel::Text(yr.to_string())),
                    year: y.year,
                    value: Some(value),
                })
            })
            .collect()
    }

    /// Multi-year normalized effective tax rate.
    ///
    /// Averages up to five recent `tax / pretax` ratios from profitable
    /// years, each clamped to [0, 0.35]. Falls back to the latest single
    /// year when plausible, then to 21%.
    pub fn normalized_tax_rate(&self) -> f64 {
        let mut rates = Vec::new();
        for y in &self.years {
            if rates.len() >= 5 {
                break;
            }
            let (Some(tax), Some(pretax)) = (finite(y.tax_expense), finite(y.pretax_income))
            else {
                continue;
            };
            if pretax <= 0.0 {
                continue;
            }
            let rate = tax / pretax;
            if rate.is_finite() {
                rates.push(clamp(Some(rate), 0.0, 0.35));
            }
        }

        if let Some(avg) = mean(&rates) {
            return avg;
        }
        self.latest_single_year_tax_rate().unwrap_or(0.21)
    }

    /// Invested capital by year: net PP&E plus working capital, minus cash
    /// when cash is known. Years with neither PP&E nor working capital are
    /// skipped.
    pub fn invested_capital_by_year(&self) -> BTreeMap<i32, f64> {
        let mut invested_capital = BTreeMap::new();
        for y in &self.years {
            let Some(year) = y.year else { continue };

            let ppe = finite(y.net_ppe);
            let wc = self.working_capital_of(y);
            if ppe.is_none() && wc.is_none() {
                continue;
            }

            let mut invested = ppe.unwrap_or(0.0) + wc.unwrap_or(0.0);
            if let Some(cash) = finite(y.cash) {
                invested -= cash;
            }
            invested_capital.insert(year, invested);
        }
        invested_capital
    }

    /// NOPAT by year: `EBIT * (1 - tax)`.
    pub fn nopat_by_year(&self, tax_rate: f64) -> BTreeMap<i32, f64> {
        let mut nopat = BTreeMap::new();
        for (y, ebit) in self.years.iter().zip(self.ebit_view()) {
            let (Some(year), Some(ebit)) = (y.year, ebit) else {
                continue;
            };
            nopat.insert(year, ebit * (1.0 - tax_rate));
        }
        nopat
    }

    /// ROIC by year: `NOPAT(t) / invested_capital(t-1)`, skipping years
    /// whose prior-year denominator is missing or zero.
    pub fn roic_by_year(
        &self,
        tax_rate: f64,
        invested_capital: &BTreeMap<i32, f64>,
    ) -> BTreeMap<i32, f64> {
        if invested_capital.is_empty() {
            return BTreeMap::new();
        }

        let mut roic = BTreeMap::new();
        for (y, ebit) in self.years.iter().zip(self.ebit_view()) {
            let (Some(year), Some(ebit)) = (y.year, ebit) else {
                continue;
            };
            let Some(&invested_prev) = invested_capital.get(&(year - 1)) else {
                continue;
            };
            if invested_prev == 0.0 {
                continue;
            }
            let value = ebit * (1.0 - tax_rate) / invested_prev;
            if value.is_finite() {
                roic.insert(year, value);
            }
        }
        roic
    }

    /// Build up base-year FCFF: `NOPAT + D&A - |capex| - delta WC`.
    ///
    /// Anchored on the most recent year with EBIT. When capex or the
    /// working-capital delta is unavailable the build-up is abandoned in
    /// favor of the latest reported FCF.
    pub fn base_year_fcff(&self, tax_rate: f64) -> Option<f64> {
        let ebit_view = self.ebit_view();
        let Some(idx) = ebit_view.iter().position(Option::is_some) else {
            return self.latest_fcf();
        };
        let ebit = ebit_view[idx]?;
        let year = &self.years[idx];

        let nopat = ebit * (1.0 - tax_rate);
        let da = finite(year.depreciation_amortization).unwrap_or(0.0);

        let Some(capex_outflow) = finite(year.capital_expenditures).map(f64::abs) else {
            return self.latest_fcf();
        };
        let Some(delta_wc) = self.working_capital_delta(idx) else {
            return self.latest_fcf();
        };

        Some(nopat + da - capex_outflow - delta_wc)
    }

    /// Base FCF candidate chain: built-up FCFF, then latest reported FCF,
    /// then latest OCF minus latest capex.
    pub fn base_fcf_value(&self, tax_rate: f64) -> Option<f64> {
        if let Some(fcff) = self.base_year_fcff(tax_rate).and_then(sanitize) {
            return Some(fcff);
        }
        if let Some(fcf) = self.latest_fcf() {
            return Some(fcf);
        }
        let ocf = self.latest_value(|y| y.operating_cash_flow)?;
        let capex = self.latest_value(|y| y.capital_expenditures)?;
        Some(ocf - capex)
    }

    /// Revenue CAGR over up to five recent years with reported revenue.
    pub fn revenue_cagr(&self) -> Option<f64> {
        let revenues: Vec<f64> = self
            .years
            .iter()
            .filter_map(|y| finite(y.revenue))
            .collect();
        if revenues.len() < 2 {
            return None;
        }

        let n_points = revenues.len().min(5);
        let recent = revenues[0];
        let oldest = revenues[n_points - 1];
        let years = (n_points - 1) as f64;
        if oldest > 0.0 {
            sanitize((recent / oldest).powf(1.0 / years) - 1.0)
        } else {
            None
        }
    }

    /// EBIT margins for up to five recent years with revenue and EBIT.
    pub fn margin_history(&self) -> Vec<f64> {
        let mut margins = Vec::new();
        for (y, ebit) in self.years.iter().zip(self.ebit_view()) {
            if margins.len() >= 5 {
                break;
            }
            let (Some(revenue), Some(ebit)) = (finite(y.revenue), ebit) else {
                continue;
            };
            if revenue == 0.0 {
                continue;
            }
            margins.push(ebit / revenue);
        }
        margins
    }

    // ===== Point Values =====

    /// Most recent reported (or derived) free cash flow.
    pub fn latest_fcf(&self) -> Option<f64> {
        self.fcf_view().into_iter().flatten().next()
    }

    /// Most recent revenue, zero when none is reported.
    pub fn latest_revenue(&self) -> f64 {
        self.latest_value(|y| y.revenue).unwrap_or(0.0)
    }

    /// Most recent EBIT (reported or proxied), zero when none exists.
    pub fn latest_ebit(&self) -> f64 {
        self.ebit_view().into_iter().flatten().next().unwrap_or(0.0)
    }

    /// Total interest-bearing debt from the latest balance sheet.
    pub fn total_debt(&self) -> f64 {
        let short = self.first_value(|y| y.short_long_term_debt).unwrap_or(0.0);
        let long = self.first_value(|y| y.long_term_debt).unwrap_or(0.0);
        short + long
    }

    /// Total debt minus latest cash.
    pub fn net_debt(&self) -> f64 {
        self.total_debt() - self.first_value(|y| y.cash).unwrap_or(0.0)
    }

    /// Calendar year of the most recent statements.
    pub fn base_year(&self) -> Option<i32> {
        self.years.first().and_then(|y| y.year)
    }

    // ===== Snapshot Assembly =====

    /// Assemble the normalized metrics snapshot.
    ///
    /// Quote-level fields (shares outstanding, horizon hints) are left
    /// absent; they come from outside the statements.
    pub fn to_metrics(&self) -> FinancialMetricsSnapshot {
        let tax_rate = self.normalized_tax_rate();
        let revenue_cagr = self.revenue_cagr();
        let revenue_last = self.latest_revenue();
        let ebit_last = self.latest_ebit();

        let invested = self.invested_capital_by_year();
        let roic = self.roic_by_year(tax_rate, &invested);
        let nopat = self.nopat_by_year(tax_rate);

        FinancialMetricsSnapshot {
            revenue_last: Some(revenue_last),
            revenue_cagr_5y: revenue_cagr,
            ebit_margin_last: (revenue_last > 0.0).then(|| ebit_last / revenue_last),
            margin_history: self.margin_history(),
            normalized_tax_rate: Some(tax_rate),
            net_debt: Some(self.net_debt()),
            shares_outstanding: None,
            base_year: self.base_year(),
            horizon_years: None,
            roic_history: roic
                .iter()
                .rev()
                .map(|(&year, &value)| RoicObservation {
                    year: Some(year),
                    roic: Some(value),
                })
                .collect(),
            nopat_history: nopat
                .iter()
                .rev()
                .map(|(&year, &value)| NopatObservation {
                    year: Some(year),
                    nopat: Some(value),
                })
                .collect(),
            base_year_fcff_normalized: self.base_year_fcff(tax_rate).and_then(sanitize),
            base_fcf: self.base_fcf_value(tax_rate).and_then(sanitize),
            fcf_series: self.fcf_observations(),
            growth_model: Some(growth_model_label(revenue_cagr).to_string()),
        }
    }

    /// Bridge to the cost-of-capital assembler: statement-level inputs plus
    /// the quote-level beta and market cap.
    pub fn capital_inputs(
        &self,
        beta_raw: Option<f64>,
        market_cap: Option<f64>,
    ) -> CapitalStructureInputs {
        CapitalStructureInputs {
            beta_raw,
            market_cap,
            total_debt: Some(self.total_debt()),
            interest_expense: Some(self.latest_value(|y| y.interest_expense).unwrap_or(0.0)),
            ebit: Some(self.latest_ebit()),
            tax_rate: Some(self.normalized_tax_rate()),
        }
    }

    // ===== Internals =====

    /// First finite value scanning from the most recent year.
    fn latest_value(&self, field: impl Fn(&StatementYear) -> Option<f64>) -> Option<f64> {
        self.years.iter().find_map(|y| finite(field(y)))
    }

    /// Value from the most recent year only, no scanning.
    fn first_value(&self, field: impl Fn(&StatementYear) -> Option<f64>) -> Option<f64> {
        self.years.first().and_then(|y| finite(field(y)))
    }

    fn working_capital_of(&self, y: &StatementYear) -> Option<f64> {
        match (finite(y.current_assets), finite(y.current_liabilities)) {
            (Some(ca), Some(cl)) => Some(ca - cl),
            _ => None,
        }
    }

    fn working_capital_at(&self, idx: usize) -> Option<f64> {
        self.years.get(idx).and_then(|y| self.working_capital_of(y))
    }

    /// Year-over-year working-capital change at `idx`; needs the next older
    /// year as well.
    fn working_capital_delta(&self, idx: usize) -> Option<f64> {
        let current = self.working_capital_at(idx)?;
        let previous = self.working_capital_at(idx + 1)?;
        Some(current - previous)
    }

    fn latest_single_year_tax_rate(&self) -> Option<f64> {
        let y = self.years.first()?;
        let tax = finite(y.tax_expense)?;
        let pretax = finite(y.pretax_income)?;
        if pretax <= 0.0 {
            return None;
        }
        let rate = tax / pretax;
        (0.0..=0.5).contains(&rate).then_some(rate)
    }
}

// ===== Helper Functions =====

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Map a revenue CAGR to the coarse growth-profile label.
pub fn growth_model_label(revenue_cagr: Option<f64>) -> &'static str {
    match revenue_cagr {
        Some(cagr) if cagr >= 0.10 => "High Growth",
        Some(cagr) if cagr >= 0.04 => "Established Growth",
        _ => "Mature Stable",
    }
}
