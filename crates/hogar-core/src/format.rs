use std::fmt::Write as _;

use hogar_domain::{IncomeSource, Party};

use crate::summary_service::PeriodReport;

/// Formats money amounts for presentation.
pub trait MoneyFormatter: Send + Sync {
    fn format_amount(&self, amount: f64) -> String;
}

/// `"{symbol} {amount:.2}"`, the single money format of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedMoneyFormatter {
    symbol: String,
}

impl FixedMoneyFormatter {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

impl Default for FixedMoneyFormatter {
    fn default() -> Self {
        Self::new("L")
    }
}

impl MoneyFormatter for FixedMoneyFormatter {
    fn format_amount(&self, amount: f64) -> String {
        format!("{} {:.2}", self.symbol, amount)
    }
}

/// Renders a period report as plain text, one line per fact.
pub fn render_period_report(report: &PeriodReport, money: &dyn MoneyFormatter) -> String {
    let mut out = String::new();
    let settlement = &report.settlement;
    let source = match report.income.source {
        IncomeSource::Explicit => "stored".to_string(),
        IncomeSource::Inherited(previous) => format!("from {previous}"),
        IncomeSource::SystemDefault => "default".to_string(),
    };

    let _ = writeln!(out, "Period {} [{}]", report.period, report.status);
    let _ = writeln!(
        out,
        "Income: {} ({source})",
        money.format_amount(settlement.total_income)
    );
    let proportions = settlement.proportions();
    for party in Party::ALL {
        let _ = writeln!(
            out,
            "  {party}: {} ({:.1}%)",
            money.format_amount(settlement.income.of(party)),
            proportions.get(party)
        );
    }
    let _ = writeln!(
        out,
        "Expenses: {} in {} entries",
        money.format_amount(settlement.total_expenses),
        report.expense_count
    );
    for party in Party::ALL {
        let balance = settlement.balance(party);
        let _ = writeln!(
            out,
            "  {party}: paid {}, share {}, {} {}",
            money.format_amount(*settlement.paid.get(party)),
            money.format_amount(*settlement.shares.get(party)),
            settlement.standing(party),
            money.format_amount(balance.abs())
        );
    }
    if !report.usage.is_empty() {
        let _ = writeln!(out, "Budgets:");
        for usage in &report.usage {
            let _ = writeln!(
                out,
                "  {}: {} of {} ({}%)",
                usage.category,
                money.format_amount(usage.used),
                money.format_amount(usage.cap),
                usage.percent
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_use_symbol_and_two_decimals() {
        let money = FixedMoneyFormatter::default();
        assert_eq!(money.format_amount(384.2795), "L 384.28");
        assert_eq!(FixedMoneyFormatter::new("$").format_amount(5.0), "$ 5.00");
    }
}
