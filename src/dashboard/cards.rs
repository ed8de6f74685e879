//! The dashboard's summary cards: lifetime totals, per-source balances and
//! the monthly installment burden.

use maud::{Markup, html};

use crate::{
    debt::InstallmentSummary,
    html::{CARD_STYLE, rupiah},
    transaction::Bank,
};

/// The headline figures shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DashboardTotals {
    /// The sum of all income transactions.
    pub total_income: f64,
    /// The sum of all expense transactions.
    pub total_expenses: f64,
    /// `total_income - total_expenses`.
    pub balance: f64,
    /// How many goals exist.
    pub active_goals: usize,
}

/// Per-source balances derived from the transaction history.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct SourceBalances {
    /// The net balance of cash transactions.
    pub cash: f64,
    /// The net balance per bank/e-wallet, in display order.
    pub banks: Vec<(Bank, f64)>,
}

fn stat_card(title: &str, value: Markup) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            p class="text-sm text-gray-600 dark:text-gray-400" { (title) }
            p class="text-xl font-semibold" { (value) }
        }
    }
}

/// Renders the four headline cards.
pub(super) fn totals_cards(totals: &DashboardTotals) -> Markup {
    let balance_style = if totals.balance >= 0.0 {
        "text-xl font-semibold"
    } else {
        "text-xl font-semibold text-red-600"
    };

    html! {
        div class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-4 gap-4 mb-6"
        {
            (stat_card("Total Pemasukan", html! { (rupiah(totals.total_income)) }))
            (stat_card("Total Pengeluaran", html! { (rupiah(totals.total_expenses)) }))

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-600 dark:text-gray-400" { "Saldo" }
                p class=(balance_style) { (rupiah(totals.balance)) }
            }

            (stat_card("Target Aktif", html! { (totals.active_goals) }))
        }
    }
}

/// Renders the per-source balance cards: cash plus one card per bank.
pub(super) fn source_balance_cards(balances: &SourceBalances) -> Markup {
    html! {
        div class="grid grid-cols-2 md:grid-cols-4 gap-4 mb-6"
        {
            (stat_card("Saldo Cash", html! { (rupiah(balances.cash)) }))

            @for (bank, balance) in &balances.banks {
                (stat_card(&format!("Saldo {bank}"), html! { (rupiah(*balance)) }))
            }
        }
    }
}

/// Renders the monthly installment burden card, or nothing when no active
/// debt has an installment plan.
pub(super) fn installment_card(installments: &InstallmentSummary) -> Markup {
    html! {
        @if !installments.entries.is_empty() {
            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-600 dark:text-gray-400" { "Beban cicilan bulan ini" }
                p class="text-xl font-semibold" { (rupiah(installments.total)) }

                ul class="mt-2 text-sm text-gray-600 dark:text-gray-400"
                {
                    @for entry in &installments.entries {
                        li { (entry.creditor) ": " (rupiah(entry.amount)) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::{DashboardTotals, totals_cards};

    #[test]
    fn renders_four_cards() {
        let markup = totals_cards(&DashboardTotals {
            total_income: 1_000_000.0,
            total_expenses: 250_000.0,
            balance: 750_000.0,
            active_goals: 2,
        });

        let html = Html::parse_fragment(&markup.into_string());
        let selector = Selector::parse("p.text-xl").unwrap();
        assert_eq!(html.select(&selector).count(), 4);
        assert!(html.html().contains("Rp 750.000"));
    }

    #[test]
    fn negative_balance_is_highlighted() {
        let markup = totals_cards(&DashboardTotals {
            total_income: 100.0,
            total_expenses: 200.0,
            balance: -100.0,
            active_goals: 0,
        });

        assert!(markup.into_string().contains("text-red-600"));
    }
}
