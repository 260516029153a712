//! The summary cards at the top of the dashboard.

use maud::{Markup, html};

use crate::{aggregation::Totals, html::format_currency};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";
const GREEN_TEXT_STYLE: &str = "text-green-600 dark:text-green-400";
const RED_TEXT_STYLE: &str = "text-red-600 dark:text-red-400";

/// Green for amounts of zero or more, red otherwise.
fn amount_colour_class(amount: f64) -> &'static str {
    if amount >= 0.0 {
        GREEN_TEXT_STYLE
    } else {
        RED_TEXT_STYLE
    }
}

fn card(id: &str, title: &str, amount: f64, amount_style: &str) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p class={ "mt-2 text-2xl font-bold " (amount_style) } { (format_currency(amount)) }
        }
    }
}

/// Total income, total expenses and the balance between them.
pub(super) fn totals_cards(totals: &Totals) -> Markup {
    html! {
        section class="grid grid-cols-1 sm:grid-cols-3 gap-4 w-full"
        {
            (card("total-income", "Total Income", totals.income, GREEN_TEXT_STYLE))
            (card("total-expense", "Total Expenses", totals.expense, RED_TEXT_STYLE))
            (card("total-balance", "Balance", totals.balance, amount_colour_class(totals.balance)))
        }
    }
}
