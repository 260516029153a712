//! The report page breaks the user's money down by category and by month.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::{
        CategoryShare, MonthlySummary, category_shares, category_totals, income_category_totals,
        monthly_summaries,
    },
    auth::UserID,
    chart::{
        EChart, category_pie_chart, echarts_script, echarts_view, month_label, monthly_bar_chart,
    },
    endpoints,
    expense::{Expense, get_user_expenses},
    html::{
        ECHARTS_SCRIPT_URL, HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    timezone::get_local_offset,
};

/// The state needed for the report page.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

const GREEN_TEXT_STYLE: &str = "text-green-600 dark:text-green-400";
const RED_TEXT_STYLE: &str = "text-red-600 dark:text-red-400";

fn shares_table(id: &str, title: &str, shares: &[CategoryShare]) -> Markup {
    html! {
        section class="w-full"
        {
            h2 class="text-xl font-semibold mb-4" { (title) }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table id=(id) class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                        }
                    }

                    tbody
                    {
                        @for share in shares {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (share.category) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(share.total)) }
                                td class=(TABLE_CELL_STYLE) { (format!("{:.1}%", share.percent)) }
                            }
                        }

                        @if shares.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td colspan="3" class={ (TABLE_CELL_STYLE) " text-center" } { "None" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn monthly_table(months: &[MonthlySummary]) -> Markup {
    html! {
        section class="w-full"
        {
            h2 class="text-xl font-semibold mb-4" { "Monthly Summary" }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table id="monthly-summary" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Income" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Expenses" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Net" }
                        }
                    }

                    tbody
                    {
                        @for month in months {
                            @let net_style = if month.net >= 0.0 { GREEN_TEXT_STYLE } else { RED_TEXT_STYLE };

                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (month_label(month)) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(month.income)) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(month.expense)) }
                                td class={ (TABLE_CELL_STYLE) " " (net_style) } { (format_currency(month.net)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn report_no_data_view() -> Markup {
    let content = html! {
        (NavBar::new(endpoints::REPORTS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold" { "Nothing here yet..." }

            p id="no-report-data"
            {
                "Reports will show up here once you add some transactions on the "
                (link(endpoints::DASHBOARD_VIEW, "dashboard")) "."
            }
        }
    };

    base("Reports", &[], &content)
}

fn report_view(expenses: &[Expense], months: &[MonthlySummary]) -> Markup {
    let expense_totals = category_totals(expenses);
    let expense_shares = category_shares(&expense_totals);
    let income_shares = category_shares(&income_category_totals(expenses));

    let charts = [
        EChart {
            id: "category-chart",
            options: category_pie_chart(&expense_totals).to_string(),
        },
        EChart {
            id: "monthly-chart",
            options: monthly_bar_chart(months).to_string(),
        },
    ];

    let content = html! {
        (NavBar::new(endpoints::REPORTS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-8"
            {
                h1 class="text-2xl font-bold" { "Reports" }

                (echarts_view(&charts))

                div class="grid grid-cols-1 lg:grid-cols-2 gap-6"
                {
                    (shares_table("expense-categories", "Expenses by Category", &expense_shares))
                    (shares_table("income-categories", "Income by Category", &income_shares))
                }

                (monthly_table(months))
            }
        }
    };

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned()),
        echarts_script(&charts),
    ];

    base("Reports", &scripts, &content)
}

/// Display the category and monthly breakdown of the user's transactions.
pub async fn get_report_page(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_expenses(user_id, &connection).inspect_err(|error| {
            tracing::error!("Could not get expenses for user {user_id}: {error}")
        })?
    };

    let months = monthly_summaries(&expenses, local_offset);

    if months.is_empty() {
        return Ok(report_no_data_view().into_response());
    }

    Ok(report_view(&expenses, &months).into_response())
}
