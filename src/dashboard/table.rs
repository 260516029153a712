//! The table of the user's expenses on the dashboard.

use maud::{Markup, html};
use time::{OffsetDateTime, UtcOffset, macros::format_description};

use crate::{
    expense::{Expense, ExpenseType},
    html::{
        BUTTON_DELETE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency,
    },
};

fn format_date(date: OffsetDateTime, local_offset: UtcOffset) -> String {
    date.to_offset(local_offset)
        .format(format_description!("[day] [month repr:short] [year]"))
        .unwrap_or_else(|error| {
            tracing::warn!("Could not format expense date {date}: {error}");
            date.date().to_string()
        })
}

fn amount_view(expense: &Expense) -> Markup {
    match expense.expense_type {
        ExpenseType::Income => html! {
            span class="text-green-600 dark:text-green-400" { "+" (format_currency(expense.amount)) }
        },
        ExpenseType::Expense => html! {
            span class="text-red-600 dark:text-red-400" { "-" (format_currency(expense.amount)) }
        },
        ExpenseType::Other(_) => html! { span { (format_currency(expense.amount)) } },
    }
}

/// The expenses in the order given, which should be most recent first.
pub(super) fn expenses_table(expenses: &[Expense], local_offset: UtcOffset) -> Markup {
    html! {
        div class="w-full overflow-x-auto rounded-lg shadow"
        {
            table id="expenses" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Payment Mode" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
                        {
                            td class=(TABLE_CELL_STYLE) { (format_date(expense.date, local_offset)) }
                            td class=(TABLE_CELL_STYLE) { (expense.category) }
                            td class=(TABLE_CELL_STYLE) { (expense.expense_type) }
                            td class=(TABLE_CELL_STYLE) { (expense.payment_mode.as_deref().unwrap_or("-")) }
                            td class=(TABLE_CELL_STYLE) { (expense.description.as_deref().unwrap_or("")) }
                            td class={ (TABLE_CELL_STYLE) " font-medium whitespace-nowrap" } { (amount_view(expense)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                button
                                    type="button"
                                    class={ "delete-expense " (BUTTON_DELETE_STYLE) }
                                    data-expense-id=(expense.id)
                                {
                                    "Delete"
                                }
                            }
                        }
                    }

                    @if expenses.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="7" class={ (TABLE_CELL_STYLE) " text-center" }
                            {
                                "No transactions yet. Add one with the form above."
                            }
                        }
                    }
                }
            }
        }
    }
}
