//! Income and expense records, the "expenses" shown on the dashboard.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod form;

pub use core::{
    Expense, ExpenseId, ExpenseType, NewExpense, count_expenses, create_expense,
    create_expense_table, delete_expense, get_user_expenses,
};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use form::{EXPENSE_CATEGORIES, ExpenseForm, INCOME_CATEGORIES};
