//! The dashboard summarizes the user's income and expenses.

mod cards;
mod handlers;
mod table;

pub use handlers::get_dashboard_page;
