mod accounts_page;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;

pub use accounts_page::get_accounts_page;
pub use core::{
    Account, AccountId, DEFAULT_ACCOUNT_NUMBER, DEFAULT_ACCOUNT_TYPE, NewAccount, count_accounts,
    create_account, create_account_table, delete_account, get_total_account_balance,
    get_user_accounts, update_account,
};
pub use create_endpoint::create_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
pub use edit_endpoint::edit_account_endpoint;
pub use form::AccountForm;
