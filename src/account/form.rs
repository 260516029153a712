use serde::Deserialize;

use crate::{Error, account::NewAccount};

/// The raw fields of the account create and edit forms.
#[derive(Debug, Default, Deserialize)]
pub struct AccountForm {
    pub name: Option<String>,
    pub number: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// A blank balance means zero.
    pub balance: Option<String>,
}

impl AccountForm {
    /// Validate the form into the fields for an account.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyAccountName] if the name is missing, or
    /// [Error::InvalidBalance] if the balance is not a finite number.
    pub fn validate(&self) -> Result<NewAccount, Error> {
        let balance = match self.balance.as_deref().map(str::trim) {
            None | Some("") => 0.0,
            Some(balance) => balance
                .parse::<f64>()
                .map_err(|_| Error::InvalidBalance(balance.to_owned()))?,
        };

        NewAccount::new(
            self.name.as_deref().unwrap_or_default(),
            self.number.as_deref(),
            self.account_type.as_deref(),
            balance,
        )
    }
}
