//! The form data submitted by the dashboard's "add expense" form.

use std::str::FromStr;

use serde::Deserialize;

use crate::{
    Error,
    expense::{ExpenseType, NewExpense},
};

/// The categories offered for income on the dashboard form.
pub const INCOME_CATEGORIES: [&str; 6] =
    ["Parents", "Salary", "Sale", "Grants", "Gift", "Interest"];

/// The categories offered for expenses on the dashboard form.
pub const EXPENSE_CATEGORIES: [&str; 14] = [
    "Food",
    "Beauty",
    "Entertainment",
    "Education",
    "Health",
    "Bills",
    "Shopping",
    "Car",
    "Baby",
    "Sports",
    "Tax",
    "Transportation",
    "Utilities",
    "Other",
];

/// The raw fields of the "add expense" form.
///
/// Every field is optional so that a missing field is reported to the user
/// as a validation error instead of being rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseForm {
    pub amount: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    #[serde(rename = "paymentMode")]
    pub payment_mode: Option<String>,
    pub description: Option<String>,
}

fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

impl ExpenseForm {
    /// Validate the form into an expense dated now.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::MissingRequiredFields] if the amount, category or type is missing,
    /// - [Error::InvalidAmount] if the amount is not a finite number,
    /// - [Error::NonPositiveAmount] if the amount is zero or negative,
    /// - [Error::InvalidExpenseType] if the type is not "Income" or "Expense".
    pub fn validate(&self) -> Result<NewExpense, Error> {
        let (Some(amount), Some(category), Some(type_)) = (
            required(&self.amount),
            required(&self.category),
            required(&self.type_),
        ) else {
            return Err(Error::MissingRequiredFields);
        };

        let amount: f64 = amount
            .parse()
            .map_err(|_| Error::InvalidAmount(amount.to_owned()))?;
        let expense_type = ExpenseType::from_str(type_)?;

        Ok(NewExpense::new(amount, category, expense_type)?
            .payment_mode(self.payment_mode.as_deref())
            .description(self.description.as_deref()))
    }
}
