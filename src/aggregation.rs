//! Summaries derived from a user's expenses.
//!
//! These functions are total: any list of expenses, including an empty one,
//! produces a summary. Rows typed [ExpenseType::Other] count towards neither
//! income nor expenses.

use std::collections::BTreeMap;

use time::{Date, Duration, UtcOffset};

use crate::expense::{Expense, ExpenseType};

/// The summed amount of each category, sorted by category name.
pub type CategoryTotals = BTreeMap<String, f64>;

/// The overall totals shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    /// Income minus expenses.
    pub balance: f64,
}

/// Income and expenses for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlySummary {
    /// The first day of the month.
    pub month: Date,
    pub income: f64,
    pub expense: f64,
    /// Income minus expenses.
    pub net: f64,
}

/// A category's share of the total of all categories.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub total: f64,
    /// Between 0 and 100.
    pub percent: f64,
}

fn totals_by_category(expenses: &[Expense], expense_type: &ExpenseType) -> CategoryTotals {
    let mut totals = CategoryTotals::new();

    for expense in expenses
        .iter()
        .filter(|expense| &expense.expense_type == expense_type)
    {
        *totals.entry(expense.category.clone()).or_insert(0.0) += expense.amount;
    }

    totals
}

/// Sum the amounts of the [ExpenseType::Expense] rows by category.
pub fn category_totals(expenses: &[Expense]) -> CategoryTotals {
    totals_by_category(expenses, &ExpenseType::Expense)
}

/// Sum the amounts of the [ExpenseType::Income] rows by category.
pub fn income_category_totals(expenses: &[Expense]) -> CategoryTotals {
    totals_by_category(expenses, &ExpenseType::Income)
}

/// Sum income and expenses, the balance is income minus expenses.
pub fn income_expense_balance(expenses: &[Expense]) -> Totals {
    let mut totals = Totals::default();

    for expense in expenses {
        match expense.expense_type {
            ExpenseType::Income => totals.income += expense.amount,
            ExpenseType::Expense => totals.expense += expense.amount,
            ExpenseType::Other(_) => {}
        }
    }

    totals.balance = totals.income - totals.expense;
    totals
}

fn first_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// Group income and expenses by the calendar month they fall in at `local_offset`.
///
/// Months are in chronological order and only months with at least one
/// income or expense are included.
pub fn monthly_summaries(expenses: &[Expense], local_offset: UtcOffset) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<Date, MonthlySummary> = BTreeMap::new();

    for expense in expenses {
        if matches!(expense.expense_type, ExpenseType::Other(_)) {
            continue;
        }

        let month = first_of_month(expense.date.to_offset(local_offset).date());
        let summary = months.entry(month).or_insert(MonthlySummary {
            month,
            income: 0.0,
            expense: 0.0,
            net: 0.0,
        });

        match expense.expense_type {
            ExpenseType::Income => summary.income += expense.amount,
            ExpenseType::Expense => summary.expense += expense.amount,
            ExpenseType::Other(_) => {}
        }

        summary.net = summary.income - summary.expense;
    }

    months.into_values().collect()
}

/// Each category's percentage of the sum of `totals`, largest first.
pub fn category_shares(totals: &CategoryTotals) -> Vec<CategoryShare> {
    let grand_total: f64 = totals.values().sum();

    let mut shares: Vec<CategoryShare> = totals
        .iter()
        .map(|(category, &total)| CategoryShare {
            category: category.clone(),
            total,
            percent: if grand_total > 0.0 {
                total / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();

    shares.sort_by(|a, b| b.total.total_cmp(&a.total));
    shares
}

#[cfg(test)]
mod tests {
    use time::{OffsetDateTime, UtcOffset, macros::{date, datetime}};

    use crate::{
        UserID,
        expense::{Expense, ExpenseType},
    };

    use super::{
        CategoryTotals, Totals, category_shares, category_totals, income_category_totals,
        income_expense_balance, monthly_summaries,
    };

    fn expense(amount: f64, category: &str, expense_type: ExpenseType) -> Expense {
        expense_on(amount, category, expense_type, datetime!(2025-10-05 12:00 UTC))
    }

    fn expense_on(
        amount: f64,
        category: &str,
        expense_type: ExpenseType,
        date: OffsetDateTime,
    ) -> Expense {
        Expense {
            id: 0,
            amount,
            category: category.to_owned(),
            expense_type,
            payment_mode: None,
            description: None,
            date,
            user_id: UserID::new(1),
        }
    }

    #[test]
    fn empty_input_gives_empty_totals() {
        assert!(category_totals(&[]).is_empty());
        assert_eq!(income_expense_balance(&[]), Totals::default());
        assert!(monthly_summaries(&[], UtcOffset::UTC).is_empty());
    }

    #[test]
    fn income_and_expense_scenario() {
        let expenses = [
            expense(100.0, "Salary", ExpenseType::Income),
            expense(40.0, "Food", ExpenseType::Expense),
            expense(10.0, "Food", ExpenseType::Expense),
        ];

        assert_eq!(
            category_totals(&expenses),
            CategoryTotals::from([("Food".to_owned(), 50.0)])
        );
        assert_eq!(
            income_expense_balance(&expenses),
            Totals {
                income: 100.0,
                expense: 50.0,
                balance: 50.0
            }
        );
    }

    #[test]
    fn category_totals_keys_are_expense_categories() {
        let expenses = [
            expense(5.0, "Food", ExpenseType::Expense),
            expense(7.0, "Bills", ExpenseType::Expense),
            expense(3.0, "Food", ExpenseType::Expense),
            expense(1000.0, "Salary", ExpenseType::Income),
        ];

        let totals = category_totals(&expenses);

        assert_eq!(totals.keys().collect::<Vec<_>>(), vec!["Bills", "Food"]);
        assert_eq!(totals["Food"], 8.0);
        assert_eq!(totals["Bills"], 7.0);
    }

    #[test]
    fn balance_can_be_negative() {
        let expenses = [
            expense(20.0, "Gift", ExpenseType::Income),
            expense(35.5, "Car", ExpenseType::Expense),
        ];

        let totals = income_expense_balance(&expenses);

        assert_eq!(totals.balance, totals.income - totals.expense);
        assert_eq!(totals.balance, -15.5);
    }

    #[test]
    fn other_types_are_excluded_from_every_total() {
        let expenses = [
            expense(100.0, "Salary", ExpenseType::Income),
            expense(10.0, "Food", ExpenseType::Expense),
            expense(999.0, "Food", ExpenseType::Other("Transfer".to_owned())),
            expense(50.0, "Savings", ExpenseType::Other("expense".to_owned())),
        ];

        assert_eq!(
            category_totals(&expenses),
            CategoryTotals::from([("Food".to_owned(), 10.0)])
        );
        assert_eq!(
            income_category_totals(&expenses),
            CategoryTotals::from([("Salary".to_owned(), 100.0)])
        );
        assert_eq!(
            income_expense_balance(&expenses),
            Totals {
                income: 100.0,
                expense: 10.0,
                balance: 90.0
            }
        );

        let months = monthly_summaries(&expenses, UtcOffset::UTC);
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].income, 100.0);
        assert_eq!(months[0].expense, 10.0);
    }

    #[test]
    fn monthly_summaries_are_chronological() {
        let expenses = [
            expense_on(30.0, "Food", ExpenseType::Expense, datetime!(2025-11-20 9:00 UTC)),
            expense_on(500.0, "Salary", ExpenseType::Income, datetime!(2025-09-01 9:00 UTC)),
            expense_on(20.0, "Food", ExpenseType::Expense, datetime!(2025-09-15 9:00 UTC)),
            expense_on(200.0, "Salary", ExpenseType::Income, datetime!(2025-11-01 9:00 UTC)),
        ];

        let months = monthly_summaries(&expenses, UtcOffset::UTC);

        let got: Vec<_> = months
            .iter()
            .map(|month| (month.month, month.income, month.expense, month.net))
            .collect();
        assert_eq!(
            got,
            vec![
                (date!(2025-09-01), 500.0, 20.0, 480.0),
                (date!(2025-11-01), 200.0, 30.0, 170.0),
            ]
        );
    }

    #[test]
    fn monthly_summaries_use_local_offset() {
        let expenses = [expense_on(
            10.0,
            "Food",
            ExpenseType::Expense,
            datetime!(2025-09-30 20:00 UTC),
        )];

        let months = monthly_summaries(&expenses, UtcOffset::from_hms(13, 0, 0).unwrap());

        assert_eq!(months[0].month, date!(2025-10-01));
    }

    #[test]
    fn shares_sum_to_one_hundred() {
        let totals = CategoryTotals::from([
            ("Food".to_owned(), 25.0),
            ("Bills".to_owned(), 75.0),
        ]);

        let shares = category_shares(&totals);

        assert_eq!(shares[0].category, "Bills");
        assert_eq!(shares[0].percent, 75.0);
        assert_eq!(shares[1].category, "Food");
        assert_eq!(shares[1].percent, 25.0);
    }

    #[test]
    fn shares_of_empty_totals_is_empty() {
        assert!(category_shares(&CategoryTotals::new()).is_empty());
    }
}
