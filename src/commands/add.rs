use crate::args::{AddExpenseArgs, AddIncomeArgs};
use crate::commands::{today_or, Out};
use crate::entry::{Entry, ExpenseEntry, IncomeEntry};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Transaction};
use crate::{api, Config, Result};
use serde::{Deserialize, Serialize};

/// The outcome of a successful `add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Added {
    /// The row as it was appended.
    pub transaction: Transaction,
    /// The number of transactions in the worksheet after the append.
    pub rows: usize,
}

/// Records an expense. The date defaults to today.
pub async fn add_expense(config: &Config, args: &AddExpenseArgs) -> Result<Out<Added>> {
    let entry = ExpenseEntry {
        category: args.category.clone(),
        description: args.description.clone(),
        amount: args.amount.value(),
        date: today_or(args.date),
    };
    add(config, entry.into()).await
}

/// Records an income. The date defaults to today.
pub async fn add_income(config: &Config, args: &AddIncomeArgs) -> Result<Out<Added>> {
    let entry = IncomeEntry {
        category: Some(args.category.clone()),
        amount: args.amount.value(),
        date: today_or(args.date),
    };
    add(config, entry.into()).await
}

/// Validates `entry` and appends it to the worksheet. A rejected entry is returned as an error and
/// nothing is written.
pub async fn add(config: &Config, entry: Entry) -> Result<Out<Added>> {
    let transaction = entry.validate().pub_result(ErrorType::Entry)?;
    let mut store = api::store(config).await.pub_result(ErrorType::Store)?;
    let rows = store
        .append(&transaction)
        .await
        .pub_result(ErrorType::Store)?;

    let message = format!(
        "Added {} of {} in {} on {} to '{}', which now has {rows} transactions",
        transaction.kind(),
        Amount::currency(transaction.amount().value()),
        transaction.category(),
        transaction.date(),
        store.worksheet(),
    );
    Ok(Out::new(message, Added { transaction, rows }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn expense_args(category: &str, description: &str, amount: &str) -> AddExpenseArgs {
        AddExpenseArgs {
            category: category.to_string(),
            description: description.to_string(),
            amount: Amount::from_str(amount).unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15),
        }
    }

    #[tokio::test]
    async fn test_add_expense_then_income() {
        let env = TestEnv::new().await;
        let config = env.config();

        let out = add_expense(&config, &expense_args("groceries", "milk", "$10.50"))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().rows, 1);
        assert!(out.message().contains("$10.50"));

        let income = AddIncomeArgs {
            category: "paycheck".to_string(),
            amount: Amount::from_str("2,000").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 1, 20),
        };
        let out = add_income(&config, &income).await.unwrap();
        assert_eq!(out.structure().unwrap().rows, 2);

        let csv = env.worksheet().await;
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,Category,Item,Amount,Type",
                "2024-01-15,Groceries,milk,10.50,Expense",
                "2024-01-20,Paycheck,,2000.00,Income",
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_entry_writes_nothing() {
        let env = TestEnv::new().await;
        let config = env.config();
        env.seed(&[
            &["Date", "Category", "Item", "Amount", "Type"],
            &["2024-01-01", "Rent", "", "900", "Expense"],
        ])
        .await;
        let before = env.worksheet().await;

        for args in [
            expense_args("Groceries", "milk", "0"),
            expense_args("Groceries", "milk", "-5"),
            expense_args("Groceries", "  ", "5"),
            expense_args("Paycheck", "milk", "5"),
        ] {
            let e = add_expense(&config, &args).await.unwrap_err();
            assert!(format!("{e:#}").starts_with("entry error"), "{e:#}");
        }
        assert_eq!(env.worksheet().await, before);
    }
}
