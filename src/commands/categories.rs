use crate::commands::Out;
use crate::model::{category_labels, TransactionType};
use serde::Serialize;

/// The category sets that entries are checked against.
#[derive(Debug, Clone, Serialize)]
pub struct Categories {
    pub expense: Vec<String>,
    pub income: Vec<String>,
}

/// Lists the expense and income categories.
pub fn categories() -> Out<Categories> {
    let expense = category_labels(TransactionType::Expense);
    let income = category_labels(TransactionType::Income);
    let message = format!(
        "Expense categories: {}\nIncome categories: {}",
        expense.join(", "),
        income.join(", ")
    );
    Out::new(message, Categories { expense, income })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let out = categories();
        let c = out.structure().unwrap();
        assert!(c.expense.contains(&"Groceries".to_string()));
        assert!(c.income.contains(&"Paycheck".to_string()));
        assert!(!c.income.contains(&"Groceries".to_string()));
    }
}
