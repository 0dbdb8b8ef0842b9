//! Types that represent the core data model, such as `Transaction`, `Table` and `Month`.
mod amount;
mod category;
mod month;
mod table;
mod transaction;

pub use amount::{Amount, AmountError, AmountFormat, MAX_AMOUNT};
pub use category::{category_labels, ExpenseCategory, IncomeCategory};
pub use month::{Month, Period};
pub use table::{Table, CANONICAL_COLUMNS};
pub(crate) use table::is_blank;
pub use transaction::{Transaction, TransactionType, DATE_FORMAT};
