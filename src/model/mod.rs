//! Types that represent the form's data model, such as `TransactionRow` and `Category`.
mod amount;
mod bounds;
mod category;
mod row;

pub use amount::{Amount, AmountError};
pub(crate) use bounds::DATE_FORMAT;
pub use bounds::SessionBounds;
pub use category::Category;
pub use row::{Field, FieldErrors, TransactionRow, DESCRIPTION_MAX_CHARS};
