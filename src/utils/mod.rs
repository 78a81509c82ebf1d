pub mod errors;
pub mod table;

pub use errors::AppError;
pub use table::Table;
