pub mod json;
pub mod xlsx;

pub use json::write_json;
pub use xlsx::{XlsxWorkbook, write_xlsx};
