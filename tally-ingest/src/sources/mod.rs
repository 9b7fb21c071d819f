pub mod csv_file;
pub mod json_file;

pub use csv_file::CsvSource;
pub use json_file::JsonSource;
