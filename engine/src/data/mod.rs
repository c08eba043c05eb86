pub mod csv_parser;
pub mod csv_writer;
pub mod market_data;
pub mod source;
pub mod xlsx_writer;
