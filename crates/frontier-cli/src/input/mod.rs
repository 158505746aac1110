pub mod csv_in;
pub mod file;
pub mod stdin;
