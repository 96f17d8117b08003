pub mod document;
pub mod result;
pub mod result_file;
pub mod session;

mod lenient_f64;
