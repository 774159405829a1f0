pub mod json;

pub use json::{
    array_field, as_array, first_truthy, lenient_f64, lenient_i64, parse_metadata, split_csv,
    str_field, truthy,
};
