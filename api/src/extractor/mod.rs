mod json;

pub use json::{Json, Valid};
