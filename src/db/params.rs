//! Conversion from tool-level parameter values to ODBC bind parameters.

use odbc_api::parameter::{InputParameter, VarCharBox};

use crate::models::SqlParam;

/// Convert parameter values into boxed ODBC input parameters.
///
/// The number of parameters is only known at runtime, so each value is
/// boxed behind the `InputParameter` trait and the resulting slice is
/// handed to the driver as a parameter collection.
pub fn bind_params(params: &[SqlParam]) -> Vec<Box<dyn InputParameter>> {
    params
        .iter()
        .map(|p| -> Box<dyn InputParameter> {
            match p {
                SqlParam::Null => Box::new(VarCharBox::null()),
                SqlParam::Int(v) => Box::new(*v),
                SqlParam::Float(v) => Box::new(*v),
                SqlParam::Text(s) => Box::new(VarCharBox::from_string(s.clone())),
            }
        })
        .collect()
}
