//! Request and response bodies of the availability service.

use std::collections::HashMap;

use availgrid_core::{GridMode, Time24, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct StudentsResponse {
    #[serde(default)]
    pub students: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateStudent<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRequestBody {
    pub days: Vec<Weekday>,
    pub start_time: Time24,
    pub end_time: Time24,
    pub slot_minutes: u16,
    pub mode: GridMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridResponse {
    pub days: Vec<String>,
    pub grid: HashMap<String, Vec<WireCell>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireCell {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub names: Vec<String>,
}

/// Error body; `detail` is usually a string but may be structured.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}
