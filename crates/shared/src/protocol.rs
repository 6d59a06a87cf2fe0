use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Item;

pub const LIST_PATH: &str = "/api/todo/list";
pub const ADD_PATH: &str = "/api/todo/add";
pub const DELETE_PATH: &str = "/api/todo/delete";
pub const EDIT_PATH: &str = "/api/todo/edit";

/// Body of the add and edit requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRequest {
    pub todo: Item,
}

impl TodoRequest {
    pub fn new(todo: Item) -> Self {
        Self { todo }
    }
}

/// Acknowledgements follow JavaScript truthiness: `null`, `false`, `0` and
/// `""` are negative, everything else (including `[]` and `{}`) is positive.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
