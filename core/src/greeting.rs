use std::borrow::Cow;
use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::config::FORMAT_KEY;
use crate::context::FunctionContext;
use crate::errors::{FunctionError, Result};

/// Name the greeting is registered under.
pub const GET_CURRENT_TIME: &str = "getCurrentTime";

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub result: String,
}

pub fn get_current_time(context: &dyn FunctionContext, data: &Value) -> Result<Value> {
    format_greeting(&SystemClock, context, data)
}

/// Greets `data.name` with the clock's time rendered by the `format` config value.
pub fn format_greeting(
    clock: &dyn Clock,
    context: &dyn FunctionContext,
    data: &Value,
) -> Result<Value> {
    let user = User::deserialize(data).map_err(|e| FunctionError::Validation {
        reason: e.to_string(),
    })?;
    let now = clock.now();
    let pattern = context
        .get_config(FORMAT_KEY)
        .ok_or_else(|| FunctionError::Format {
            reason: format!("no `{}` configured", FORMAT_KEY),
        })?;

    if pattern.is_empty() {
        return Err(FunctionError::Format {
            reason: format!("`{}` cannot be empty", FORMAT_KEY),
        });
    }

    let pattern = microsecond_fraction(&pattern);
    let items: Vec<Item<'_>> = StrftimeItems::new(&pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(FunctionError::Format {
            reason: format!("invalid time format `{}`", pattern),
        });
    }

    // Display fails when a specifier needs data the timestamp lacks.
    let mut formatted = String::new();
    write!(formatted, "{}", now.format_with_items(items.iter())).map_err(|_| {
        FunctionError::Format {
            reason: format!("cannot render time with format `{}`", pattern),
        }
    })?;

    let greeting = Greeting {
        result: format!("Hi, {}, the current time is {}.", user.name, formatted),
    };
    Ok(serde_json::to_value(greeting)?)
}

/// Rewrites `%f` to `%6f` so fractions render as microseconds, the usual
/// strftime width. Escaped `%%f` is left alone.
fn microsecond_fraction(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains("%f") {
        return Cow::Borrowed(pattern);
    }

    let mut rewritten = String::with_capacity(pattern.len() + 2);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        rewritten.push(c);
        if c != '%' {
            continue;
        }
        match chars.next() {
            Some('f') => rewritten.push_str("6f"),
            Some(next) => rewritten.push(next),
            None => {}
        }
    }
    Cow::Owned(rewritten)
}
