//! Normalization of the JSON payload Claude Code pipes on every tick.
//!
//! The payload is walked as a `serde_json::Value` rather than deserialized
//! into a fixed struct: any nested field may be missing or of the wrong
//! type, and that must never fail the render. Only a top-level value that
//! is not an object is rejected.

use serde_json::Value;

use crate::error::StatuslineError;

/// Context window size assumed when the payload omits it.
pub const DEFAULT_CONTEXT_WINDOW: i64 = 200_000;

/// Canonical, fully-defaulted view of one stdin payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusInput {
    pub working_directory: Option<String>,
    pub model_name: Option<String>,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub cache_read_tokens: i64,
    pub context_window_size: i64,
    pub precalculated_percentage: Option<f64>,
    pub remaining_percentage: f64,
    /// Explicit "until compact" figure, if the host supplied one.
    pub until_compact: Option<f64>,
    pub cost_usd: Option<f64>,
    pub skills_count: usize,
    pub agents_count: usize,
    pub mcp_tools_count: usize,
    pub background_task_count: usize,
}

impl Default for StatusInput {
    fn default() -> Self {
        Self {
            working_directory: None,
            model_name: None,
            total_input_tokens: 0,
            total_output_tokens: 0,
            cache_read_tokens: 0,
            context_window_size: DEFAULT_CONTEXT_WINDOW,
            precalculated_percentage: None,
            remaining_percentage: 0.0,
            until_compact: None,
            cost_usd: None,
            skills_count: 0,
            agents_count: 0,
            mcp_tools_count: 0,
            background_task_count: 0,
        }
    }
}

impl StatusInput {
    /// Parse raw stdin text. Fails only on invalid JSON or a non-object root.
    pub fn parse(raw: &str) -> Result<Self, StatuslineError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, StatuslineError> {
        if !value.is_object() {
            return Err(StatuslineError::NotAnObject(json_kind(value)));
        }

        let working_directory = non_empty_str(value.pointer("/workspace/current_dir"))
            .or_else(|| non_empty_str(value.get("cwd")));
        let model_name = non_empty_str(value.pointer("/model/display_name"));

        let cw = value.get("context_window");
        let field = |name: &str| cw.and_then(|c| c.get(name));

        let context_window_size = number(field("context_window_size"))
            .map(|n| n.trunc() as i64)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_CONTEXT_WINDOW);

        let until_compact = number(field("until_compact"))
            .or_else(|| number(field("until_auto_compact")));

        let ctx = value.get("context");
        let array_len = |name: &str| {
            ctx.and_then(|c| c.get(name))
                .and_then(Value::as_array)
                .map_or(0, Vec::len)
        };

        Ok(Self {
            working_directory,
            model_name,
            total_input_tokens: token_count(field("total_input_tokens")),
            total_output_tokens: token_count(field("total_output_tokens")),
            cache_read_tokens: token_count(
                cw.and_then(|c| c.pointer("/current_usage/cache_read_input_tokens")),
            ),
            context_window_size,
            precalculated_percentage: number(field("used_percentage")),
            remaining_percentage: number(field("remaining_percentage")).unwrap_or(0.0),
            until_compact,
            cost_usd: number(value.pointer("/cost/total_cost_usd")),
            skills_count: array_len("skills"),
            agents_count: array_len("agents"),
            mcp_tools_count: array_len("mcp_tools"),
            background_task_count: background_tasks(value),
        })
    }
}

/// Count of background work, from the first truthy of the known keys.
fn background_tasks(value: &Value) -> usize {
    ["background_tasks", "running_agents", "active_tasks"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find(|v| is_truthy(v))
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Numeric coercion: JSON numbers and numeric strings. Empty strings,
/// non-numeric strings and every other type count as absent.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn token_count(value: Option<&Value>) -> i64 {
    number(value).map_or(0, |n| n.trunc() as i64)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_defaults() {
        let input = StatusInput::parse("{}").unwrap();
        assert_eq!(input, StatusInput::default());
        assert_eq!(input.context_window_size, 200_000);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            StatusInput::parse("not json"),
            Err(StatuslineError::Json(_))
        ));
        assert!(StatusInput::parse("").is_err());
    }

    #[test]
    fn test_non_object_root_is_error() {
        for raw in ["null", "5", "\"text\"", "[1, 2]", "true"] {
            assert!(
                matches!(StatusInput::parse(raw), Err(StatuslineError::NotAnObject(_))),
                "root {} must be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_full_payload() {
        let raw = r#"{
            "workspace": {"current_dir": "/home/me/project"},
            "cwd": "/ignored",
            "model": {"display_name": "Opus 4.5"},
            "context_window": {
                "total_input_tokens": 1000,
                "total_output_tokens": 200,
                "current_usage": {"cache_read_input_tokens": 30},
                "context_window_size": 100000,
                "used_percentage": 12.9,
                "remaining_percentage": 60
            },
            "cost": {"total_cost_usd": 1.234},
            "context": {"skills": [1, 2], "agents": [1], "mcp_tools": [1, 2, 3]},
            "background_tasks": [{}, {}]
        }"#;
        let input = StatusInput::parse(raw).unwrap();
        assert_eq!(input.working_directory.as_deref(), Some("/home/me/project"));
        assert_eq!(input.model_name.as_deref(), Some("Opus 4.5"));
        assert_eq!(input.total_input_tokens, 1000);
        assert_eq!(input.total_output_tokens, 200);
        assert_eq!(input.cache_read_tokens, 30);
        assert_eq!(input.context_window_size, 100_000);
        assert_eq!(input.precalculated_percentage, Some(12.9));
        assert_eq!(input.remaining_percentage, 60.0);
        assert_eq!(input.cost_usd, Some(1.234));
        assert_eq!(input.skills_count, 2);
        assert_eq!(input.agents_count, 1);
        assert_eq!(input.mcp_tools_count, 3);
        assert_eq!(input.background_task_count, 2);
    }

    #[test]
    fn test_cwd_fallback() {
        let input = StatusInput::parse(r#"{"cwd": "/tmp/x"}"#).unwrap();
        assert_eq!(input.working_directory.as_deref(), Some("/tmp/x"));

        let input =
            StatusInput::parse(r#"{"workspace": {"current_dir": ""}, "cwd": "/tmp/y"}"#).unwrap();
        assert_eq!(input.working_directory.as_deref(), Some("/tmp/y"));
    }

    #[test]
    fn test_non_positive_window_defaults() {
        for size in ["0", "-5", "\"abc\"", "null"] {
            let raw = format!(r#"{{"context_window": {{"context_window_size": {}}}}}"#, size);
            let input = StatusInput::parse(&raw).unwrap();
            assert_eq!(input.context_window_size, DEFAULT_CONTEXT_WINDOW, "size {}", size);
        }
    }

    #[test]
    fn test_wrong_types_degrade_to_defaults() {
        let raw = r#"{
            "model": "just-a-string",
            "workspace": 7,
            "context_window": {"total_input_tokens": {"nested": true}, "used_percentage": ""},
            "cost": [],
            "context": {"skills": "many"}
        }"#;
        let input = StatusInput::parse(raw).unwrap();
        assert!(input.model_name.is_none());
        assert!(input.working_directory.is_none());
        assert_eq!(input.total_input_tokens, 0);
        assert!(input.precalculated_percentage.is_none());
        assert!(input.cost_usd.is_none());
        assert_eq!(input.skills_count, 0);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let raw = r#"{"context_window": {"total_input_tokens": " 4200 ", "used_percentage": "45"}}"#;
        let input = StatusInput::parse(raw).unwrap();
        assert_eq!(input.total_input_tokens, 4200);
        assert_eq!(input.precalculated_percentage, Some(45.0));
    }

    #[test]
    fn test_until_compact_precedence() {
        let raw = r#"{"context_window": {"until_compact": 10, "until_auto_compact": 20}}"#;
        assert_eq!(StatusInput::parse(raw).unwrap().until_compact, Some(10.0));

        let raw = r#"{"context_window": {"until_auto_compact": 20}}"#;
        assert_eq!(StatusInput::parse(raw).unwrap().until_compact, Some(20.0));
    }

    #[test]
    fn test_background_task_key_order() {
        let raw = r#"{"running_agents": [1, 2, 3], "active_tasks": [1]}"#;
        assert_eq!(StatusInput::parse(raw).unwrap().background_task_count, 3);

        // An empty array is still the first truthy key.
        let raw = r#"{"background_tasks": [], "running_agents": [1, 2]}"#;
        assert_eq!(StatusInput::parse(raw).unwrap().background_task_count, 0);

        let raw = r#"{"background_tasks": null, "active_tasks": [1]}"#;
        assert_eq!(StatusInput::parse(raw).unwrap().background_task_count, 1);

        let raw = r#"{"background_tasks": 4}"#;
        assert_eq!(StatusInput::parse(raw).unwrap().background_task_count, 0);
    }

    #[test]
    fn test_negative_tokens_are_not_clamped() {
        let raw = r#"{"context_window": {"total_input_tokens": -500}}"#;
        assert_eq!(StatusInput::parse(raw).unwrap().total_input_tokens, -500);
    }
}
