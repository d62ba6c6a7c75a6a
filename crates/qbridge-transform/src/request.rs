use serde_json::{Map, Value, json};

/// Model used when the inbound request names none.
pub const DEFAULT_MODEL: &str = "qwen3-coder:latest";

/// Token budgets strictly above this are treated as runaway requests.
/// Some Gemini-CLI forks ask for 200k+ completion tokens by default.
pub const MAX_TOKENS_LIMIT: i64 = 100_000;

/// Replacement budget for runaway `max_tokens` requests.
pub const CAPPED_MAX_TOKENS: i64 = 4096;

/// Fields both dialects agree on; copied verbatim when present on input,
/// including falsy values such as `0`, `false` and `null`.
pub const PASSTHROUGH_FIELDS: &[&str] = &[
    "top_p",
    "frequency_penalty",
    "presence_penalty",
    "stream",
    "stop",
    "n",
];

/// Gemini-only fields that never reach the outbound request. The output is
/// rebuilt from an allowlist, so these are dropped by construction; the
/// list exists for membership checks in tests and diagnostics.
pub const DROPPED_FIELDS: &[&str] = &[
    "generationConfig",
    "safetySettings",
    "tools",
    "toolConfig",
    "systemInstruction",
];

/// Rebuild an inbound Gemini-style chat request as an OpenAI-style one.
///
/// Total over arbitrary input: absent, null or non-object input yields the
/// minimal `{"model": DEFAULT_MODEL}` request. The output never aliases
/// the input; `messages` is a shallow copy.
pub fn normalize(input: Option<&Value>) -> Value {
    let mut output = Map::new();

    let Some(input) = input.and_then(Value::as_object) else {
        output.insert("model".to_string(), Value::from(DEFAULT_MODEL));
        return Value::Object(output);
    };

    let model = input
        .get("model")
        .and_then(Value::as_str)
        .filter(|model| !model.is_empty())
        .unwrap_or(DEFAULT_MODEL);
    output.insert("model".to_string(), Value::from(model));

    if let Some(messages) = input.get("messages").and_then(Value::as_array) {
        output.insert("messages".to_string(), Value::Array(messages.clone()));
    }

    if let Some(message) = system_message(input) {
        let messages = output
            .entry("messages")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Some(items) = messages.as_array_mut() {
            items.insert(0, message);
        }
    }

    // Direct field wins over the nested generationConfig form.
    if let Some(temperature) = input
        .get("temperature")
        .or_else(|| nested(input, "generationConfig", "temperature"))
    {
        output.insert("temperature".to_string(), temperature.clone());
    }

    if let Some(max_tokens) = input
        .get("max_tokens")
        .or_else(|| nested(input, "generationConfig", "maxOutputTokens"))
    {
        output.insert("max_tokens".to_string(), cap_max_tokens(max_tokens));
    }

    for field in PASSTHROUGH_FIELDS {
        if let Some(value) = input.get(*field) {
            output.insert((*field).to_string(), value.clone());
        }
    }

    Value::Object(output)
}

/// Join `systemInstruction.parts` into a single system message.
///
/// Every part contributes a segment (missing `text` becomes an empty one),
/// so empty and whitespace-only parts still produce newline separators. A
/// whitespace-only join result still counts as content.
fn system_message(input: &Map<String, Value>) -> Option<Value> {
    let parts = input.get("systemInstruction")?.get("parts")?.as_array()?;

    let content = parts
        .iter()
        .map(|part| part.get("text").and_then(Value::as_str).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");

    if content.is_empty() {
        return None;
    }

    Some(json!({"role": "system", "content": content}))
}

/// Copy a `max_tokens`-equivalent value, replacing runaway numeric budgets
/// with the fixed cap. The comparison only applies to numbers; anything
/// else passes through untouched.
fn cap_max_tokens(value: &Value) -> Value {
    let runaway = value
        .as_f64()
        .map(|tokens| tokens > MAX_TOKENS_LIMIT as f64)
        .unwrap_or(false);
    if runaway {
        Value::from(CAPPED_MAX_TOKENS)
    } else {
        value.clone()
    }
}

fn nested<'a>(input: &'a Map<String, Value>, outer: &str, key: &str) -> Option<&'a Value> {
    input.get(outer)?.get(key)
}
