use serde_json::{Value, json};

use super::*;

fn normalize_value(input: Value) -> Value {
    normalize(Some(&input))
}

#[test]
fn removes_gemini_specific_fields() {
    let output = normalize_value(json!({
        "model": "qwen3-coder:latest",
        "messages": [{"role": "user", "content": "test"}],
        "generationConfig": {
            "temperature": 0.7,
            "maxOutputTokens": 4096,
        },
        "safetySettings": [{
            "category": "HARM_CATEGORY_HARASSMENT",
            "threshold": "BLOCK_MEDIUM_AND_ABOVE",
        }],
        "tools": [{"name": "test_tool"}],
        "toolConfig": {"mode": "auto"},
    }));

    for field in DROPPED_FIELDS {
        assert!(output.get(*field).is_none(), "{field} must not be emitted");
    }
    assert_eq!(
        output,
        json!({
            "model": "qwen3-coder:latest",
            "messages": [{"role": "user", "content": "test"}],
            "temperature": 0.7,
            "max_tokens": 4096,
        })
    );
}

#[test]
fn caps_excessive_token_counts() {
    let output = normalize_value(json!({
        "model": "qwen3-coder:latest",
        "messages": [{"role": "user", "content": "test"}],
        "max_tokens": 229_018,
    }));
    assert_eq!(output["max_tokens"], json!(CAPPED_MAX_TOKENS));

    let output = normalize_value(json!({
        "generationConfig": {"maxOutputTokens": 200_000},
    }));
    assert_eq!(output["max_tokens"], json!(CAPPED_MAX_TOKENS));
}

#[test]
fn cap_is_strictly_above_the_limit() {
    let at_limit = normalize_value(json!({"max_tokens": MAX_TOKENS_LIMIT}));
    assert_eq!(at_limit["max_tokens"], json!(MAX_TOKENS_LIMIT));

    let above = normalize_value(json!({"max_tokens": MAX_TOKENS_LIMIT + 1}));
    assert_eq!(above["max_tokens"], json!(CAPPED_MAX_TOKENS));

    let modest = normalize_value(json!({"max_tokens": 1000}));
    assert_eq!(modest["max_tokens"], json!(1000));
}

#[test]
fn max_tokens_omitted_without_a_source() {
    let output = normalize_value(json!({"messages": []}));
    assert!(output.get("max_tokens").is_none());
}

#[test]
fn direct_max_tokens_wins_over_generation_config() {
    let output = normalize_value(json!({
        "max_tokens": 512,
        "generationConfig": {"maxOutputTokens": 2048},
    }));
    assert_eq!(output["max_tokens"], json!(512));
}

#[test]
fn extracts_temperature_from_generation_config() {
    let output = normalize_value(json!({
        "model": "qwen3-coder:latest",
        "messages": [],
        "generationConfig": {"temperature": 0.8},
    }));
    assert_eq!(output["temperature"], json!(0.8));
    assert!(output.get("generationConfig").is_none());
}

#[test]
fn direct_temperature_wins_over_generation_config() {
    let output = normalize_value(json!({
        "temperature": 0.2,
        "generationConfig": {"temperature": 0.9},
    }));
    assert_eq!(output["temperature"], json!(0.2));
}

#[test]
fn converts_system_instruction_to_system_message() {
    let output = normalize_value(json!({
        "messages": [{"role": "user", "content": "Hello"}],
        "systemInstruction": {
            "parts": [
                {"text": "You are a helpful assistant."},
                {"text": "Be concise."},
            ],
        },
    }));

    assert_eq!(
        output["messages"],
        json!([
            {"role": "system", "content": "You are a helpful assistant.\nBe concise."},
            {"role": "user", "content": "Hello"},
        ])
    );
    assert!(output.get("systemInstruction").is_none());
}

#[test]
fn creates_messages_for_system_instruction_alone() {
    let output = normalize_value(json!({
        "model": "test-model",
        "systemInstruction": {"parts": [{"text": "System prompt"}]},
    }));

    assert_eq!(
        output["messages"],
        json!([{"role": "system", "content": "System prompt"}])
    );
}

#[test]
fn empty_parts_add_no_system_message() {
    let output = normalize_value(json!({
        "model": "test-model",
        "messages": [{"role": "user", "content": "Hello"}],
        "systemInstruction": {"parts": []},
    }));

    assert_eq!(
        output["messages"],
        json!([{"role": "user", "content": "Hello"}])
    );
}

#[test]
fn whitespace_parts_still_join() {
    let output = normalize_value(json!({
        "model": "test-model",
        "messages": [{"role": "user", "content": "Hello"}],
        "systemInstruction": {
            "parts": [
                {"text": ""},
                {"text": "   "},
                {"text": "Valid content"},
            ],
        },
    }));

    assert_eq!(
        output["messages"][0],
        json!({"role": "system", "content": "\n   \nValid content"})
    );

    // A lone whitespace part is non-empty after joining, so it still
    // creates a system message.
    let output = normalize_value(json!({
        "systemInstruction": {"parts": [{"text": "   "}]},
    }));
    assert_eq!(
        output["messages"],
        json!([{"role": "system", "content": "   "}])
    );
}

#[test]
fn preserves_openai_compatible_fields() {
    let output = normalize_value(json!({
        "model": "qwen3-coder:latest",
        "messages": [{"role": "user", "content": "test"}],
        "temperature": 0.8,
        "top_p": 0.95,
        "frequency_penalty": 0.5,
        "presence_penalty": 0.2,
        "stream": true,
        "max_tokens": 1000,
    }));

    assert_eq!(output["temperature"], json!(0.8));
    assert_eq!(output["top_p"], json!(0.95));
    assert_eq!(output["frequency_penalty"], json!(0.5));
    assert_eq!(output["presence_penalty"], json!(0.2));
    assert_eq!(output["stream"], json!(true));
    assert_eq!(output["max_tokens"], json!(1000));
}

#[test]
fn passthrough_uses_presence_not_truthiness() {
    let output = normalize_value(json!({
        "top_p": 0,
        "stream": false,
        "n": 0,
        "stop": "",
        "presence_penalty": null,
    }));

    assert_eq!(output["top_p"], json!(0));
    assert_eq!(output["stream"], json!(false));
    assert_eq!(output["n"], json!(0));
    assert_eq!(output["stop"], json!(""));
    assert!(output.as_object().unwrap().contains_key("presence_penalty"));
    assert_eq!(output["presence_penalty"], Value::Null);
}

#[test]
fn handles_absent_and_empty_input() {
    let expected = json!({"model": DEFAULT_MODEL});
    assert_eq!(normalize(None), expected);
    assert_eq!(normalize(Some(&Value::Null)), expected);
    assert_eq!(normalize_value(json!({})), expected);
    assert_eq!(normalize_value(json!("not an object")), expected);
    assert_eq!(normalize_value(json!([1, 2, 3])), expected);
}

#[test]
fn empty_model_falls_back_to_default() {
    let output = normalize_value(json!({"model": ""}));
    assert_eq!(output["model"], json!(DEFAULT_MODEL));

    let output = normalize_value(json!({"model": "m"}));
    assert_eq!(output["model"], json!("m"));
}

#[test]
fn messages_are_copied_not_aliased() {
    let input = json!({
        "messages": [{"role": "user", "content": "hi"}],
        "systemInstruction": {"parts": [{"text": "sys"}]},
    });
    let before = input.clone();

    let output = normalize(Some(&input));

    // The system message lands in the output only; the input is untouched.
    assert_eq!(input, before);
    assert_eq!(output["messages"].as_array().unwrap().len(), 2);
    assert_eq!(input["messages"].as_array().unwrap().len(), 1);
}
