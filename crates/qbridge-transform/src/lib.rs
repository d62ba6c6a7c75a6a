//! Request-shape translation between the Gemini-style inbound dialect and
//! the flatter OpenAI-style dialect expected by the downstream server.

mod request;

#[cfg(test)]
mod tests;

pub use request::{
    CAPPED_MAX_TOKENS, DEFAULT_MODEL, DROPPED_FIELDS, MAX_TOKENS_LIMIT, PASSTHROUGH_FIELDS,
    normalize,
};
