use qbridge_common::BridgeConfigPatch;

/// Environment layer of the config merge (CLI > ENV > defaults).
///
/// `OPENAI_BASE_URL` is honored as a fallback target so the bridge drops
/// into setups that already export it.
pub(crate) fn env_patch() -> BridgeConfigPatch {
    BridgeConfigPatch {
        host: non_empty_var("BRIDGE_HOST"),
        port: non_empty_var("BRIDGE_PORT").and_then(|value| value.parse().ok()),
        target_url: non_empty_var("BRIDGE_TARGET_URL").or_else(|| non_empty_var("OPENAI_BASE_URL")),
        debug: non_empty_var("BRIDGE_DEBUG").map(|value| value == "true"),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
