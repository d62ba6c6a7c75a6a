use clap::Parser;

use qbridge_common::BridgeConfigPatch;

#[derive(Parser)]
#[command(name = "qbridge")]
pub(crate) struct Cli {
    /// Listen host.
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Listen port.
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Downstream OpenAI-compatible base URL, e.g. http://127.0.0.1:11434/v1.
    #[arg(long)]
    pub(crate) target_url: Option<String>,
    /// Log normalized requests and relay details.
    #[arg(long)]
    pub(crate) debug: bool,
}

impl Cli {
    pub(crate) fn patch(&self) -> BridgeConfigPatch {
        BridgeConfigPatch {
            host: self.host.clone(),
            port: self.port,
            target_url: self.target_url.clone(),
            debug: self.debug.then_some(true),
        }
    }
}
