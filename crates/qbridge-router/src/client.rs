use std::time::Duration;

use wreq::Client;

/// Outbound client settings. The gateway uses the defaults; the tap raises
/// the request timeout so long-lived relays are bounded by the idle
/// timeout instead.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub stream_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(300),
            stream_idle_timeout: Duration::from_secs(30),
        }
    }
}

pub fn build_client(config: &ClientConfig) -> Result<Client, wreq::Error> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .read_timeout(config.stream_idle_timeout)
        .build()
}

/// Coarse transport-error classification used as a log field.
pub(crate) fn classify_error(err: &wreq::Error) -> &'static str {
    if err.is_timeout() {
        return "timeout";
    }
    if err.is_connect() || err.is_connection_reset() {
        return "connect";
    }
    "transport"
}
