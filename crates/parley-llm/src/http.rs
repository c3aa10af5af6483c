//! The HTTP client behind every hosted provider.

use std::sync::LazyLock;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
/// Gap allowed between two reads. Streamed replies may take longer than this overall.
const READ_TIMEOUT: Duration = Duration::from_secs(90);

static CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .expect("static TLS and timeout settings are valid")
});

/// A handle to the process-wide client. Clones share one connection pool.
#[must_use]
pub fn default_client() -> reqwest::Client {
    CLIENT.clone()
}
