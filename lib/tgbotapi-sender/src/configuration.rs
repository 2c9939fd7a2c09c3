// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use serde::Deserialize;
use std::time::Duration;

/// Address of the official Bot API server.
pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// How long a request may take unless the caller asks for something else.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Configuration required to create a [`crate::Sender`] (and, by extension, a client).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// The bot token, as given by @BotFather. Required.
    pub token: String,

    /// Base URL of the Bot API server. Only needs changing when running a local
    /// Bot API server or a test double.
    pub base_url: String,

    /// Outbound proxy through which every request is sent, if any.
    pub proxy: Option<ProxyConfiguration>,

    /// Timeout applied to requests that don't specify their own.
    #[serde(with = "millis")]
    pub timeout: Duration,
}

/// Proxy settings.
///
/// The proxy URL is assembled as `{scheme}://[user:password@]host:port`, where the scheme
/// is `https` if [`ProxyConfiguration::https`] is set and `http` otherwise.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProxyConfiguration {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub https: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Configuration {
    /// Default configuration for the given token.
    pub fn new<T: Into<String>>(token: T) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    /// The URL every method name is appended to, `{base_url}/bot{token}/`.
    pub fn base_path(&self) -> String {
        format!("{}/bot{}/", self.base_url.trim_end_matches('/'), self.token)
    }
}

impl ProxyConfiguration {
    pub fn url(&self) -> String {
        let mut url = String::from(if self.https { "https://" } else { "http://" });
        // Credentials are only embedded when both halves are present.
        if let (Some(user), Some(password)) = (&self.user, &self.password) {
            url.push_str(user);
            url.push(':');
            url.push_str(password);
            url.push('@');
        }
        url.push_str(&self.host);
        url.push(':');
        url.push_str(&self.port.to_string());
        url
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
