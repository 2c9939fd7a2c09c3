// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;
use std::io;
use tgbotapi_sender::InvocationError;

/// This error occurs when an update provider cannot be started or stopped.
#[derive(Debug)]
pub enum ProviderError {
    /// The client has no message provider to start or stop.
    NotSet,

    /// The provider is already attached to a client.
    AlreadyStarted,

    /// The provider is not attached to any client.
    NotStarted,

    /// Webhooks without an explicit URL must listen on one of the ports Telegram accepts.
    PortNotAllowed(u16),

    /// A key pair was configured but the crate was built without the `tls` feature.
    TlsUnsupported,

    /// The key pair could not be read or used.
    Tls(io::Error),

    /// The webhook listener could not be bound.
    Bind(io::Error),

    /// The provider was stopped before it finished starting.
    StartInterrupted,

    /// Telegram did not accept the webhook registration.
    ///
    /// Contains the invocation error if the call failed, or `None` if it completed
    /// without returning `true`.
    WebhookSetFailed(Option<InvocationError>),
}

impl std::error::Error for ProviderError {}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSet => write!(f, "provider error: message provider is not set"),
            Self::AlreadyStarted => write!(f, "provider error: already started"),
            Self::NotStarted => write!(f, "provider error: not started yet"),
            Self::PortNotAllowed(port) => {
                write!(f, "provider error: port {port} is not allowed for webhooks")
            }
            Self::StartInterrupted => {
                write!(f, "provider error: stopped before it finished starting")
            }
            Self::TlsUnsupported => write!(
                f,
                "provider error: a key pair was given but tls support is not enabled"
            ),
            Self::Tls(err) => write!(f, "provider error, key pair: {err}"),
            Self::Bind(err) => write!(f, "provider error, bind: {err}"),
            Self::WebhookSetFailed(Some(err)) => {
                write!(f, "provider error, failed to set webhook: {err}")
            }
            Self::WebhookSetFailed(None) => {
                write!(f, "provider error: failed to set webhook")
            }
        }
    }
}
