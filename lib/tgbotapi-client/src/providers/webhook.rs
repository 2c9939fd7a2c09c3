// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::UpdateProvider;
use crate::Client;
use crate::errors::ProviderError;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use futures_util::future::BoxFuture;
use log::{debug, info, trace, warn};
use serde::Deserialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tgbotapi_sender::{InputFile, Params};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Ports Telegram is willing to deliver webhook updates to.
pub const ALLOWED_PORTS: [u16; 4] = [80, 443, 88, 8443];

/// Configuration for [`Webhook`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WebhookConfiguration {
    /// Address to listen on.
    pub host: String,

    /// Port to listen on. Must be one of [`ALLOWED_PORTS`] unless `url` is set.
    pub port: u16,

    /// Public URL Telegram should deliver updates to, without the token.
    ///
    /// Defaults to `https://{host}:{port}`. Setting it allows running behind a proxy that
    /// listens on one of the allowed ports instead.
    pub url: Option<String>,

    /// PEM certificate to serve and to upload to Telegram, for self-signed certificates.
    pub public_key: Option<PathBuf>,

    /// PEM private key of `public_key`.
    pub private_key: Option<PathBuf>,

    /// Kinds of updates to receive. The server default applies when unset.
    pub allowed_updates: Option<Vec<String>>,

    /// Maximum simultaneous connections Telegram may open. The server default applies when
    /// unset.
    pub max_connections: Option<u32>,
}

impl Default for WebhookConfiguration {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8443,
            url: None,
            public_key: None,
            private_key: None,
            allowed_updates: None,
            max_connections: None,
        }
    }
}

struct KeyPair {
    certificate_name: String,
    certificate: Vec<u8>,
    #[cfg_attr(not(feature = "tls"), allow(dead_code))]
    key: Vec<u8>,
}

impl KeyPair {
    fn read(public_key: &std::path::Path, private_key: &std::path::Path) -> Result<Self, ProviderError> {
        if !cfg!(feature = "tls") {
            return Err(ProviderError::TlsUnsupported);
        }

        Ok(Self {
            certificate_name: public_key
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("certificate.pem")
                .to_string(),
            certificate: std::fs::read(public_key).map_err(ProviderError::Tls)?,
            key: std::fs::read(private_key).map_err(ProviderError::Tls)?,
        })
    }
}

struct RunningServer {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
}

impl RunningServer {
    fn shut_down(self) {
        // The server also stops if the receiver finds the channel closed.
        let _ = self.shutdown.send(());
        debug!("webhook server on {} is shutting down", self.local_addr);
    }
}

struct Attachment {
    client: Client,
    generation: u64,
    server: Option<RunningServer>,
}

#[derive(Default)]
struct HookState {
    generation: u64,
    attached: Option<Attachment>,
}

impl HookState {
    fn current(&self, generation: u64) -> Option<&Attachment> {
        self.attached
            .as_ref()
            .filter(|attachment| attachment.generation == generation)
    }
}

struct Shared {
    configuration: WebhookConfiguration,
    key_pair: Option<KeyPair>,
    state: Mutex<HookState>,
}

/// Receives updates through an HTTP server that Telegram posts them to.
///
/// Updates are accepted at `POST /{token}`. Each one is dispatched to the client before the
/// request is answered.
#[derive(Clone)]
pub struct Webhook(Arc<Shared>);

impl Webhook {
    /// Validates the configuration and reads the key pair, if any.
    pub fn new(configuration: WebhookConfiguration) -> Result<Self, ProviderError> {
        if configuration.url.is_none() && !ALLOWED_PORTS.contains(&configuration.port) {
            return Err(ProviderError::PortNotAllowed(configuration.port));
        }

        let key_pair = match (&configuration.public_key, &configuration.private_key) {
            (Some(public_key), Some(private_key)) => Some(KeyPair::read(public_key, private_key)?),
            _ => {
                debug!("webhook will listen over plain http");
                None
            }
        };

        Ok(Self(Arc::new(Shared {
            configuration,
            key_pair,
            state: Mutex::new(HookState::default()),
        })))
    }

    pub fn configuration(&self) -> &WebhookConfiguration {
        &self.0.configuration
    }

    pub fn is_started(&self) -> bool {
        self.state().attached.is_some()
    }

    /// The address the server is listening on, while started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.state()
            .attached
            .as_ref()
            .and_then(|attachment| attachment.server.as_ref())
            .map(|server| server.local_addr)
    }

    fn state(&self) -> MutexGuard<'_, HookState> {
        self.0.state.lock().unwrap()
    }

    /// The URL registered with Telegram, before the token is appended.
    fn public_url(&self) -> String {
        let configuration = &self.0.configuration;
        match configuration.url.as_ref() {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}:{}", configuration.host, configuration.port),
        }
    }

    async fn attach(&self, client: &Client) -> Result<(), ProviderError> {
        let generation = {
            let mut state = self.state();
            if state.attached.is_some() {
                return Err(ProviderError::AlreadyStarted);
            }
            state.generation += 1;
            state.attached = Some(Attachment {
                client: client.clone(),
                generation: state.generation,
                server: None,
            });
            state.generation
        };

        match self.serve(client, generation).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.release(generation);
                Err(err)
            }
        }
    }

    /// Undoes a start that did not complete.
    fn release(&self, generation: u64) {
        let attachment = {
            let mut state = self.state();
            if state.current(generation).is_some() {
                state.attached.take()
            } else {
                None
            }
        };
        if let Some(server) = attachment.and_then(|attachment| attachment.server) {
            server.shut_down();
        }
    }

    async fn serve(&self, client: &Client, generation: u64) -> Result<(), ProviderError> {
        let configuration = &self.0.configuration;
        let listener = TcpListener::bind((configuration.host.as_str(), configuration.port))
            .await
            .map_err(ProviderError::Bind)?;
        let local_addr = listener.local_addr().map_err(ProviderError::Bind)?;

        let (shutdown, signal) = oneshot::channel();
        self.spawn_server(listener, router(client.clone()), signal)
            .await?;

        {
            let mut state = self.state();
            match state.attached.as_mut() {
                Some(attachment) if attachment.generation == generation => {
                    attachment.server = Some(RunningServer {
                        local_addr,
                        shutdown,
                    });
                }
                // Dropping `shutdown` stops the server.
                _ => return Err(ProviderError::StartInterrupted),
            }
        }
        info!("listening for webhook updates on {local_addr}");

        self.register(client).await?;
        if self.state().current(generation).is_none() {
            warn!("webhook was stopped while it was being set");
            remove_webhook(client).await;
            return Err(ProviderError::StartInterrupted);
        }
        Ok(())
    }

    async fn spawn_server(
        &self,
        listener: TcpListener,
        router: Router,
        signal: oneshot::Receiver<()>,
    ) -> Result<(), ProviderError> {
        #[cfg(feature = "tls")]
        if let Some(key_pair) = self.0.key_pair.as_ref() {
            return tls::spawn(listener, router, key_pair, signal).await;
        }

        tokio::spawn(async move {
            let shutdown = async move {
                let _ = signal.await;
            };
            if let Err(err) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                warn!("webhook server failed: {err}");
            }
        });
        Ok(())
    }

    /// Tells Telegram where to deliver updates.
    async fn register(&self, client: &Client) -> Result<(), ProviderError> {
        let configuration = &self.0.configuration;
        let mut params =
            Params::new().with("url", format!("{}/{}", self.public_url(), client.token()));
        if let Some(key_pair) = self.0.key_pair.as_ref() {
            params.set(
                "certificate",
                InputFile::from_bytes(
                    key_pair.certificate_name.clone(),
                    key_pair.certificate.clone(),
                ),
            );
        }
        if let Some(allowed_updates) = configuration.allowed_updates.as_ref() {
            params.set("allowed_updates", Value::from(allowed_updates.clone()));
        }
        if let Some(max_connections) = configuration.max_connections {
            params.set("max_connections", max_connections);
        }

        match client.invoke("setWebhook", params).await {
            Ok(Value::Bool(true)) => {
                info!("webhook set to {}", self.public_url());
                Ok(())
            }
            Ok(result) => {
                warn!("setWebhook returned {result} instead of true");
                Err(ProviderError::WebhookSetFailed(None))
            }
            Err(err) => {
                warn!("failed to set webhook: {err}");
                Err(ProviderError::WebhookSetFailed(Some(err)))
            }
        }
    }

    async fn detach(&self) -> Result<(), ProviderError> {
        let attachment = self
            .state()
            .attached
            .take()
            .ok_or(ProviderError::NotStarted)?;
        if let Some(server) = attachment.server {
            server.shut_down();
        }
        remove_webhook(&attachment.client).await;
        info!("stopped receiving webhook updates");
        Ok(())
    }
}

impl UpdateProvider for Webhook {
    fn start<'a>(&'a self, client: &'a Client) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(self.attach(client))
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), ProviderError>> {
        Box::pin(self.detach())
    }
}

/// Asks Telegram to stop delivering updates, ignoring failures.
async fn remove_webhook(client: &Client) {
    match client.invoke("deleteWebhook", Params::new()).await {
        Ok(result) => debug!("removed webhook: {result}"),
        Err(err) => warn!("failed to remove webhook: {err}"),
    }
}

fn router(client: Client) -> Router {
    Router::new()
        .route("/{token}", post(receive_update))
        .with_state(client)
}

async fn receive_update(
    State(client): State<Client>,
    Path(token): Path<String>,
    body: Bytes,
) -> StatusCode {
    if token != client.token() {
        trace!("rejecting webhook request to an unknown path");
        return StatusCode::NOT_FOUND;
    }

    match serde_json::from_slice::<Value>(&body) {
        Ok(update) => client.dispatch(&update),
        Err(err) => warn!("dropping webhook request that is not json: {err}"),
    }
    StatusCode::OK
}

#[cfg(feature = "tls")]
mod tls {
    use super::KeyPair;
    use crate::errors::ProviderError;
    use axum::Router;
    use axum_server::Handle;
    use axum_server::tls_rustls::RustlsConfig;
    use log::warn;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    pub(super) async fn spawn(
        listener: TcpListener,
        router: Router,
        key_pair: &KeyPair,
        signal: oneshot::Receiver<()>,
    ) -> Result<(), ProviderError> {
        // Fails harmlessly if the application installed a provider of its own.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let config = RustlsConfig::from_pem(key_pair.certificate.clone(), key_pair.key.clone())
            .await
            .map_err(ProviderError::Tls)?;
        let listener = listener.into_std().map_err(ProviderError::Bind)?;

        let handle = Handle::new();
        let server = axum_server::from_tcp_rustls(listener, config).handle(handle.clone());
        tokio::spawn(async move {
            let _ = signal.await;
            handle.graceful_shutdown(None);
        });
        tokio::spawn(async move {
            if let Err(err) = server.serve(router.into_make_service()).await {
                warn!("webhook server failed: {err}");
            }
        });
        Ok(())
    }
}
