//! Process-wide outbound HTTP clients.

use std::fs;
use std::time::Duration;

use thiserror::Error;

use crate::config::{ClientCertConfig, WebcallConfig};
use crate::customization::WebcallHooks;
use crate::logging::{LogLevel, LogType};
use crate::session::Session;

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("cannot read client certificate material '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot build webcall client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A plain client and, when configured, one presenting a client certificate.
#[derive(Debug, Clone)]
pub struct WebcallClients {
    plain: reqwest::Client,
    with_cert: Option<reqwest::Client>,
}

impl WebcallClients {
    pub fn new<H>(config: &WebcallConfig, hooks: &H) -> Result<Self, ClientBuildError>
    where
        H: WebcallHooks + ?Sized,
    {
        let plain = hooks.configure_client(base_builder(config)).build()?;
        let with_cert = match &config.client_cert {
            Some(cert) => {
                let identity = load_identity(cert)?;
                let builder = base_builder(config).identity(identity);
                Some(hooks.configure_client(builder).build()?)
            }
            None => None,
        };
        Ok(Self { plain, with_cert })
    }

    pub fn has_client_cert(&self) -> bool {
        self.with_cert.is_some()
    }

    pub(crate) fn select(&self, session: &Session, send_client_cert: bool) -> &reqwest::Client {
        if !send_client_cert {
            return &self.plain;
        }
        match &self.with_cert {
            Some(client) => client,
            None => {
                session.log(
                    LogType::WEBCALL_START,
                    LogLevel::Warn,
                    "Client",
                    "Certificate",
                    "No client certificate is configured; sending without it",
                );
                &self.plain
            }
        }
    }
}

fn base_builder(config: &WebcallConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .danger_accept_invalid_certs(config.skip_server_cert_verification)
}

fn load_identity(cert: &ClientCertConfig) -> Result<reqwest::Identity, ClientBuildError> {
    let mut pem = read_pem(&cert.cert_path)?;
    pem.push(b'\n');
    pem.extend(read_pem(&cert.key_path)?);
    Ok(reqwest::Identity::from_pem(&pem)?)
}

fn read_pem(path: &str) -> Result<Vec<u8>, ClientBuildError> {
    fs::read(path).map_err(|source| ClientBuildError::Io {
        path: path.to_string(),
        source,
    })
}
