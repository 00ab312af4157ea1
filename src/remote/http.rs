//! PRISM repository served over HTTP(S). Folders are listed by reading the
//! server's directory index page.

use std::{path::Path, time::Duration};

use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use super::Remote;
use crate::{
    config::Config,
    download::fetch_to_file,
    error::{PrismError, Result},
};

const REQUEST_TIMEOUT_SECS: u64 = 600;

pub struct HttpRemote {
    host: String,
    credentials: Option<(String, String)>,
    client: Option<Client>,
}

impl HttpRemote {
    pub fn new(config: &Config) -> Self {
        let credentials =
            (!config.is_anonymous()).then(|| (config.user.clone(), config.password.clone()));

        HttpRemote {
            host: config.host.trim_end_matches('/').to_string(),
            credentials,
            client: None,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str) -> Result<RequestBuilder> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| PrismError::NotConnected(self.host.clone()))?;

        let request = client.get(self.url(path));
        Ok(match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        })
    }
}

impl Remote for HttpRemote {
    async fn connect(&mut self) -> Result<()> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        self.client = Some(client);
        debug!(host = %self.host, "connected");

        Ok(())
    }

    async fn close(&mut self) {
        if self.client.take().is_some() {
            debug!(host = %self.host, "connection closed");
        }
    }

    /// A folder the server does not have (a year not yet published) lists as
    /// empty. Other failures are errors.
    async fn list(&mut self, folder: &str) -> Result<Vec<String>> {
        let response = self.get(folder)?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(folder, "folder not found, listing as empty");
            return Ok(Vec::new());
        }
        let body = response.error_for_status()?.text().await?;

        Ok(parse_index(folder, &body))
    }

    async fn fetch(&mut self, path: &str, dest: &Path) -> Result<u64> {
        fetch_to_file(self.get(path)?, dest).await
    }
}

/// File links of a directory index page, prefixed with `folder`. Sort links,
/// parent and sub-directories, and absolute links are skipped.
pub fn parse_index(folder: &str, body: &str) -> Vec<String> {
    let mut listing: Vec<String> = body
        .split("href=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .filter(|name| is_file_link(name))
        .map(|name| format!("{}{}", folder, name))
        .collect();
    listing.dedup();

    listing
}

fn is_file_link(name: &str) -> bool {
    !name.is_empty()
        && !name.ends_with('/')
        && !name.contains("://")
        && !name.starts_with(['?', '/', '.', '#'])
}

// -- Tests -------------------------------------------------------------------
