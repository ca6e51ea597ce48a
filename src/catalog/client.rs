use std::time::Duration;

use log::{debug, warn};

use crate::{
    catalog::{error::CatalogError, model::raw_tracks},
    config::CatalogConfig,
    domain::track::TrackDescriptor,
    ui::Reporter,
};

/// How a status code that is not an error for the caller should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    /// the server is in trouble, but whatever it sent is still used
    ServerProblem,
}

pub fn classify_status(code: u16) -> Result<StatusClass, CatalogError> {
    match code {
        403 => Err(CatalogError::Forbidden),
        404 => Err(CatalogError::NotFound),
        300..=499 => Err(CatalogError::InvalidResponse(code)),
        500.. => Ok(StatusClass::ServerProblem),
        _ => Ok(StatusClass::Ok),
    }
}

/// Blocking client of the SoundCloud-like catalog API.
///
/// Every request carries the configured `client_id`.
pub struct CatalogClient<'a> {
    agent: ureq::Agent,
    api_url: String,
    client_id: String,
    reporter: &'a dyn Reporter,
}

impl<'a> CatalogClient<'a> {
    pub fn new(config: &CatalogConfig, reporter: &'a dyn Reporter) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(30))
            .build();
        Self {
            agent,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            reporter,
        }
    }

    /// Tracks behind a track or playlist permalink
    pub fn resolve(&self, url: &str) -> Result<Vec<TrackDescriptor>, CatalogError> {
        let body = self.get(&self.resolve_uri(url))?;
        self.descriptors(&body)
    }

    pub fn search(&self, query: &str, limit: u32) -> Result<Vec<TrackDescriptor>, CatalogError> {
        let body = self.get(&self.search_uri(query, limit))?;
        self.descriptors(&body)
    }

    /// Tracks liked by the user with id `user_id`
    pub fn favorites_of(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TrackDescriptor>, CatalogError> {
        let body = self.get(&self.favorites_uri(user_id, limit, offset))?;
        self.descriptors(&body)
    }

    fn resolve_uri(&self, url: &str) -> String {
        format!(
            "{}/resolve?{}",
            self.api_url,
            self.query(&[("url", url.to_string())])
        )
    }

    fn search_uri(&self, query: &str, limit: u32) -> String {
        format!(
            "{}/tracks?{}",
            self.api_url,
            self.query(&[("q", query.to_string()), ("limit", limit.to_string())])
        )
    }

    fn favorites_uri(&self, user_id: &str, limit: u32, offset: u32) -> String {
        format!(
            "{}/users/{}/favorites?{}",
            self.api_url,
            urlencoding::encode(user_id),
            self.query(&[("limit", limit.to_string()), ("offset", offset.to_string())])
        )
    }

    /// Encodes `params` followed by the client id
    fn query(&self, params: &[(&str, String)]) -> String {
        params
            .iter()
            .filter(|(key, _)| *key != "client_id")
            .map(|(key, value)| (*key, value.as_str()))
            .chain(std::iter::once(("client_id", self.client_id.as_str())))
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn get(&self, uri: &str) -> Result<String, CatalogError> {
        debug!("GET {uri}");
        let (code, body) = match self.agent.get(uri).call() {
            Ok(response) => (response.status(), response.into_string()?),
            Err(ureq::Error::Status(code, response)) => {
                (code, response.into_string().unwrap_or_default())
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(CatalogError::Transport(Box::new(transport)));
            }
        };
        debug!("{code} {uri}");
        accept_response(code, body, self.reporter)
    }

    fn descriptors(&self, body: &str) -> Result<Vec<TrackDescriptor>, CatalogError> {
        let mut descriptors = Vec::new();
        for raw in raw_tracks(body)? {
            let title = raw.title.clone();
            match raw.into_descriptor(&self.client_id) {
                Some(descriptor) => descriptors.push(descriptor),
                None => {
                    warn!("{title} is not streamable");
                    self.reporter
                        .warning(&format!("{title} is not streamable, skipping"));
                }
            }
        }
        Ok(descriptors)
    }
}

/// Applies [`classify_status`] to a finished request
fn accept_response(
    code: u16,
    body: String,
    reporter: &dyn Reporter,
) -> Result<String, CatalogError> {
    match classify_status(code)? {
        StatusClass::Ok => Ok(body),
        StatusClass::ServerProblem => {
            reporter.warning("There is a problem by SoundCloud. Please wait a while");
            if body.trim().is_empty() {
                Err(CatalogError::ServerProblem(code))
            } else {
                Ok(body)
            }
        }
    }
}
