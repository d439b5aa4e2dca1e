//! Configuration of the OIDC client request filter, which adds access tokens acquired by an OIDC
//! client to the requests of injected REST clients.

use crate::defaults::DEFAULT_OIDC_CLIENT_ID;
use serde::Deserialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Deserialize, Default, PartialEq, Clone)]
pub struct ClientFilterConfig {
    /// Registers the filter for all the injected REST clients. If disabled, the filter has to be
    /// registered on each REST client that needs it.
    #[serde(default)]
    pub(crate) register_filter: bool,
    /// Name of the configured OIDC client used by the filter. It can be overridden for individual
    /// REST clients, see [RestClientFilterRequest::client_name_override].
    #[serde(default)]
    pub(crate) client_name: Option<String>,
}

/// Describes how a REST client asks for the filter.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct RestClientFilterRequest {
    /// The REST client registers the filter explicitly.
    pub explicitly_registered: bool,
    /// OIDC client name set on this REST client only.
    pub client_name_override: Option<String>,
}

/// OIDC client that provides the tokens to a filtered REST client.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum OidcClientSelection {
    Default,
    Named(String),
}

impl OidcClientSelection {
    pub fn client_id(&self) -> &str {
        match self {
            Self::Default => DEFAULT_OIDC_CLIENT_ID,
            Self::Named(name) => name,
        }
    }
}

impl Display for OidcClientSelection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.client_id())
    }
}

impl ClientFilterConfig {
    pub fn register_filter(&self) -> bool {
        self.register_filter
    }

    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }

    /// Returns the OIDC client the filter uses for the REST client described in `request`, or
    /// `None` if the filter is not applied to it.
    pub fn filter_for(&self, request: &RestClientFilterRequest) -> Option<OidcClientSelection> {
        if !self.register_filter && !request.explicitly_registered {
            return None;
        }
        let selection = request
            .client_name_override
            .as_deref()
            .or(self.client_name())
            .map(|name| OidcClientSelection::Named(name.to_string()))
            .unwrap_or(OidcClientSelection::Default);
        Some(selection)
    }
}
