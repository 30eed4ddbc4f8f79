use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ClientError;

/// Provider deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// ticktick.com
    #[default]
    International,
    /// dida365.com
    China,
}

impl Region {
    /// Base URL of the open API.
    #[must_use]
    pub const fn api_base_url(self) -> &'static str {
        match self {
            Self::International => "https://api.ticktick.com/open/v1",
            Self::China => "https://api.dida365.com/open/v1",
        }
    }

    /// Base URL of the OAuth endpoints.
    #[must_use]
    pub const fn oauth_base_url(self) -> &'static str {
        match self {
            Self::International => "https://ticktick.com/oauth",
            Self::China => "https://dida365.com/oauth",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::International => "international",
            Self::China => "china",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "international" | "ticktick" => Ok(Self::International),
            "china" | "dida365" | "dida" => Ok(Self::China),
            other => Err(format!(
                "unknown region: {other} (expected international or china)"
            )),
        }
    }
}

/// Resolved API and OAuth base URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    api_base: Url,
    oauth_base: Url,
}

impl Endpoints {
    /// Endpoints from explicit base URLs.
    ///
    /// # Errors
    /// Returns an error if either URL does not parse.
    pub fn new(api_base: &str, oauth_base: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            api_base: Url::parse(api_base)?,
            oauth_base: Url::parse(oauth_base)?,
        })
    }

    /// Default endpoints of a region.
    ///
    /// # Errors
    /// Only fails if the built-in URLs are malformed.
    pub fn for_region(region: Region) -> Result<Self, url::ParseError> {
        Self::new(region.api_base_url(), region.oauth_base_url())
    }

    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    #[must_use]
    pub const fn oauth_base(&self) -> &Url {
        &self.oauth_base
    }

    /// API URL with percent-encoded path segments appended.
    ///
    /// # Errors
    /// Fails when the base cannot carry a path.
    pub fn api(&self, segments: &[&str]) -> Result<Url, ClientError> {
        join(&self.api_base, segments)
    }

    /// OAuth URL with path segments appended.
    ///
    /// # Errors
    /// Fails when the base cannot carry a path.
    pub fn oauth(&self, segments: &[&str]) -> Result<Url, ClientError> {
        join(&self.oauth_base, segments)
    }
}

fn join(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ClientError::Unexpected {
            status: None,
            message: format!("cannot append a path to {base}"),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
