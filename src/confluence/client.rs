//! Blocking Confluence REST v1 client.

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ConfluenceSettings;
use crate::error::{CmeError, Result};
use crate::source::{Document, FetchError, PageDescriptor, PageSource};
use crate::state::{ScopeKind, UNKNOWN_VERSION};

use super::types::{Content, ContentVersion, Paged, Space};

/// Default page size for paged endpoints.
pub const PAGE_SIZE: usize = 100;

const FULL_EXPAND: &str = "body.view,version,space,ancestors,metadata.labels";

/// Credentials sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Anonymous,
    Basic { username: String, token: String },
    Bearer(String),
}

impl Auth {
    /// Basic auth when both user and token are set, else bearer, else none.
    pub fn from_settings(settings: &ConfluenceSettings) -> Self {
        match (
            &settings.username,
            &settings.api_token,
            &settings.personal_access_token,
        ) {
            (Some(username), Some(token), _) => Auth::Basic {
                username: username.clone(),
                token: token.clone(),
            },
            (_, _, Some(pat)) => Auth::Bearer(pat.clone()),
            _ => Auth::Anonymous,
        }
    }
}

/// Confluence REST client.
pub struct ConfluenceClient {
    http: Client,
    base_url: String,
    auth: Auth,
    page_size: usize,
}

impl ConfluenceClient {
    /// Create a client from settings.
    pub fn from_settings(settings: &ConfluenceSettings) -> Result<Self> {
        let url = settings
            .url
            .as_deref()
            .ok_or_else(|| CmeError::ConfigValidationError {
                message: "confluence.url is required".to_string(),
            })?;
        Self::new(
            url,
            Auth::from_settings(settings),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Create a client for a base URL.
    pub fn new(base_url: &str, auth: Auth, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent("cme")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            page_size: PAGE_SIZE,
        })
    }

    /// Override the page size used for paged endpoints.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Anonymous => request,
            Auth::Basic { username, token } => request.basic_auth(username, Some(token)),
            Auth::Bearer(token) => request.bearer_auth(token),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/rest/api/{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self.authorize(self.http.get(&url)).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(CmeError::Api {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.json()?)
    }

    /// Look up a page's current version.
    ///
    /// `None` when the page is gone or not visible. Other failures yield
    /// [`UNKNOWN_VERSION`] so the page is re-exported rather than dropped.
    pub fn page_version(&self, page_id: &str) -> Option<u64> {
        match self.get_json::<ContentVersion>(&format!("content/{}?expand=version", page_id)) {
            Ok(content) => Some(content.number()),
            Err(e) if is_unreachable(&e) => {
                tracing::info!("Page {} not accessible ({}), treating as removed", page_id, e);
                None
            }
            Err(e) => {
                tracing::warn!(
                    "Could not fetch version for page {} ({}), marking for re-export",
                    page_id,
                    e
                );
                Some(UNKNOWN_VERSION)
            }
        }
    }

    /// List every descendant page of `page_id` with its version.
    pub fn descendants(&self, page_id: &str) -> Result<Vec<PageDescriptor>> {
        let mut pages = Vec::new();
        let mut start = 0;

        loop {
            let batch: Paged<ContentVersion> = self.get_json(&format!(
                "content/{}/descendant/page?expand=version&start={}&limit={}",
                page_id, start, self.page_size
            ))?;
            let fetched = batch.results.len();
            pages.extend(
                batch
                    .results
                    .into_iter()
                    .map(|c| PageDescriptor::new(c.id.clone(), c.number())),
            );

            if fetched < self.page_size {
                break;
            }
            start += fetched;
        }

        Ok(pages)
    }

    /// The homepage id of a space, if the space exists and has one.
    pub fn space_homepage(&self, space_key: &str) -> Result<Option<String>> {
        match self.get_json::<Space>(&format!("space/{}?expand=homepage", space_key)) {
            Ok(space) => Ok(space.homepage.map(|h| h.id)),
            Err(e) if is_unreachable(&e) => {
                tracing::warn!("Space {} not accessible ({})", space_key, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Every current global space.
    pub fn all_spaces(&self) -> Result<Vec<Space>> {
        let mut spaces = Vec::new();
        let mut start = 0;

        loop {
            let batch: Paged<Space> = self.get_json(&format!(
                "space?type=global&status=current&expand=homepage&start={}&limit={}",
                start, self.page_size
            ))?;
            let fetched = batch.results.len();
            spaces.extend(batch.results);

            if fetched < self.page_size {
                break;
            }
            start += fetched;
        }

        Ok(spaces)
    }

    /// A page and all of its descendants.
    fn page_tree(&self, root_id: &str) -> Result<Vec<PageDescriptor>> {
        let Some(version) = self.page_version(root_id) else {
            return Ok(Vec::new());
        };

        let mut pages = vec![PageDescriptor::new(root_id, version)];
        pages.extend(self.descendants(root_id)?);
        Ok(pages)
    }

    fn space_pages(&self, space_key: &str, homepage: Option<String>) -> Result<Vec<PageDescriptor>> {
        match homepage {
            Some(id) => self.page_tree(&id),
            None => {
                tracing::warn!("Space {} has no homepage; nothing to export", space_key);
                Ok(Vec::new())
            }
        }
    }
}

impl PageSource for ConfluenceClient {
    fn list_pages(&self, kind: ScopeKind, args: &[String]) -> Result<Vec<PageDescriptor>> {
        let mut pages = Vec::new();

        match kind {
            ScopeKind::Pages => {
                for page_id in args {
                    if let Some(version) = self.page_version(page_id) {
                        pages.push(PageDescriptor::new(page_id.clone(), version));
                    }
                }
            }
            ScopeKind::PagesWithDescendants => {
                for page_id in args {
                    pages.extend(self.page_tree(page_id)?);
                }
            }
            ScopeKind::Spaces => {
                for key in args {
                    let homepage = self.space_homepage(key)?;
                    pages.extend(self.space_pages(key, homepage)?);
                }
            }
            ScopeKind::AllSpaces => {
                for space in self.all_spaces()? {
                    pages.extend(self.space_pages(&space.key, space.homepage.map(|h| h.id))?);
                }
            }
        }

        Ok(pages)
    }

    fn fetch_content(&self, page_id: &str) -> std::result::Result<Document, FetchError> {
        let path = format!("content/{}?expand={}", page_id, FULL_EXPAND);
        match self.get_json::<Content>(&path) {
            Ok(content) => Ok(content.into()),
            Err(CmeError::Api { status: 403, .. }) => Err(FetchError::Forbidden),
            Err(CmeError::Api { status: 404, .. }) => Err(FetchError::NotFound),
            Err(e) => Err(FetchError::Failed(e.to_string())),
        }
    }
}

fn is_unreachable(error: &CmeError) -> bool {
    matches!(error, CmeError::Api { status: 403 | 404, .. })
}
