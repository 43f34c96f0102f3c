use url::Url;

use crate::error::HttpError;

/// URLs of the three calls made by an iteration, rooted at the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// # Errors
    ///
    /// Returns an error when `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|err| HttpError::InvalidUrl {
            url: base_url.to_owned(),
            source: err,
        })?;
        if base.cannot_be_a_base() {
            return Err(HttpError::InvalidUrl {
                url: base_url.to_owned(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }
        Ok(Self { base })
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    #[must_use]
    pub fn login(&self) -> String {
        self.with_segments(&["users", "login"]).into()
    }

    #[must_use]
    pub fn search(&self, query: &str) -> String {
        let mut url = self.with_segments(&["products", "search"]);
        url.query_pairs_mut().append_pair("q", query);
        url.into()
    }

    #[must_use]
    pub fn detail(&self, product_id: &str) -> String {
        self.with_segments(&["products", product_id]).into()
    }
}
