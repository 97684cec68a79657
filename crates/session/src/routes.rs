//! Route constants used by the guard, interceptor and login flow

/// Client-side routes the session subsystem navigates to or gates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    /// Public landing page
    pub landing: String,
    /// Where session expiry and logout send the user
    pub home: String,
    /// Provider profile page
    pub provider_profile: String,
    /// Client service search page
    pub client_search: String,
    /// Review submission page (clients only)
    pub review: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            landing: "/".to_string(),
            home: "/".to_string(),
            provider_profile: "/profile".to_string(),
            client_search: "/search-services".to_string(),
            review: "/review".to_string(),
        }
    }
}

impl Routes {
    pub fn is_landing(&self, url: &str) -> bool {
        path_of(url) == path_of(&self.landing)
    }

    /// Review route itself or any sub-path of it
    pub fn is_review(&self, url: &str) -> bool {
        let path = path_of(url);
        let review = path_of(&self.review);
        path == review
            || path
                .strip_prefix(review)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Strip the query string and fragment; an empty path means `/`.
pub(crate) fn path_of(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    if path.is_empty() {
        "/"
    } else {
        path
    }
}
