//! The `refresh_token` cookie

use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    HttpRequest,
};

use sigma_shared::CookieConfig;

/// Builds, reads and clears the cookie carrying the refresh token
#[derive(Debug, Clone)]
pub struct RefreshCookie {
    config: CookieConfig,
    /// Lifetime of the refresh token in seconds
    max_age: i64,
}

impl RefreshCookie {
    pub fn new(config: CookieConfig, max_age: i64) -> Self {
        Self { config, max_age }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Cookie holding `token`
    pub fn build(&self, token: impl Into<String>) -> Cookie<'static> {
        Cookie::build(self.config.name.clone(), token.into())
            .path(self.config.path.clone())
            .http_only(self.config.http_only)
            .secure(self.config.secure)
            .same_site(same_site(&self.config.same_site))
            .max_age(Duration::seconds(self.max_age))
            .finish()
    }

    /// Cookie instructing the browser to drop the refresh token
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = self.build("");
        cookie.make_removal();
        cookie
    }

    /// Refresh token sent by the client, if any
    pub fn read(&self, req: &HttpRequest) -> Option<String> {
        req.cookie(&self.config.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

fn same_site(value: &str) -> SameSite {
    match value.to_ascii_lowercase().as_str() {
        "lax" => SameSite::Lax,
        "none" => SameSite::None,
        _ => SameSite::Strict,
    }
}
