use crate::prelude::*;

/// Connection settings for one Mixpost installation
#[derive(Debug, Clone)]
pub struct Credentials {
    pub base_url: String,
    pub api_path: String,
    pub access_token: String,
}

impl Credentials {
    /// API path used by a stock Mixpost installation
    pub const DEFAULT_API_PATH: &'static str = "/api/mixpost";

    /// Validate and normalise the three credential values.
    ///
    /// An empty `api_path` falls back to [`Self::DEFAULT_API_PATH`]; a trailing `/` on
    /// `base_url` is dropped so endpoint joins never produce `//`.
    pub fn new(
        base_url: Option<String>,
        api_path: Option<String>,
        access_token: Option<String>,
    ) -> ApiResult<Self> {
        let base_url = base_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                Error::Config("base URL not set (use --base-url or MIXPOST_BASE_URL)".into())
            })?;

        let access_token = access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "access token not set (use --access-token or MIXPOST_ACCESS_TOKEN)".into(),
                )
            })?;

        let api_path = api_path
            .map(|p| p.trim().trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_API_PATH.to_string());

        let api_path = if api_path.starts_with('/') {
            api_path
        } else {
            format!("/{api_path}")
        };

        Ok(Self {
            base_url,
            api_path,
            access_token,
        })
    }

    /// Resolve credentials from the global CLI flags (which already fall back to env vars)
    pub fn from_global(global: &crate::Global) -> ApiResult<Self> {
        Self::new(
            global.base_url.clone(),
            global.api_path.clone(),
            global.access_token.clone(),
        )
    }

    /// Full URL of an endpoint such as `/posts/12`
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_path, endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(base: &str, path: Option<&str>) -> Credentials {
        Credentials::new(
            Some(base.to_string()),
            path.map(str::to_string),
            Some("secret".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_default_api_path() {
        let c = creds("https://social.example.com", None);
        assert_eq!(
            c.endpoint_url("/accounts"),
            "https://social.example.com/api/mixpost/accounts"
        );

        let c = creds("https://social.example.com", Some(""));
        assert_eq!(c.api_path, "/api/mixpost");
    }

    #[test]
    fn test_trailing_slashes_are_trimmed() {
        let c = creds("https://social.example.com/", Some("/custom/api/"));
        assert_eq!(
            c.endpoint_url("/posts/3"),
            "https://social.example.com/custom/api/posts/3"
        );
    }

    #[test]
    fn test_api_path_gets_leading_slash() {
        let c = creds("https://social.example.com", Some("api/v2"));
        assert_eq!(c.api_path, "/api/v2");
    }

    #[test]
    fn test_missing_values_are_config_errors() {
        let err = Credentials::new(None, None, Some("t".into())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Credentials::new(Some("https://x".into()), None, Some("  ".into())).unwrap_err();
        assert!(err.to_string().contains("access token not set"));
    }
}
