//! Reusable field validators.

/// Trait for field-level validators.
pub trait FieldValidator<T: ?Sized> {
    /// Validate a field value, returning a human readable reason on failure.
    ///
    /// # Errors
    /// Returns the rejection reason when `value` does not satisfy the validator.
    fn validate(&self, value: &T) -> Result<(), String>;
}

/// URL validator with scheme and host constraints.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    require_https: bool,
    require_host: bool,
    reject_query: bool,
    allowed_schemes: Vec<String>,
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlValidator {
    /// Accepts `http` and `https` URLs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            require_https: false,
            require_host: true,
            reject_query: false,
            allowed_schemes: vec!["http".to_string(), "https".to_string()],
        }
    }

    /// Require HTTPS
    #[must_use]
    pub const fn require_https(mut self) -> Self {
        self.require_https = true;
        self
    }

    /// Reject URLs carrying a query string or fragment.
    #[must_use]
    pub const fn reject_query(mut self) -> Self {
        self.reject_query = true;
        self
    }

    /// Set allowed schemes
    #[must_use]
    pub fn allowed_schemes(mut self, schemes: Vec<String>) -> Self {
        self.allowed_schemes = schemes;
        self
    }
}

impl FieldValidator<str> for UrlValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let parsed = url::Url::parse(value).map_err(|_| "Invalid URL format".to_string())?;
        let scheme = parsed.scheme();

        if self.require_https && scheme != "https" {
            return Err("URL must use HTTPS".to_string());
        }

        if !self.allowed_schemes.iter().any(|s| s == scheme) {
            return Err(format!("URL scheme '{scheme}' is not allowed"));
        }

        if self.require_host && parsed.host_str().map_or(true, str::is_empty) {
            return Err("URL must include a host".to_string());
        }

        if self.reject_query && (parsed.query().is_some() || parsed.fragment().is_some()) {
            return Err("URL must not contain a query string or fragment".to_string());
        }

        Ok(())
    }
}

impl FieldValidator<String> for UrlValidator {
    fn validate(&self, value: &String) -> Result<(), String> {
        FieldValidator::<str>::validate(self, value.as_str())
    }
}
