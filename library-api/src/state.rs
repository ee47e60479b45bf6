//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    config::Config,
    error::Result,
    middleware::{HttpCacheHeaders, RateLimit, ResponseCache},
    repository::LibraryRepository,
    sorting::PropertyMappingService,
};

/// Application state, generic over the repository implementation
pub struct AppState<R> {
    config: Arc<Config>,
    repository: Arc<R>,
    property_mapping: Arc<PropertyMappingService>,
    rate_limit: RateLimit,
    response_cache: ResponseCache,
    cache_headers: HttpCacheHeaders,
}

// Manual impl: `R` itself need not be `Clone`
impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            repository: Arc::clone(&self.repository),
            property_mapping: Arc::clone(&self.property_mapping),
            rate_limit: self.rate_limit.clone(),
            response_cache: self.response_cache.clone(),
            cache_headers: self.cache_headers.clone(),
        }
    }
}

impl<R: LibraryRepository> AppState<R> {
    /// Build the state, deriving middleware state from the configuration
    pub fn new(config: Config, repository: R) -> Result<Self> {
        Self::with_repository(config, Arc::new(repository))
    }

    /// Build the state around a repository the caller keeps a handle to
    pub fn with_repository(config: Config, repository: Arc<R>) -> Result<Self> {
        let rate_limit = RateLimit::new(&config.rate_limit)?;
        let response_cache = ResponseCache::new(&config.cache);
        let cache_headers = HttpCacheHeaders::new(&config.cache)?;

        Ok(Self {
            config: Arc::new(config),
            repository,
            property_mapping: Arc::new(PropertyMappingService::new()),
            rate_limit,
            response_cache,
            cache_headers,
        })
    }
}

impl<R> AppState<R> {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn property_mapping(&self) -> &PropertyMappingService {
        &self.property_mapping
    }

    pub fn rate_limit(&self) -> &RateLimit {
        &self.rate_limit
    }

    pub fn response_cache(&self) -> &ResponseCache {
        &self.response_cache
    }

    pub fn cache_headers(&self) -> &HttpCacheHeaders {
        &self.cache_headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryLibraryRepository;

    #[test]
    fn test_state_shares_repository() {
        let repository = Arc::new(InMemoryLibraryRepository::new());
        let state = AppState::with_repository(Config::default(), repository.clone()).unwrap();
        let cloned = state.clone();
        assert!(std::ptr::eq(cloned.repository(), repository.as_ref()));
        assert_eq!(cloned.config().service.name, "library-api");
    }

    #[test]
    fn test_invalid_rate_limit_rule_fails() {
        let mut config = Config::default();
        config.rate_limit.rules[0].requests = 0;
        assert!(AppState::new(config, InMemoryLibraryRepository::new()).is_err());
    }
}
