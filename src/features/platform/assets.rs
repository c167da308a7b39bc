use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::error::{AppError, Result};

/// Turns stored asset paths into publicly reachable URLs.
///
/// A soft dependency: avatar/thumbnail resolution is cosmetic and callers
/// must be able to degrade when the asset store is unavailable.
#[async_trait]
pub trait AssetUrlResolver: Send + Sync {
    /// Resolve many paths at once. Absolute http(s) URLs pass through
    /// unchanged; relative paths are joined onto the public asset base.
    async fn resolve_many(&self, paths: &[String]) -> Result<HashMap<String, String>>;
}

/// Resolver that builds public URLs from the configured asset endpoint
pub struct PublicAssetResolver {
    base_url: Option<String>,
    public_prefix: String,
}

impl PublicAssetResolver {
    pub fn new(base_url: Option<String>, public_prefix: String) -> Self {
        Self {
            base_url,
            public_prefix,
        }
    }

    fn is_absolute(path: &str) -> bool {
        path.starts_with("http://") || path.starts_with("https://")
    }
}

#[async_trait]
impl AssetUrlResolver for PublicAssetResolver {
    async fn resolve_many(&self, paths: &[String]) -> Result<HashMap<String, String>> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            AppError::Internal("Asset store endpoint is not configured".to_string())
        })?;

        let mut resolved = HashMap::with_capacity(paths.len());
        for path in paths {
            let url = if Self::is_absolute(path) {
                path.clone()
            } else {
                format!(
                    "{}/{}/{}",
                    base.trim_end_matches('/'),
                    self.public_prefix,
                    path.trim_start_matches('/')
                )
            };
            resolved.insert(path.clone(), url);
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absolute_urls_pass_through() {
        let resolver =
            PublicAssetResolver::new(Some("https://assets.example.com".to_string()), "public".into());

        let paths = vec!["https://cdn.other.com/a.png".to_string()];
        let resolved = resolver.resolve_many(&paths).await.unwrap();

        assert_eq!(resolved[&paths[0]], "https://cdn.other.com/a.png");
    }

    #[tokio::test]
    async fn relative_paths_join_base_and_prefix() {
        let resolver =
            PublicAssetResolver::new(Some("https://assets.example.com/".to_string()), "public".into());

        let paths = vec!["/avatars/u1.png".to_string()];
        let resolved = resolver.resolve_many(&paths).await.unwrap();

        assert_eq!(
            resolved[&paths[0]],
            "https://assets.example.com/public/avatars/u1.png"
        );
    }

    #[tokio::test]
    async fn unconfigured_resolver_errors() {
        let resolver = PublicAssetResolver::new(None, "public".into());
        assert!(resolver.resolve_many(&["x.png".to_string()]).await.is_err());
    }
}
