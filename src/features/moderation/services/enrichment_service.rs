use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::core::config::ModerationConfig;
use crate::core::error::{AppError, Result};
use crate::features::moderation::models::{ReportTarget, ReportTypeBreakdown};
use crate::features::moderation::store::ReportStore;
use crate::features::platform::{AssetUrlResolver, IdentityResolver, RecipeRef, UserRef};

/// One reporter shown in a group summary
#[derive(Debug, Clone)]
pub struct ReporterSummary {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// How a reported target is rendered in the moderation queue
#[derive(Debug, Clone)]
pub enum TargetDisplay {
    User {
        username: String,
        avatar_url: Option<String>,
    },
    Recipe {
        title: String,
        author_id: Uuid,
        thumbnail_url: Option<String>,
    },
}

/// Everything the queue needs about one target beyond the raw report rows
#[derive(Debug, Clone)]
pub struct TargetEnrichment {
    pub breakdown: ReportTypeBreakdown,
    pub top_reporters: Vec<ReporterSummary>,
    pub display: Option<TargetDisplay>,
}

/// Batched loader for the display data attached to grouped reports.
///
/// Breakdown, reporter, and display lookups run concurrently and any
/// failure among them fails the whole load. Avatar/thumbnail URL
/// conversion is cosmetic: when the asset store is unavailable the raw
/// stored paths are kept and a warning is logged.
pub struct EnrichmentService {
    store: Arc<dyn ReportStore>,
    resolver: Arc<dyn IdentityResolver>,
    assets: Arc<dyn AssetUrlResolver>,
    top_reporters: i64,
}

impl EnrichmentService {
    pub fn new(
        store: Arc<dyn ReportStore>,
        resolver: Arc<dyn IdentityResolver>,
        assets: Arc<dyn AssetUrlResolver>,
        config: &ModerationConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            assets,
            top_reporters: config.top_reporters,
        }
    }

    /// Load enrichment for a batch of targets in a fixed number of
    /// queries regardless of batch size.
    pub async fn enrich(
        &self,
        targets: &[ReportTarget],
    ) -> Result<HashMap<ReportTarget, TargetEnrichment>> {
        if targets.is_empty() {
            return Ok(HashMap::new());
        }

        let (mut user_ids, mut recipe_ids): (Vec<Uuid>, Vec<Uuid>) = (Vec::new(), Vec::new());
        for target in targets {
            match target {
                ReportTarget::User(id) => user_ids.push(*id),
                ReportTarget::Recipe(id) => recipe_ids.push(*id),
            }
        }

        let (breakdowns, reporter_ids, target_users, target_recipes) = tokio::try_join!(
            self.store.breakdowns_for_targets(targets),
            self.store.top_reporter_ids(targets, self.top_reporters),
            self.resolver.resolve_users(&user_ids),
            self.resolver.resolve_recipes(&recipe_ids),
        )
        .map_err(|e| {
            tracing::error!("Enrichment batch load failed: {:?}", e);
            AppError::Enrichment(e.to_string())
        })?;

        // Reporter identities depend on the id lookup, so they resolve
        // in a second round alongside nothing else.
        let distinct_reporters: Vec<Uuid> = reporter_ids
            .values()
            .flatten()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let reporter_refs = self
            .resolver
            .resolve_users(&distinct_reporters)
            .await
            .map_err(|e| {
                tracing::error!("Enrichment reporter lookup failed: {:?}", e);
                AppError::Enrichment(e.to_string())
            })?;

        let asset_urls = self
            .resolve_assets(&target_users, &target_recipes, &reporter_refs)
            .await;

        let mut enriched = HashMap::with_capacity(targets.len());
        for target in targets {
            let display = match target {
                ReportTarget::User(id) => target_users.get(id).map(|user| TargetDisplay::User {
                    username: user.username.clone(),
                    avatar_url: user
                        .avatar_path
                        .as_ref()
                        .map(|path| resolved_or_raw(&asset_urls, path)),
                }),
                ReportTarget::Recipe(id) => {
                    target_recipes.get(id).map(|recipe| TargetDisplay::Recipe {
                        title: recipe.title.clone(),
                        author_id: recipe.author_id,
                        thumbnail_url: recipe
                            .thumbnail_path
                            .as_ref()
                            .map(|path| resolved_or_raw(&asset_urls, path)),
                    })
                }
            };

            let top_reporters = reporter_ids
                .get(target)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| {
                            reporter_refs.get(id).map(|user| ReporterSummary {
                                user_id: *id,
                                username: user.username.clone(),
                                avatar_url: user
                                    .avatar_path
                                    .as_ref()
                                    .map(|path| resolved_or_raw(&asset_urls, path)),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();

            enriched.insert(
                *target,
                TargetEnrichment {
                    breakdown: breakdowns.get(target).cloned().unwrap_or_default(),
                    top_reporters,
                    display,
                },
            );
        }

        Ok(enriched)
    }

    /// Display names for a set of reporters, one batched lookup
    pub async fn reporter_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let refs = self.resolver.resolve_users(ids).await.map_err(|e| {
            tracing::error!("Reporter name lookup failed: {:?}", e);
            AppError::Enrichment(e.to_string())
        })?;
        Ok(refs.into_iter().map(|(id, user)| (id, user.username)).collect())
    }

    /// Convert every stored path in the batch to a public URL. Returns the
    /// empty map on failure so callers fall back to the raw paths.
    async fn resolve_assets(
        &self,
        users: &HashMap<Uuid, UserRef>,
        recipes: &HashMap<Uuid, RecipeRef>,
        reporters: &HashMap<Uuid, UserRef>,
    ) -> HashMap<String, String> {
        let paths: Vec<String> = users
            .values()
            .chain(reporters.values())
            .filter_map(|u| u.avatar_path.clone())
            .chain(recipes.values().filter_map(|r| r.thumbnail_path.clone()))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        if paths.is_empty() {
            return HashMap::new();
        }

        match self.assets.resolve_many(&paths).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!("Asset URL resolution degraded, keeping raw paths: {:?}", e);
                HashMap::new()
            }
        }
    }
}

fn resolved_or_raw(asset_urls: &HashMap<String, String>, path: &str) -> String {
    asset_urls
        .get(path)
        .cloned()
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::moderation::models::ReportType;
    use crate::shared::test_helpers::{
        FailingAssetResolver, InMemoryReportStore, StaticAssetResolver, StaticIdentityResolver,
    };

    fn service_with(
        store: Arc<InMemoryReportStore>,
        resolver: Arc<StaticIdentityResolver>,
        assets: Arc<dyn AssetUrlResolver>,
    ) -> EnrichmentService {
        EnrichmentService::new(store, resolver, assets, &ModerationConfig::default())
    }

    #[tokio::test]
    async fn empty_target_batch_short_circuits() {
        let store = Arc::new(InMemoryReportStore::new());
        let resolver = Arc::new(StaticIdentityResolver::default());
        let service = service_with(store, resolver, Arc::new(FailingAssetResolver));

        let enriched = service.enrich(&[]).await.unwrap();
        assert!(enriched.is_empty());
    }

    #[tokio::test]
    async fn asset_failure_keeps_raw_paths() {
        let store = Arc::new(InMemoryReportStore::new());
        let reported = Uuid::new_v4();
        let reporter = Uuid::new_v4();
        let target = ReportTarget::User(reported);
        store
            .seed_pending(reporter, target, ReportType::Spam)
            .await;

        let mut resolver = StaticIdentityResolver::default();
        resolver.add_user(
            reported,
            UserRef {
                username: "chef_kirby".to_string(),
                avatar_path: Some("avatars/kirby.png".to_string()),
            },
        );
        resolver.add_user(
            reporter,
            UserRef {
                username: "watcher".to_string(),
                avatar_path: None,
            },
        );

        let service = service_with(store, Arc::new(resolver), Arc::new(FailingAssetResolver));
        let enriched = service.enrich(&[target]).await.unwrap();

        let entry = &enriched[&target];
        match entry.display.as_ref().unwrap() {
            TargetDisplay::User { avatar_url, .. } => {
                assert_eq!(avatar_url.as_deref(), Some("avatars/kirby.png"));
            }
            other => panic!("expected user display, got {:?}", other),
        }
        assert_eq!(entry.breakdown.get(&ReportType::Spam), Some(&1));
        assert_eq!(entry.top_reporters.len(), 1);
        assert_eq!(entry.top_reporters[0].username, "watcher");
    }

    #[tokio::test]
    async fn resolves_avatar_urls_when_assets_available() {
        let store = Arc::new(InMemoryReportStore::new());
        let reported = Uuid::new_v4();
        let reporter = Uuid::new_v4();
        let target = ReportTarget::User(reported);
        store
            .seed_pending(reporter, target, ReportType::Harassment)
            .await;

        let mut resolver = StaticIdentityResolver::default();
        resolver.add_user(
            reported,
            UserRef {
                username: "chef_kirby".to_string(),
                avatar_path: Some("avatars/kirby.png".to_string()),
            },
        );
        resolver.add_user(
            reporter,
            UserRef {
                username: "watcher".to_string(),
                avatar_path: None,
            },
        );

        let assets = StaticAssetResolver::new("https://assets.test/public");
        let service = service_with(store, Arc::new(resolver), Arc::new(assets));
        let enriched = service.enrich(&[target]).await.unwrap();

        match enriched[&target].display.as_ref().unwrap() {
            TargetDisplay::User { avatar_url, .. } => {
                assert_eq!(
                    avatar_url.as_deref(),
                    Some("https://assets.test/public/avatars/kirby.png")
                );
            }
            other => panic!("expected user display, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn vanished_target_yields_no_display() {
        let store = Arc::new(InMemoryReportStore::new());
        let target = ReportTarget::Recipe(Uuid::new_v4());
        store
            .seed_pending(Uuid::new_v4(), target, ReportType::Copyright)
            .await;

        let resolver = StaticIdentityResolver::default();
        let service = service_with(store, Arc::new(resolver), Arc::new(FailingAssetResolver));
        let enriched = service.enrich(&[target]).await.unwrap();

        assert!(enriched[&target].display.is_none());
        assert_eq!(enriched[&target].breakdown.get(&ReportType::Copyright), Some(&1));
    }
}
