//! 逐级采集：每次请求先取令牌，再 GET 并按层级打标、过滤。

use crate::api::{SignifyApi, endpoints};
use crate::error::FetchError;
use crate::filter::CompiledFilter;
use domain::{Configuration, HierarchyLevel, LocationNode, SubscriptionCategory};
use signify_auth::TokenCache;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct HierarchyFetcher {
    api: Arc<dyn SignifyApi>,
    tokens: Arc<TokenCache>,
}

impl HierarchyFetcher {
    pub fn new(api: Arc<dyn SignifyApi>, tokens: Arc<TokenCache>) -> Self {
        Self { api, tokens }
    }

    pub async fn get_sites(&self, config: &Configuration) -> Result<Vec<LocationNode>, FetchError> {
        self.fetch_level(config, &endpoints::sites(), HierarchyLevel::Site)
            .await
    }

    pub async fn get_buildings(
        &self,
        config: &Configuration,
        site: &LocationNode,
    ) -> Result<Vec<LocationNode>, FetchError> {
        self.fetch_level(config, &endpoints::buildings(&site.uuid), HierarchyLevel::Building)
            .await
    }

    pub async fn get_storeys(
        &self,
        config: &Configuration,
        building: &LocationNode,
    ) -> Result<Vec<LocationNode>, FetchError> {
        self.fetch_level(config, &endpoints::storeys(&building.uuid), HierarchyLevel::Storey)
            .await
    }

    pub async fn get_sensor_spaces(
        &self,
        config: &Configuration,
        storey: &LocationNode,
    ) -> Result<Vec<LocationNode>, FetchError> {
        self.fetch_level(
            config,
            &endpoints::sensor_spaces(&storey.uuid),
            HierarchyLevel::Space,
        )
        .await
    }

    /// 深度优先遍历四级，返回完整站点树；任一请求失败即返回错误，不产出半棵树。
    pub async fn fetch_tree(&self, config: &Configuration) -> Result<Vec<LocationNode>, FetchError> {
        let mut sites = self.get_sites(config).await?;
        for site in sites.iter_mut() {
            let mut buildings = self.get_buildings(config, site).await?;
            for building in buildings.iter_mut() {
                let mut storeys = self.get_storeys(config, building).await?;
                for storey in storeys.iter_mut() {
                    storey.children = self.get_sensor_spaces(config, storey).await?;
                }
                building.children = storeys;
            }
            site.children = buildings;
        }
        Ok(sites)
    }

    /// 取令牌后查询楼宇 × 类别的推送地址。
    pub async fn subscription_url(
        &self,
        config: &Configuration,
        building_uuid: &str,
        category: SubscriptionCategory,
    ) -> Result<String, FetchError> {
        let token = self.tokens.get_token(config).await?;
        let result = self
            .api
            .subscription_url(config, &token.token, building_uuid, category)
            .await;
        self.reset_on_unauthorized(config, result)
    }

    async fn fetch_level(
        &self,
        config: &Configuration,
        endpoint: &str,
        level: HierarchyLevel,
    ) -> Result<Vec<LocationNode>, FetchError> {
        let filter = CompiledFilter::compile(&config.asset_filter)?;
        let token = self.tokens.get_token(config).await?;
        let result = self
            .api
            .fetch_locations(config, &token.token, endpoint)
            .await;
        let records = self.reset_on_unauthorized(config, result)?;
        let total = records.len();
        let nodes: Vec<LocationNode> = records
            .into_iter()
            .map(|record| LocationNode::from_record(record, level))
            .filter(|node| filter.matches(node))
            .collect();
        debug!(
            target: "signify.hierarchy",
            config_id = config.id,
            level = %level,
            endpoint,
            total,
            kept = nodes.len(),
            "locations_fetched"
        );
        Ok(nodes)
    }

    fn reset_on_unauthorized<T>(
        &self,
        config: &Configuration,
        result: Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        if let Err(err) = &result {
            if err.is_unauthorized() {
                warn!(
                    target: "signify.hierarchy",
                    config_id = config.id,
                    error = %err,
                    "unauthorized_token_reset"
                );
                self.tokens.reset_token(config);
            }
        }
        result
    }
}
