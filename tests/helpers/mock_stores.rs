#![allow(dead_code)]
// ==========================================
// 集成测试 - 内存版外部协作方 Mock
// ==========================================
// 说明: Mock 内部以 Arc<Mutex> 共享状态，Clone 后传入
//       被测对象，测试侧保留原件用于断言
// ==========================================

use async_trait::async_trait;
use discount_rule_sync::domain::rule::{RuleHandle, RuleSpec};
use discount_rule_sync::repository::{
    PriceLookup, ProductCatalog, RuleStore, StoreError, StoreResult, SyncStateRepository,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// MockRuleStore - 内存规则存储
// ==========================================
#[derive(Default)]
struct RuleStoreInner {
    rules: HashMap<i64, RuleSpec>,
    next_id: i64,
    fail_create: bool,
    fail_update: bool,
    fail_delete_ids: HashSet<i64>,
}

#[derive(Clone, Default)]
pub struct MockRuleStore {
    inner: Arc<Mutex<RuleStoreInner>>,
}

impl MockRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一条已存在的规则，返回其 ID
    pub fn seed(&self, spec: RuleSpec) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rules.insert(id, spec);
        id
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.inner.lock().unwrap().fail_create = fail;
    }

    pub fn set_fail_delete(&self, rule_id: i64) {
        self.inner.lock().unwrap().fail_delete_ids.insert(rule_id);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().rules.len()
    }

    pub fn names(&self) -> HashSet<String> {
        self.inner
            .lock()
            .unwrap()
            .rules
            .values()
            .map(|spec| spec.name.clone())
            .collect()
    }

    pub fn rule_by_name(&self, name: &str) -> Option<(i64, RuleSpec)> {
        self.inner
            .lock()
            .unwrap()
            .rules
            .iter()
            .find(|(_, spec)| spec.name == name)
            .map(|(id, spec)| (*id, spec.clone()))
    }
}

#[async_trait]
impl RuleStore for MockRuleStore {
    async fn list_by_name_prefix(
        &self,
        _site_id: &str,
        prefix: &str,
    ) -> StoreResult<Vec<RuleHandle>> {
        let inner = self.inner.lock().unwrap();
        let mut handles: Vec<RuleHandle> = inner
            .rules
            .iter()
            .filter(|(_, spec)| spec.name.starts_with(prefix))
            .map(|(id, spec)| RuleHandle {
                id: *id,
                name: spec.name.clone(),
            })
            .collect();
        handles.sort_by_key(|handle| handle.id);
        Ok(handles)
    }

    async fn create(&self, _site_id: &str, spec: &RuleSpec) -> StoreResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_create {
            return Err(StoreError::RuleWrite {
                name: spec.name.clone(),
                message: "模拟写入失败".to_string(),
            });
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rules.insert(id, spec.clone());
        Ok(id)
    }

    async fn update(&self, rule_id: i64, spec: &RuleSpec) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_update || !inner.rules.contains_key(&rule_id) {
            return Err(StoreError::RuleWrite {
                name: spec.name.clone(),
                message: "模拟更新失败".to_string(),
            });
        }
        inner.rules.insert(rule_id, spec.clone());
        Ok(())
    }

    async fn delete(&self, rule_id: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_delete_ids.contains(&rule_id) {
            return Err(StoreError::RuleDelete {
                id: rule_id,
                message: "模拟删除失败".to_string(),
            });
        }
        if inner.rules.remove(&rule_id).is_none() {
            return Err(StoreError::RuleDelete {
                id: rule_id,
                message: "规则不存在".to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// MockProductCatalog - 内存商品目录
// ==========================================
#[derive(Default)]
struct CatalogInner {
    sku_to_id: HashMap<String, i64>,
    all_ids: Vec<i64>,
    group_keys: HashMap<i64, Option<String>>,
    cache_invalidations: usize,
    group_missing: bool,
}

#[derive(Clone, Default)]
pub struct MockProductCatalog {
    inner: Arc<Mutex<CatalogInner>>,
}

impl MockProductCatalog {
    /// 构建目录；商品全集默认等于映射的 ID 集合
    pub fn new(products: &[(&str, i64)]) -> Self {
        let catalog = Self::default();
        {
            let mut inner = catalog.inner.lock().unwrap();
            for (sku, id) in products {
                inner.sku_to_id.insert(sku.to_string(), *id);
                inner.all_ids.push(*id);
            }
        }
        catalog
    }

    /// 追加一个不在价格表中的商品（仅存在于全集）
    pub fn add_untracked_product(&self, product_id: i64) {
        self.inner.lock().unwrap().all_ids.push(product_id);
    }

    /// 预置商品的分组键（模拟上一轮运行的残留）
    pub fn preset_group_key(&self, product_id: i64, key: &str) {
        self.inner
            .lock()
            .unwrap()
            .group_keys
            .insert(product_id, Some(key.to_string()));
    }

    /// 模拟商品分组缺失（致命错误）
    pub fn set_group_missing(&self, missing: bool) {
        self.inner.lock().unwrap().group_missing = missing;
    }

    pub fn group_key(&self, product_id: i64) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .group_keys
            .get(&product_id)
            .cloned()
            .flatten()
    }

    pub fn cache_invalidations(&self) -> usize {
        self.inner.lock().unwrap().cache_invalidations
    }
}

#[async_trait]
impl ProductCatalog for MockProductCatalog {
    async fn resolve_ids(&self, skus: &[String]) -> StoreResult<HashMap<String, i64>> {
        let inner = self.inner.lock().unwrap();
        if inner.group_missing {
            return Err(StoreError::ProductGroupMissing(
                "商品分组未配置".to_string(),
            ));
        }
        Ok(skus
            .iter()
            .filter_map(|sku| inner.sku_to_id.get(sku).map(|id| (sku.clone(), *id)))
            .collect())
    }

    async fn list_product_ids(&self) -> StoreResult<Vec<i64>> {
        Ok(self.inner.lock().unwrap().all_ids.clone())
    }

    async fn set_group_key(&self, product_id: i64, key: Option<&str>) -> StoreResult<()> {
        self.inner
            .lock()
            .unwrap()
            .group_keys
            .insert(product_id, key.map(str::to_string));
        Ok(())
    }

    async fn invalidate_cache(&self) -> StoreResult<()> {
        self.inner.lock().unwrap().cache_invalidations += 1;
        Ok(())
    }
}

// ==========================================
// MockPriceLookup - 内存基础价查询
// ==========================================
#[derive(Clone, Default)]
pub struct MockPriceLookup {
    prices: Arc<Mutex<HashMap<i64, Decimal>>>,
}

impl MockPriceLookup {
    pub fn new(prices: &[(i64, &str)]) -> Self {
        let lookup = Self::default();
        {
            let mut map = lookup.prices.lock().unwrap();
            for (id, price) in prices {
                map.insert(*id, Decimal::from_str(price).unwrap());
            }
        }
        lookup
    }
}

#[async_trait]
impl PriceLookup for MockPriceLookup {
    async fn batch_get_base_prices(
        &self,
        product_ids: &[i64],
    ) -> StoreResult<HashMap<i64, Decimal>> {
        let prices = self.prices.lock().unwrap();
        Ok(product_ids
            .iter()
            .filter_map(|id| prices.get(id).map(|price| (*id, *price)))
            .collect())
    }
}

// ==========================================
// MemorySyncState - 内存同步状态
// ==========================================
#[derive(Clone, Default)]
pub struct MemorySyncState {
    stamps: Arc<Mutex<HashMap<String, i64>>>,
}

impl MemorySyncState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SyncStateRepository for MemorySyncState {
    fn last_source_stamp(&self, exchange_key: &str) -> StoreResult<Option<i64>> {
        Ok(self.stamps.lock().unwrap().get(exchange_key).copied())
    }

    fn set_last_source_stamp(&self, exchange_key: &str, stamp: i64) -> StoreResult<()> {
        self.stamps
            .lock()
            .unwrap()
            .insert(exchange_key.to_string(), stamp);
        Ok(())
    }
}
