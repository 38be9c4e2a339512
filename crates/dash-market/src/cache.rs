//! 시장 뷰 캐시.
//!
//! 키 문자열 → 게시된 뷰(`Arc<CachedView>`)의 동시성 맵입니다.
//! 쓰기는 갱신 태스크 하나뿐이고 읽기는 요청마다 일어나므로
//! `tokio::sync::RwLock`을 씁니다. 읽기 가드는 Arc 클론만 하고 바로
//! 놓습니다.
//!
//! `publish`는 한 세대 전체를 하나의 쓰기 가드 아래에서 반영하므로
//! 읽는 쪽이 세대가 섞인 조합을 볼 수 없습니다. 새 세대에 없는 키는
//! 이전 값을 유지합니다 (지수 피드가 실패한 사이클에서도 마지막 지수가
//! 계속 서빙됨).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use dash_core::CachedView;

/// 읽기 위주 시장 뷰 캐시.
#[derive(Default)]
pub struct MarketViewCache {
    entries: RwLock<HashMap<String, Arc<CachedView>>>,
}

impl MarketViewCache {
    /// 빈 캐시를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 키로 뷰를 조회합니다.
    pub async fn get(&self, key: &str) -> Option<Arc<CachedView>> {
        self.entries.read().await.get(key).cloned()
    }

    /// 여러 키를 한 번의 읽기 가드로 조회합니다. 없는 키는 결과에서
    /// 빠집니다.
    pub async fn get_many(&self, keys: &[String]) -> HashMap<String, Arc<CachedView>> {
        let guard = self.entries.read().await;
        keys.iter()
            .filter_map(|k| guard.get(k).map(|v| (k.clone(), Arc::clone(v))))
            .collect()
    }

    /// 새 세대의 뷰들을 일괄 게시합니다.
    pub async fn publish(&self, views: Vec<(String, CachedView)>) {
        let count = views.len();
        let mut guard = self.entries.write().await;
        guard.extend(views.into_iter().map(|(k, v)| (k, Arc::new(v))));
        debug!(published = count, total = guard.len(), "캐시 세대 게시");
    }

    /// 현재 게시된 엔트리 수.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// 아직 아무 것도 게시되지 않았는지 확인합니다.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::TreemapView;

    #[tokio::test]
    async fn test_publish_then_get() {
        let cache = MarketViewCache::new();
        assert!(cache.is_empty().await);

        cache
            .publish(vec![(
                "treemap_KOSPI".to_string(),
                CachedView::Treemap(TreemapView::empty("KOSPI")),
            )])
            .await;

        assert_eq!(cache.len().await, 1);
        let view = cache.get("treemap_KOSPI").await.unwrap();
        assert_eq!(view.as_treemap().unwrap().name, "KOSPI");
        assert!(cache.get("treemap_KONEX").await.is_none());
    }

    #[tokio::test]
    async fn test_get_many_drops_absent_keys() {
        let cache = MarketViewCache::new();
        cache
            .publish(vec![
                (
                    "treemap_KOSPI".to_string(),
                    CachedView::Treemap(TreemapView::empty("KOSPI")),
                ),
                ("rank_ALL_VOLUME_DESC".to_string(), CachedView::Ranking(vec![])),
            ])
            .await;

        let keys = vec![
            "treemap_KOSPI".to_string(),
            "없는_키".to_string(),
            "rank_ALL_VOLUME_DESC".to_string(),
        ];
        let bundle = cache.get_many(&keys).await;
        assert_eq!(bundle.len(), 2);
        assert!(!bundle.contains_key("없는_키"));
    }

    #[tokio::test]
    async fn test_publish_keeps_keys_missing_from_new_generation() {
        let cache = MarketViewCache::new();
        cache
            .publish(vec![
                (
                    "index_KOSPI".to_string(),
                    CachedView::Index(HashMap::from([(
                        "CLSPRC_IDX".to_string(),
                        "2600".to_string(),
                    )])),
                ),
                (
                    "treemap_KOSPI".to_string(),
                    CachedView::Treemap(TreemapView::empty("KOSPI")),
                ),
            ])
            .await;

        // 지수 피드만 실패한 다음 세대
        cache
            .publish(vec![(
                "treemap_KOSPI".to_string(),
                CachedView::Treemap(TreemapView::empty("KOSPI")),
            )])
            .await;

        // 이전 지수 값이 유지됨
        let index = cache.get("index_KOSPI").await.unwrap();
        assert_eq!(
            index.as_index().unwrap().get("CLSPRC_IDX").map(String::as_str),
            Some("2600")
        );
    }
}
