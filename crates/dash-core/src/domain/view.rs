//! 캐시 엔트리 값.
//!
//! 캐시에는 트리맵, 랭킹 리스트, 지수 스냅샷처럼 서로 다른 형태의 뷰가
//! 함께 게시됩니다. 다운캐스트 대신 variant 매칭으로 안전하게 꺼낼 수
//! 있도록 tagged union으로 모델링합니다. 직렬화는 untagged이므로
//! dynamic-data 응답에서 원래 JSON 모양 그대로 나갑니다.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::rank::RankedEntry;
use super::treemap::TreemapView;

/// 캐시에 게시되는 하나의 뷰.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CachedView {
    /// 트리맵 계층 (treemap_* 키)
    Treemap(TreemapView),
    /// 랭킹 리스트 (rank_* 키)
    Ranking(Vec<RankedEntry>),
    /// 외부 지수 피드의 원본 키-값 레코드 (index_* 키)
    Index(HashMap<String, String>),
}

impl CachedView {
    /// 트리맵 뷰 참조를 반환합니다.
    pub fn as_treemap(&self) -> Option<&TreemapView> {
        match self {
            Self::Treemap(view) => Some(view),
            _ => None,
        }
    }

    /// 랭킹 리스트 참조를 반환합니다.
    pub fn as_ranking(&self) -> Option<&[RankedEntry]> {
        match self {
            Self::Ranking(entries) => Some(entries),
            _ => None,
        }
    }

    /// 지수 레코드 참조를 반환합니다.
    pub fn as_index(&self) -> Option<&HashMap<String, String>> {
        match self {
            Self::Index(map) => Some(map),
            _ => None,
        }
    }
}
