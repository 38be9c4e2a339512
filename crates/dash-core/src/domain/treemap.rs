//! 트리맵 계층 구조.
//!
//! D3.js 트리맵 차트가 소비하는 3단 계층(시장 → 섹터 → 종목)입니다.
//! 직렬화 필드명은 프론트엔드 계약이므로 변경하지 않습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 트리맵 루트 노드. 하나의 시장(예: KOSPI) 전체에 해당합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TreemapView {
    /// 루트 노드 이름 (예: "KOSPI", "통합 시장")
    pub name: String,
    /// 시장에 속한 섹터 노드 목록
    pub children: Vec<TreemapSector>,
}

/// 트리맵 중간 노드, 즉 섹터(업종).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TreemapSector {
    /// 섹터명
    pub name: String,
    /// 섹터에 속한 종목 노드 목록
    pub children: Vec<TreemapNode>,
}

/// 트리맵 리프 노드, 즉 개별 종목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TreemapNode {
    /// 종목 코드
    pub symbol: String,
    /// 종목명
    pub name: String,
    /// 사각형 크기를 결정하는 값 (시가총액)
    pub value: i64,
    /// 사각형 색상을 결정하는 등락률
    pub fluc_rate: Decimal,
    /// 현재가
    pub cur_price: i64,
}

impl TreemapView {
    /// 자식 없는 빈 트리맵을 생성합니다.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// 전체 리프(종목) 수를 반환합니다.
    pub fn leaf_count(&self) -> usize {
        self.children.iter().map(|s| s.children.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_view() {
        let view = TreemapView::empty("KOSPI");
        assert_eq!(view.name, "KOSPI");
        assert!(view.children.is_empty());
        assert_eq!(view.leaf_count(), 0);
    }

    #[test]
    fn test_serialized_field_names() {
        let node = TreemapNode {
            symbol: "005930".to_string(),
            name: "삼성전자".to_string(),
            value: 100,
            fluc_rate: dec!(0.5),
            cur_price: 70_000,
        };
        let json = serde_json::to_string(&node).unwrap();
        // 프론트엔드 계약 필드명 확인
        assert!(json.contains("\"value\""));
        assert!(json.contains("\"fluc_rate\""));
        assert!(json.contains("\"cur_price\""));
    }
}
