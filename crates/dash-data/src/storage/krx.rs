//! KRX 시장 데이터 저장소.
//!
//! `daily_metrics` / `nodes` / `sector_history` / `market_history`
//! 테이블에서 스냅샷과 시세 이력을 조회합니다. 섹터/시장 이력은
//! 유효기간 행 방식이며 `end_date IS NULL`이 현재 행입니다.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use dash_core::{MarketRecord, PriceHistoryPoint, StockSearchItem};

use crate::source::MarketDataSource;
use crate::Result;

/// 스냅샷 조회 결과 행.
#[derive(Debug, FromRow)]
struct SnapshotRow {
    symbol: String,
    name: Option<String>,
    sector_name: Option<String>,
    market_type: Option<String>,
    market_cap: Option<i64>,
    change_rate: Option<Decimal>,
    current_price: Option<i64>,
    open_price: Option<i64>,
    high_price: Option<i64>,
    low_price: Option<i64>,
    trade_volume: Option<i64>,
    trade_value: Option<i64>,
    metric_date: NaiveDate,
    collected_at: DateTime<Utc>,
}

impl From<SnapshotRow> for MarketRecord {
    fn from(row: SnapshotRow) -> Self {
        MarketRecord {
            symbol: row.symbol,
            name: row.name,
            sector_name: row.sector_name,
            market_type: row.market_type,
            market_cap: row.market_cap,
            change_rate: row.change_rate,
            current_price: row.current_price,
            open_price: row.open_price,
            high_price: row.high_price,
            low_price: row.low_price,
            trade_volume: row.trade_volume,
            trade_value: row.trade_value,
            metric_date: row.metric_date,
            collected_at: row.collected_at,
        }
    }
}

/// 시세 이력 조회 결과 행.
#[derive(Debug, FromRow)]
struct HistoryRow {
    metric_date: NaiveDate,
    open: i64,
    high: i64,
    low: i64,
    close: i64,
    volume: i64,
}

/// 스냅샷 컬럼 공통 SELECT 절.
const SNAPSHOT_COLUMNS: &str = r#"
    m.isu_srt_cd   AS symbol,
    n.node_name    AS name,
    s.sector_name  AS sector_name,
    h.market_type  AS market_type,
    m.mktcap       AS market_cap,
    m.fluc_rt      AS change_rate,
    m.tdd_clsprc   AS current_price,
    m.tdd_opnprc   AS open_price,
    m.tdd_hgprc    AS high_price,
    m.tdd_lwprc    AS low_price,
    m.acc_trdvol   AS trade_volume,
    m.acc_trdval   AS trade_value,
    m.metric_date  AS metric_date,
    m.collected_at AS collected_at
"#;

/// PostgreSQL 기반 시장 데이터 저장소.
#[derive(Clone)]
pub struct KrxMarketStore {
    pool: PgPool,
}

impl KrxMarketStore {
    /// 새 저장소를 생성합니다.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarketDataSource for KrxMarketStore {
    async fn fetch_live_snapshot(&self) -> Result<Vec<MarketRecord>> {
        let sql = format!(
            r#"
            SELECT {SNAPSHOT_COLUMNS}
            FROM daily_metrics m
                INNER JOIN nodes n ON m.isu_srt_cd = n.isu_srt_cd
                INNER JOIN sector_history s ON n.isu_srt_cd = s.stock_id
                INNER JOIN market_history h ON n.isu_srt_cd = h.stock_id
            WHERE m.metric_date = ( SELECT MAX(metric_date) FROM daily_metrics )
                AND s.end_date IS NULL
                AND h.end_date IS NULL
            ORDER BY m.mktcap DESC NULLS LAST
            "#
        );

        let rows: Vec<SnapshotRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "장중 스냅샷 조회 완료");
        Ok(rows.into_iter().map(MarketRecord::from).collect())
    }

    async fn fetch_snapshot_as_of(&self, date: NaiveDate) -> Result<Vec<MarketRecord>> {
        // 같은 날짜에 여러 번 수집된 경우 마지막 수집분만 사용
        let sql = format!(
            r#"
            WITH ranked_metrics AS (
                SELECT m.*,
                       ROW_NUMBER() OVER (
                           PARTITION BY m.isu_srt_cd
                           ORDER BY m.collected_at DESC
                       ) AS rn
                FROM daily_metrics m
                WHERE m.metric_date = $1
            )
            SELECT {SNAPSHOT_COLUMNS}
            FROM ranked_metrics m
                INNER JOIN nodes n ON m.isu_srt_cd = n.isu_srt_cd
                INNER JOIN sector_history s ON m.isu_srt_cd = s.stock_id
                INNER JOIN market_history h ON m.isu_srt_cd = h.stock_id
            WHERE m.rn = 1
                AND m.metric_date BETWEEN s.start_date
                    AND COALESCE(s.end_date, DATE '9999-12-31')
                AND m.metric_date BETWEEN h.start_date
                    AND COALESCE(h.end_date, DATE '9999-12-31')
            ORDER BY m.mktcap DESC NULLS LAST
            "#
        );

        let rows: Vec<SnapshotRow> = sqlx::query_as(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        debug!(count = rows.len(), %date, "마감 스냅샷 조회 완료");
        Ok(rows.into_iter().map(MarketRecord::from).collect())
    }

    async fn fetch_stock_name(&self, symbol: &str) -> Result<Option<String>> {
        let name: Option<String> =
            sqlx::query_scalar("SELECT node_name FROM nodes WHERE isu_srt_cd = $1")
                .bind(symbol)
                .fetch_optional(&self.pool)
                .await?;
        Ok(name)
    }

    async fn search_by_name(&self, query: &str, limit: i64) -> Result<Vec<StockSearchItem>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT isu_srt_cd, node_name
            FROM nodes
            WHERE node_name ILIKE '%' || $1 || '%'
               OR isu_srt_cd LIKE $1 || '%'
            ORDER BY node_name
            LIMIT $2
            "#,
        )
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(symbol, name)| StockSearchItem { symbol, name })
            .collect())
    }

    async fn fetch_price_history(
        &self,
        symbol: &str,
        from: NaiveDate,
    ) -> Result<Vec<PriceHistoryPoint>> {
        // 날짜별로 마지막 수집분 한 건만 선택
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT DISTINCT ON (m.metric_date)
                m.metric_date               AS metric_date,
                COALESCE(m.tdd_opnprc, 0)   AS open,
                COALESCE(m.tdd_hgprc, 0)    AS high,
                COALESCE(m.tdd_lwprc, 0)    AS low,
                COALESCE(m.tdd_clsprc, 0)   AS close,
                COALESCE(m.acc_trdvol, 0)   AS volume
            FROM daily_metrics m
            WHERE m.isu_srt_cd = $1
              AND m.metric_date >= $2
            ORDER BY m.metric_date ASC, m.collected_at DESC
            "#,
        )
        .bind(symbol)
        .bind(from)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PriceHistoryPoint {
                time: r.metric_date.format("%Y-%m-%d").to_string(),
                open: r.open,
                high: r.high,
                low: r.low,
                close: r.close,
                volume: r.volume,
            })
            .collect())
    }

    async fn fetch_latest_quotes(&self, symbols: &[String]) -> Result<Vec<MarketRecord>> {
        let sql = format!(
            r#"
            SELECT {SNAPSHOT_COLUMNS}
            FROM daily_metrics m
                INNER JOIN nodes n ON m.isu_srt_cd = n.isu_srt_cd
                INNER JOIN sector_history s ON n.isu_srt_cd = s.stock_id
                INNER JOIN market_history h ON n.isu_srt_cd = h.stock_id
            WHERE m.metric_date = ( SELECT MAX(metric_date) FROM daily_metrics )
                AND s.end_date IS NULL
                AND h.end_date IS NULL
                AND m.isu_srt_cd = ANY($1)
            ORDER BY m.mktcap DESC NULLS LAST
            "#
        );

        let rows: Vec<SnapshotRow> = sqlx::query_as(&sql)
            .bind(symbols)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(MarketRecord::from).collect())
    }
}
