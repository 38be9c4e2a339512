//! 외부 데이터 제공자.

pub mod index_feed;

pub use index_feed::KrxIndexFeed;
