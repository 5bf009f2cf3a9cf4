//! 동기화 파이프라인 모듈.

pub mod fundamental_sync;
pub mod symbol_discovery;

#[cfg(test)]
pub(crate) mod test_support;

pub use fundamental_sync::{chunk_symbols, FundamentalSync, SyncOptions};
pub use symbol_discovery::{
    collect_symbols, discover_symbols, parse_layout, DiscoveredSymbols, LayoutParse,
};
