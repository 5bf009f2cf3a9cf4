//! 데이터 Provider 모듈.
//!
//! ## 시세 API
//! - `QuoteClient`: `GET /quote?symbol=..&fields=fundamental` 호출
//! - EQUITY 자산 중 Fundamental 페이로드가 있는 종목만 반환
//! - 실패 시 빈 결과를 반환하며 오류를 호출자에게 전파하지 않음

pub mod quote;

pub use quote::{FundamentalsSource, QuoteClient, QuoteClientConfig};
