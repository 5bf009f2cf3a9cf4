//! 대시보드 레이아웃에서 심볼 추출.
//!
//! 레이아웃은 위젯 목록의 JSON 직렬화 문자열이며, 위젯은 `symbol` 필드 외에는
//! 해석하지 않습니다. 파싱에 실패한 레이아웃은 건너뛰고 다음 레이아웃을 계속
//! 처리합니다 (한 사용자의 손상된 레이아웃이 전체 수집을 막지 않도록).

use std::collections::HashSet;

use fundamentals_data::LayoutSource;
use serde_json::Value;
use tracing::{info, warn};

use crate::Result;

/// 레이아웃 하나의 파싱 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutParse {
    /// 위젯에서 추출한 심볼 (대문자, 레이아웃 내 순서 유지)
    Parsed(Vec<String>),
    /// 파싱 실패로 건너뜀 (사유)
    Skipped(String),
}

/// 심볼 추출 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredSymbols {
    /// 중복 제거된 심볼 (처음 발견된 순서)
    pub symbols: Vec<String>,
    /// 처리한 레이아웃 수
    pub layouts_scanned: usize,
    /// 건너뛴 레이아웃 수
    pub layouts_skipped: usize,
}

/// 레이아웃 원본을 파싱하여 심볼 목록 추출.
///
/// 위젯은 불투명 값으로 다루며, 문자열 `symbol` 필드가 없는 위젯은 무시합니다.
pub fn parse_layout(raw: &str) -> LayoutParse {
    match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(widgets) => LayoutParse::Parsed(
            widgets
                .iter()
                .filter_map(|widget| widget.get("symbol").and_then(Value::as_str))
                .map(|symbol| symbol.trim().to_uppercase())
                .filter(|symbol| !symbol.is_empty())
                .collect(),
        ),
        Err(e) => LayoutParse::Skipped(e.to_string()),
    }
}

/// 레이아웃 원본 목록에서 심볼 집합 구성.
///
/// 빈 레이아웃은 집계에서 제외합니다.
pub fn collect_symbols<'a, I>(layouts: I) -> DiscoveredSymbols
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut discovered = DiscoveredSymbols::default();

    for raw in layouts.into_iter().filter(|raw| !raw.trim().is_empty()) {
        discovered.layouts_scanned += 1;

        match parse_layout(raw) {
            LayoutParse::Parsed(symbols) => {
                for symbol in symbols {
                    if seen.insert(symbol.clone()) {
                        discovered.symbols.push(symbol);
                    }
                }
            }
            LayoutParse::Skipped(reason) => {
                discovered.layouts_skipped += 1;
                warn!(reason = %reason, "레이아웃 JSON 파싱 실패, 건너뜀");
            }
        }
    }

    discovered
}

/// 저장된 모든 레이아웃에서 갱신 대상 심볼 조회.
pub async fn discover_symbols(source: &dyn LayoutSource) -> Result<DiscoveredSymbols> {
    let layouts = source.load_layouts().await?;
    let discovered = collect_symbols(layouts.iter().map(String::as_str));

    info!(
        count = discovered.symbols.len(),
        layouts = discovered.layouts_scanned,
        skipped = discovered.layouts_skipped,
        symbols = ?discovered.symbols,
        "고유 심볼 조회 완료"
    );

    Ok(discovered)
}
