//! 시세 API에서 받은 종목별 Fundamental 데이터.
//!
//! 모든 필드는 응답에서 누락될 수 있으므로 `Option`으로 표현합니다.
//! 날짜 필드는 ISO-8601 타임스탬프 문자열 그대로 보관하며,
//! 저장 시점에 [`normalize_date`]로 날짜 부분만 잘라냅니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 종목 하나의 Fundamental 지표 (16개 필드).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalRecord {
    // 거래량
    #[serde(rename = "avg10DaysVolume")]
    pub avg_10_days_volume: Option<Decimal>,
    #[serde(rename = "avg1YearVolume")]
    pub avg_1_year_volume: Option<Decimal>,

    // 배당
    pub declaration_date: Option<String>,
    pub div_amount: Option<Decimal>,
    pub div_ex_date: Option<String>,
    pub div_freq: Option<Decimal>,
    pub div_pay_amount: Option<Decimal>,
    pub div_pay_date: Option<String>,
    pub div_yield: Option<Decimal>,

    // 주당 지표 / 밸류에이션
    pub eps: Option<Decimal>,
    pub fund_leverage_factor: Option<Decimal>,
    pub last_earnings_date: Option<String>,
    pub next_div_ex_date: Option<String>,
    pub next_div_pay_date: Option<String>,
    pub pe_ratio: Option<Decimal>,
    pub shares_outstanding: Option<Decimal>,
}

impl FundamentalRecord {
    /// 알려진 필드가 하나도 채워지지 않았는지 여부.
    ///
    /// `"fundamental": {}` 처럼 비어 있는 페이로드는 수집 대상에서 제외합니다.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 타임스탬프 문자열을 날짜(`YYYY-MM-DD`) 부분만 남기도록 정규화.
///
/// `None` 또는 빈 문자열이면 `None`을 반환합니다.
/// 날짜로 해석할 수 없는 값(예: `"N/A"`)도 경고 로그를 남기고 `None`으로 취급합니다.
///
/// ```
/// use fundamentals_data::normalize_date;
///
/// assert_eq!(normalize_date(Some("2024-01-05T00:00:00Z")).as_deref(), Some("2024-01-05"));
/// assert_eq!(normalize_date(Some("")), None);
/// assert_eq!(normalize_date(None), None);
/// assert_eq!(normalize_date(Some("N/A")), None);
/// ```
pub fn normalize_date(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    let date = value.split_once('T').map_or(value, |(date, _)| date);

    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(_) => Some(date.to_string()),
        Err(e) => {
            warn!(value = %value, error = %e, "날짜 형식 오류, null로 저장");
            None
        }
    }
}
