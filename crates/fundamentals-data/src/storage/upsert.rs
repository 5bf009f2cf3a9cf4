//! `equity_fundamentals` upsert 문 빌더.
//!
//! 레코드 하나를 파라미터 17개(심볼 + 지표 16개)의 upsert 문으로 변환합니다.
//! 누락된 필드는 컬럼을 생략하지 않고 명시적인 NULL 파라미터로 바인딩하므로,
//! 이전 수집에서 채워졌던 값도 최신 응답 기준으로 덮어씁니다.

use rust_decimal::Decimal;

use crate::fundamental::{normalize_date, FundamentalRecord};

/// 심볼 기준 insert-or-update 쿼리.
///
/// 파라미터 순서는 [`build_upsert`]와 일치해야 합니다.
pub const UPSERT_FUNDAMENTAL_SQL: &str = r#"
INSERT INTO equity_fundamentals (
    symbol, avg_10_days_volume, avg_1_year_volume, declaration_date, div_amount,
    div_ex_date, div_freq, div_pay_amount, div_pay_date, div_yield,
    eps, fund_leverage_factor, last_earnings_date, next_div_ex_date,
    next_div_pay_date, pe_ratio, shares_outstanding, updated_at
)
VALUES (
    $1, $2, $3, $4::date, $5, $6::date, $7, $8, $9::date, $10,
    $11, $12, $13::date, $14::date, $15::date, $16, $17, NOW()
)
ON CONFLICT (symbol) DO UPDATE SET
    avg_10_days_volume = EXCLUDED.avg_10_days_volume,
    avg_1_year_volume = EXCLUDED.avg_1_year_volume,
    declaration_date = EXCLUDED.declaration_date,
    div_amount = EXCLUDED.div_amount,
    div_ex_date = EXCLUDED.div_ex_date,
    div_freq = EXCLUDED.div_freq,
    div_pay_amount = EXCLUDED.div_pay_amount,
    div_pay_date = EXCLUDED.div_pay_date,
    div_yield = EXCLUDED.div_yield,
    eps = EXCLUDED.eps,
    fund_leverage_factor = EXCLUDED.fund_leverage_factor,
    last_earnings_date = EXCLUDED.last_earnings_date,
    next_div_ex_date = EXCLUDED.next_div_ex_date,
    next_div_pay_date = EXCLUDED.next_div_pay_date,
    pe_ratio = EXCLUDED.pe_ratio,
    shares_outstanding = EXCLUDED.shares_outstanding,
    updated_at = NOW()
"#;

/// 바인딩 파라미터.
///
/// NULL도 타입을 가진 채로 바인딩되도록 값은 `Option`으로 보관합니다.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// 문자열 (심볼, `YYYY-MM-DD` 날짜)
    Text(Option<String>),
    /// 수치
    Numeric(Option<Decimal>),
}

impl SqlParam {
    pub fn is_null(&self) -> bool {
        match self {
            SqlParam::Text(v) => v.is_none(),
            SqlParam::Numeric(v) => v.is_none(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlParam::Text(v) => v.as_deref(),
            SqlParam::Numeric(_) => None,
        }
    }

    pub fn as_numeric(&self) -> Option<Decimal> {
        match self {
            SqlParam::Numeric(v) => *v,
            SqlParam::Text(_) => None,
        }
    }
}

/// 준비된 upsert 문 (쿼리 + 파라미터).
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertStatement {
    sql: &'static str,
    params: Vec<SqlParam>,
}

impl UpsertStatement {
    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// 대상 심볼 (첫 번째 파라미터).
    pub fn symbol(&self) -> Option<&str> {
        self.params.first().and_then(SqlParam::as_text)
    }
}

/// 레코드를 upsert 문으로 변환.
pub fn build_upsert(symbol: &str, record: &FundamentalRecord) -> UpsertStatement {
    let date = |value: &Option<String>| SqlParam::Text(normalize_date(value.as_deref()));

    let params = vec![
        SqlParam::Text(Some(symbol.to_string())),
        SqlParam::Numeric(record.avg_10_days_volume),
        SqlParam::Numeric(record.avg_1_year_volume),
        date(&record.declaration_date),
        SqlParam::Numeric(record.div_amount),
        date(&record.div_ex_date),
        SqlParam::Numeric(record.div_freq),
        SqlParam::Numeric(record.div_pay_amount),
        date(&record.div_pay_date),
        SqlParam::Numeric(record.div_yield),
        SqlParam::Numeric(record.eps),
        SqlParam::Numeric(record.fund_leverage_factor),
        date(&record.last_earnings_date),
        date(&record.next_div_ex_date),
        date(&record.next_div_pay_date),
        SqlParam::Numeric(record.pe_ratio),
        SqlParam::Numeric(record.shares_outstanding),
    ];

    UpsertStatement {
        sql: UPSERT_FUNDAMENTAL_SQL,
        params,
    }
}
