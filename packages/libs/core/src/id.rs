//! 행 ID
//!
//! 엔진이 다루는 모든 테이블은 정수 `id` PK를 가집니다.
//! ID는 부호 있는 64비트 범위의 1 이상 정수여야 하며, 저장소에 닿기 전에 검증합니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 검증된 행 ID (1..=i64::MAX)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ObjectId(i64);

impl ObjectId {
    pub fn new(value: i64) -> Result<Self> {
        if value < 1 {
            return Err(too_small());
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

fn too_small() -> Error {
    Error::validation("\"id\" must be larger than or equal to 1", &["id"])
}

fn too_large() -> Error {
    Error::validation(
        format!("\"id\" must be less than or equal to {}", i64::MAX),
        &["id"],
    )
}

fn not_integer() -> Error {
    Error::validation("\"id\" must be an integer", &["id"])
}

impl FromStr for ObjectId {
    type Err = Error;

    /// URL 경로 세그먼트 등 텍스트에서 파싱
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(value) = s.parse::<i64>() {
            return Self::new(value);
        }

        let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            // 정수 표기지만 i64 범위를 벗어남
            return Err(if s.starts_with('-') { too_small() } else { too_large() });
        }

        // "2.0" 같은 정수값 실수 표기는 허용
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 => {
                if f < 1.0 {
                    Err(too_small())
                } else if f >= i64::MAX as f64 {
                    Err(too_large())
                } else {
                    Self::new(f as i64)
                }
            }
            _ => Err(not_integer()),
        }
    }
}

impl TryFrom<i64> for ObjectId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ObjectId> for i64 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
