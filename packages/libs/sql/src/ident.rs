//! SQL 식별자 이스케이프
//!
//! 테이블/컬럼 이름은 파라미터로 바인딩할 수 없으므로 항상 큰따옴표로 감싸서 SQL에 넣습니다.
//! 이름 내부에 따옴표가 있으면 감싸기만으로는 안전하지 않으므로 거부합니다.

use std::fmt;

use sea_query::Iden;

use tk_core::{Error, Result};

const QUOTE: char = '"';

/// 모든 테이블이 가진다고 가정하는 PK 컬럼
pub const ID_COLUMN: &str = "id";

fn is_wrapped(name: &str) -> bool {
    name.len() >= 2 && name.starts_with(QUOTE) && name.ends_with(QUOTE)
}

/// 이미 감싸져 있지 않으면 큰따옴표로 감쌉니다 (멱등)
pub fn quote(name: &str) -> String {
    if is_wrapped(name) {
        name.to_string()
    } else {
        format!("{QUOTE}{name}{QUOTE}")
    }
}

/// 감싸져 있으면 벗겨냅니다 (멱등이 아닌 입력은 그대로 반환)
pub fn unquote(name: &str) -> &str {
    if is_wrapped(name) {
        &name[1..name.len() - 1]
    } else {
        name
    }
}

/// 검증된 식별자
///
/// 따옴표를 벗긴 이름을 보관하며, SeaQuery가 렌더링할 때 다시 감쌉니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    /// 사용자 입력에서 식별자 생성
    ///
    /// 빈 이름, 내부 따옴표, NUL 문자는 거부합니다.
    pub fn parse(name: &str) -> Result<Self> {
        let bare = unquote(name);
        if bare.is_empty() || bare.contains(QUOTE) || bare.contains('\0') {
            return Err(Error::validation(
                format!("Invalid identifier '{}'", name),
                &[name],
            ));
        }
        Ok(Self(bare.to_string()))
    }

    /// PK 컬럼
    pub fn id() -> Self {
        Self(ID_COLUMN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Iden for Ident {
    fn unquoted(&self, s: &mut dyn fmt::Write) {
        // fmt::Write for String은 실패하지 않음
        let _ = s.write_str(&self.0);
    }
}
