//! CRUD SQL 빌더
//!
//! 테이블 이름, Field 목록, 검색 조건을 받아 `QueryPlan`을 생성합니다.
//! 식별자는 `Ident`로 검증된 뒤 SeaQuery가 따옴표로 감싸고, 값은 모두 파라미터로 바인딩합니다.

use sea_query::extension::postgres::PgExpr;
use sea_query::{
    Alias, Asterisk, Expr, Func, Keyword, Order, PostgresQueryBuilder, Query, SimpleExpr,
};
use serde_json::Value;

use tk_core::search::Page;
use tk_core::{
    ColumnCatalog, ColumnDescriptor, Error, Field, MatchCriterion, MatchType, ObjectId, Result,
    SearchCriteria, SortOrder,
};

use crate::ident::{unquote, Ident};
use crate::plan::{QueryPlan, SearchPlan};

fn empty_fields() -> Error {
    Error::validation("\"fields\" must contain at least 1 items", &["fields"])
}

/// Field 목록 → (컬럼, 값 표현식)
///
/// 디코딩 실패 시 해당 필드 이름을 지목합니다.
fn assignments(fields: &[Field]) -> Result<Vec<(Ident, SimpleExpr)>> {
    if fields.is_empty() {
        return Err(empty_fields());
    }
    fields
        .iter()
        .map(|field| {
            let column = Ident::parse(&field.field_name)?;
            let value = field.decode()?;
            Ok((column, value_to_expr(value)))
        })
        .collect()
}

/// serde_json::Value를 SeaQuery 표현식으로 변환
///
/// null은 타입 없는 `NULL` 키워드로 넣어 어떤 컬럼 타입에도 대입되도록 합니다.
fn value_to_expr(value: Value) -> SimpleExpr {
    match value {
        Value::Null => SimpleExpr::Keyword(Keyword::Null),
        Value::Bool(b) => Expr::val(b).into(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Expr::val(i).into()
            } else if let Some(f) = n.as_f64() {
                Expr::val(f).into()
            } else {
                Expr::val(n.to_string()).into()
            }
        }
        Value::String(s) => Expr::val(s).into(),
        // JSON 타입으로 바인딩
        Value::Array(_) | Value::Object(_) => Expr::val(value).into(),
    }
}

/// INSERT 쿼리 빌더
pub struct InsertBuilder<'a> {
    table: &'a Ident,
}

impl<'a> InsertBuilder<'a> {
    pub fn new(table: &'a Ident) -> Self {
        Self { table }
    }

    /// `INSERT INTO t (cols) VALUES (...) RETURNING id`
    pub fn build(&self, fields: &[Field]) -> Result<QueryPlan> {
        let (columns, values): (Vec<Ident>, Vec<SimpleExpr>) =
            assignments(fields)?.into_iter().unzip();

        let mut query = Query::insert();
        query
            .into_table(self.table.clone())
            .columns(columns)
            .values(values)
            .map_err(|e| Error::validation(e.to_string(), &["fields"]))?;
        query.returning(Query::returning().column(Ident::id()));

        Ok(QueryPlan::from_built(query.build(PostgresQueryBuilder)))
    }
}

/// 단건 SELECT 쿼리 빌더 (getOne)
pub struct SelectBuilder<'a> {
    table: &'a Ident,
}

impl<'a> SelectBuilder<'a> {
    pub fn new(table: &'a Ident) -> Self {
        Self { table }
    }

    /// `SELECT cols|* FROM t WHERE id = $1`
    ///
    /// 컬럼 존재 여부는 확인하지 않습니다. 없는 컬럼은 저장소가 거부합니다.
    pub fn build(&self, id: ObjectId, columns: &[String]) -> Result<QueryPlan> {
        let mut query = Query::select();
        if columns.is_empty() {
            query.column(Asterisk);
        } else {
            let columns = columns
                .iter()
                .map(|c| Ident::parse(c))
                .collect::<Result<Vec<_>>>()?;
            query.columns(columns);
        }
        query
            .from(self.table.clone())
            .and_where(Expr::col(Ident::id()).eq(id.get()));

        Ok(QueryPlan::from_built(query.build(PostgresQueryBuilder)))
    }
}

/// UPDATE 쿼리 빌더
pub struct UpdateBuilder<'a> {
    table: &'a Ident,
}

impl<'a> UpdateBuilder<'a> {
    pub fn new(table: &'a Ident) -> Self {
        Self { table }
    }

    /// `UPDATE t SET col = $n, ... WHERE id = $m`
    pub fn build(&self, id: ObjectId, fields: &[Field]) -> Result<QueryPlan> {
        let mut query = Query::update();
        query.table(self.table.clone());

        // SET 절
        for (column, value) in assignments(fields)? {
            query.value(column, value);
        }

        query.and_where(Expr::col(Ident::id()).eq(id.get()));

        Ok(QueryPlan::from_built(query.build(PostgresQueryBuilder)))
    }
}

/// DELETE 쿼리 빌더
pub struct DeleteBuilder<'a> {
    table: &'a Ident,
}

impl<'a> DeleteBuilder<'a> {
    pub fn new(table: &'a Ident) -> Self {
        Self { table }
    }

    /// `DELETE FROM t WHERE id = $1`
    pub fn build(&self, id: ObjectId) -> QueryPlan {
        let mut query = Query::delete();
        query
            .from_table(self.table.clone())
            .and_where(Expr::col(Ident::id()).eq(id.get()));

        QueryPlan::from_built(query.build(PostgresQueryBuilder))
    }
}

/// 검색 쿼리 빌더
///
/// 요청마다 읽어온 `ColumnCatalog`에 대해 모든 필드 참조를 검증합니다.
pub struct SearchBuilder<'a> {
    table: &'a Ident,
    catalog: &'a ColumnCatalog,
}

impl<'a> SearchBuilder<'a> {
    pub fn new(table: &'a Ident, catalog: &'a ColumnCatalog) -> Self {
        Self { table, catalog }
    }

    /// 행 조회와 COUNT 조회를 함께 생성
    pub fn build(&self, criteria: &SearchCriteria) -> Result<SearchPlan> {
        let conditions = criteria
            .match_criteria
            .iter()
            .map(|c| self.condition(c))
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Query::select();
        rows.column(Asterisk).from(self.table.clone());

        let mut total = Query::select();
        total
            .expr(Func::count(Expr::col(Asterisk)))
            .from(self.table.clone());

        // WHERE (AND, 같은 필드 중복도 그대로 적용)
        for condition in conditions {
            rows.and_where(condition.clone());
            total.and_where(condition);
        }

        // ORDER BY
        if let Some(sort_by) = &criteria.sort_by {
            let column = self.catalog.require(unquote(sort_by))?;
            let order = match criteria.sort_order() {
                SortOrder::Ascending => Order::Asc,
                SortOrder::Descending => Order::Desc,
            };
            rows.order_by(Ident::parse(&column.name)?, order);
        }

        // LIMIT / OFFSET
        if let Some(Page { limit, offset }) = criteria.page() {
            rows.limit(limit).offset(offset);
        }

        Ok(SearchPlan {
            rows: QueryPlan::from_built(rows.build(PostgresQueryBuilder)),
            total: QueryPlan::from_built(total.build(PostgresQueryBuilder)),
        })
    }

    fn condition(&self, criterion: &MatchCriterion) -> Result<SimpleExpr> {
        let name = unquote(&criterion.field_name);
        let column = self.catalog.require(name)?;

        if !criterion.match_type.accepts(column.comparability()) {
            return Err(Error::validation(
                format!("Invalid matchType for '{}'", criterion.field_name),
                &["matchCriteria", name],
            ));
        }

        let value = criterion.bind_value()?;
        let col = Expr::col(Ident::parse(&column.name)?);

        let expr = match criterion.match_type {
            MatchType::PartialMatching => {
                let pattern = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                col.ilike(pattern)
            }
            MatchType::ExactMatching | MatchType::Equal => col.eq(cast_to(value, column)),
            MatchType::Greater => col.gt(cast_to(value, column)),
            MatchType::GreaterOrEqual => col.gte(cast_to(value, column)),
            MatchType::Less => col.lt(cast_to(value, column)),
            MatchType::LessOrEqual => col.lte(cast_to(value, column)),
        };
        Ok(expr)
    }
}

/// 비교 값 표현식
///
/// 문자열만 컬럼의 카탈로그 타입으로 CAST합니다 (`"1"` → int4, `"Y"` → bool).
/// 숫자/불리언은 그대로 바인딩해 Postgres의 숫자 승격을 따릅니다 (`int4 > 1.5`).
fn cast_to(value: Value, column: &ColumnDescriptor) -> SimpleExpr {
    let textual = value.is_string();
    let expr = value_to_expr(value);
    match column.cast_type() {
        Some(ty) if textual => Func::cast_as(expr, Alias::new(ty)).into(),
        _ => expr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn games() -> Ident {
        Ident::parse("games").unwrap()
    }

    fn catalog() -> ColumnCatalog {
        ColumnCatalog::new(
            "games",
            vec![
                ColumnDescriptor::new("id", "integer", "int4"),
                ColumnDescriptor::new("name", "character varying", "varchar"),
                ColumnDescriptor::new("rank", "integer", "int4"),
                ColumnDescriptor::new("owned", "boolean", "bool"),
            ],
        )
    }

    fn criterion(field: &str, value: &str, match_type: MatchType) -> MatchCriterion {
        MatchCriterion::new(field, value, match_type)
    }

    #[test]
    fn test_insert_builder() {
        let table = games();
        let plan = InsertBuilder::new(&table)
            .build(&[
                Field::new("name", "\"Catan\""),
                Field::new("\"rank\"", "3"),
                Field::new("owned", "null"),
            ])
            .unwrap();

        assert!(plan.sql.starts_with("INSERT INTO \"games\" (\"name\", \"rank\", \"owned\")"));
        assert!(plan.sql.contains("NULL"));
        assert!(plan.sql.ends_with("RETURNING \"id\""));
        assert_eq!(plan.values, vec![json!("Catan"), json!(3)]);
    }

    #[test]
    fn test_insert_requires_fields() {
        let table = games();
        let err = InsertBuilder::new(&table).build(&[]).unwrap_err();
        assert_eq!(err.to_string(), "\"fields\" must contain at least 1 items");

        let err = InsertBuilder::new(&table)
            .build(&[Field::new("invalidjson", "a")])
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid json string field value for 'invalidjson'");
    }

    #[test]
    fn test_insert_rejects_injected_identifier() {
        let table = games();
        let err = InsertBuilder::new(&table)
            .build(&[Field::new("name\" text); --", "\"x\"")])
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_select_builder() {
        let table = games();
        let id = ObjectId::new(2609).unwrap();

        let plan = SelectBuilder::new(&table).build(id, &[]).unwrap();
        assert!(plan.sql.starts_with("SELECT * FROM \"games\" WHERE \"id\" = $1"));
        assert_eq!(plan.values, vec![json!(2609)]);

        let plan = SelectBuilder::new(&table)
            .build(id, &["name".to_string(), "\"rank\"".to_string()])
            .unwrap();
        assert!(plan.sql.starts_with("SELECT \"name\", \"rank\" FROM \"games\""));
    }

    #[test]
    fn test_update_builder() {
        let table = games();
        let plan = UpdateBuilder::new(&table)
            .build(ObjectId::new(7).unwrap(), &[Field::new("name", "\"Go\"")])
            .unwrap();

        assert!(plan.sql.starts_with("UPDATE \"games\" SET \"name\" = $1"));
        assert!(plan.sql.contains("WHERE \"id\" = $2"));
        assert_eq!(plan.values, vec![json!("Go"), json!(7)]);

        let err = UpdateBuilder::new(&table)
            .build(ObjectId::new(7).unwrap(), &[])
            .unwrap_err();
        assert_eq!(err.fields(), &["fields".to_string()]);
    }

    #[test]
    fn test_delete_builder() {
        let table = games();
        let plan = DeleteBuilder::new(&table).build(ObjectId::new(3).unwrap());
        assert_eq!(plan.sql, "DELETE FROM \"games\" WHERE \"id\" = $1");
        assert_eq!(plan.values, vec![json!(3)]);
    }

    #[test]
    fn test_search_where_and_count_share_conditions() {
        let (table, catalog) = (games(), catalog());
        let criteria = SearchCriteria {
            match_criteria: vec![
                criterion("name", "\"ata\"", MatchType::PartialMatching),
                criterion("rank", "\"2\"", MatchType::GreaterOrEqual),
                criterion("rank", "10", MatchType::Less),
            ],
            ..Default::default()
        };

        let plan = SearchBuilder::new(&table, &catalog).build(&criteria).unwrap();
        assert!(plan.rows.sql.contains("\"name\" ILIKE $1"));
        assert!(plan.rows.sql.contains("\"rank\" >= CAST($2 AS int4)"));
        assert!(plan.rows.sql.contains("\"rank\" < $3"));
        assert!(plan.total.sql.starts_with("SELECT COUNT(*) FROM \"games\" WHERE"));
        assert!(plan.total.sql.contains("\"rank\" < $3"));
        assert_eq!(plan.rows.values, vec![json!("%ata%"), json!("2"), json!(10)]);
        assert_eq!(plan.rows.values, plan.total.values);
    }

    #[test]
    fn test_search_numbers_bind_without_cast() {
        let (table, catalog) = (games(), catalog());
        let criteria = SearchCriteria {
            match_criteria: vec![
                criterion("rank", "1.5", MatchType::Greater),
                criterion("rank", "3000000000", MatchType::Less),
                criterion("owned", "true", MatchType::Equal),
                criterion("owned", "\"Y\"", MatchType::Equal),
            ],
            ..Default::default()
        };

        let plan = SearchBuilder::new(&table, &catalog).build(&criteria).unwrap();
        assert!(plan.rows.sql.contains("\"rank\" > $1"));
        assert!(plan.rows.sql.contains("\"rank\" < $2"));
        assert!(plan.rows.sql.contains("\"owned\" = $3"));
        assert!(plan.rows.sql.contains("\"owned\" = CAST($4 AS bool)"));
        assert_eq!(
            plan.rows.values,
            vec![json!(1.5), json!(3000000000i64), json!(true), json!("Y")]
        );
    }

    #[test]
    fn test_search_sort_and_page() {
        let (table, catalog) = (games(), catalog());
        let criteria = SearchCriteria {
            page_size: Some(5),
            page_number: Some(2),
            sort_by: Some("rank".to_string()),
            sort_order: Some(SortOrder::Descending),
            ..Default::default()
        };

        let plan = SearchBuilder::new(&table, &catalog).build(&criteria).unwrap();
        assert!(plan.rows.sql.contains("ORDER BY \"rank\" DESC"));
        assert!(plan.rows.sql.contains("LIMIT $1 OFFSET $2"));
        assert_eq!(plan.rows.values, vec![json!(5), json!(5)]);
        assert!(!plan.total.sql.contains("LIMIT"));
        assert!(!plan.total.sql.contains("ORDER BY"));

        let ascending = SearchCriteria {
            sort_by: Some("name".to_string()),
            ..Default::default()
        };
        let plan = SearchBuilder::new(&table, &catalog).build(&ascending).unwrap();
        assert!(plan.rows.sql.contains("ORDER BY \"name\" ASC"));
        assert!(!plan.rows.sql.contains("LIMIT"));
    }

    #[test]
    fn test_search_validation_errors() {
        let (table, catalog) = (games(), catalog());
        let build = |criteria: SearchCriteria| {
            SearchBuilder::new(&table, &catalog)
                .build(&criteria)
                .unwrap_err()
                .to_string()
        };

        let unknown = SearchCriteria {
            match_criteria: vec![criterion("notexist", "1", MatchType::Equal)],
            ..Default::default()
        };
        assert_eq!(build(unknown), "There is no such column called 'notexist' for 'games'");

        let textual = SearchCriteria {
            match_criteria: vec![criterion("name", "\"a\"", MatchType::Greater)],
            ..Default::default()
        };
        assert_eq!(build(textual), "Invalid matchType for 'name'");

        let non_textual = SearchCriteria {
            match_criteria: vec![criterion("rank", "\"1\"", MatchType::ExactMatching)],
            ..Default::default()
        };
        assert_eq!(build(non_textual), "Invalid matchType for 'rank'");

        let bad_json = SearchCriteria {
            match_criteria: vec![criterion("name", "a", MatchType::ExactMatching)],
            ..Default::default()
        };
        assert_eq!(build(bad_json), "Invalid json string field value for 'name'");

        let bad_sort = SearchCriteria {
            sort_by: Some("notexist".to_string()),
            ..Default::default()
        };
        assert_eq!(build(bad_sort), "There is no such column called 'notexist' for 'games'");
    }
}
