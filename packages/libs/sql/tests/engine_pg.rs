//! Postgres 통합 테스트
//!
//! `TK_TEST_DATABASE_URL`이 설정된 경우에만 실행됩니다.
//! 테스트마다 고유한 테이블을 만들고 끝나면 삭제합니다.

use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use tk_core::{Error, Field, MatchCriterion, MatchType, ObjectId, SearchCriteria, SortOrder};
use tk_sql::{CrudEngine, CrudRequest, CrudResponse};

async fn connect() -> Option<PgPool> {
    let Ok(url) = std::env::var("TK_TEST_DATABASE_URL") else {
        eprintln!("skipping: TK_TEST_DATABASE_URL is not set");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("connect to TK_TEST_DATABASE_URL");
    Some(pool)
}

/// `games (id, name, rank, owned, meta)` 테이블 생성
async fn games_table(pool: &PgPool) -> String {
    let table = format!("games_{}", uuid::Uuid::new_v4().simple());
    sqlx::query(&format!(
        "CREATE TABLE \"{table}\" (\
            id bigserial PRIMARY KEY, \
            name varchar(255), \
            rank integer, \
            owned boolean, \
            meta jsonb)"
    ))
    .execute(pool)
    .await
    .unwrap();
    table
}

async fn drop_table(pool: &PgPool, table: &str) {
    sqlx::query(&format!("DROP TABLE IF EXISTS \"{table}\""))
        .execute(pool)
        .await
        .unwrap();
}

fn exact(field: &str, value: &str) -> MatchCriterion {
    MatchCriterion::new(field, value, MatchType::ExactMatching)
}

/// `rank` 조건 하나로 검색한 전체 행 수
async fn count(engine: &CrudEngine, table: &str, value: &str, match_type: MatchType) -> i64 {
    engine
        .search(
            table,
            &SearchCriteria {
                match_criteria: vec![MatchCriterion::new("rank", value, match_type)],
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .total_records
}

#[tokio::test]
async fn test_create_then_search() {
    let Some(pool) = connect().await else { return };
    let table = games_table(&pool).await;
    let engine = CrudEngine::new(pool.clone());

    let id = engine
        .create(
            &table,
            &[
                Field::new("name", "\"Catan\""),
                Field::new("rank", "3"),
                Field::new("owned", "true"),
            ],
        )
        .await
        .unwrap();
    assert!(id > 0);

    let result = engine
        .search(
            &table,
            &SearchCriteria {
                match_criteria: vec![exact("name", "\"Catan\"")],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(result.total_records, 1);
    assert_eq!(result.total_pages, 1);
    assert_eq!(result.items[0].id, json!(id));
    assert_eq!(result.items[0].object_type, table);

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn test_values_round_trip_through_get_one() {
    let Some(pool) = connect().await else { return };
    let table = games_table(&pool).await;
    let engine = CrudEngine::new(pool.clone());

    let id = engine
        .create(
            &table,
            &[
                Field::new("name", "\"5\""),
                Field::new("rank", "5"),
                Field::new("owned", "false"),
                Field::new("meta", "{\"tags\":[\"a\"]}"),
            ],
        )
        .await
        .unwrap();
    let id = ObjectId::new(id).unwrap();

    let fields = engine.get_one(&table, id, &[]).await.unwrap();
    let value = |name: &str| {
        fields
            .iter()
            .find(|f| f.field_name == name)
            .unwrap()
            .decode()
            .unwrap()
    };
    assert_eq!(value("name"), json!("5"));
    assert_eq!(value("rank"), json!(5));
    assert_eq!(value("owned"), json!(false));
    assert_eq!(value("meta"), json!({"tags": ["a"]}));

    let only_name = engine
        .get_one(&table, id, &["name".to_string()])
        .await
        .unwrap();
    assert_eq!(only_name, vec![Field::new("name", "\"5\"")]);

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn test_pagination_over_507_rows() {
    let Some(pool) = connect().await else { return };
    let table = games_table(&pool).await;
    sqlx::query(&format!(
        "INSERT INTO \"{table}\" (name, rank) SELECT 'game ' || n, n FROM generate_series(1, 507) n"
    ))
    .execute(&pool)
    .await
    .unwrap();
    let engine = CrudEngine::new(pool.clone());

    let page = |number: i64| SearchCriteria {
        page_size: Some(5),
        page_number: Some(number),
        sort_by: Some("rank".to_string()),
        sort_order: Some(SortOrder::Ascending),
        ..Default::default()
    };

    let second = engine.search(&table, &page(2)).await.unwrap();
    assert_eq!(second.total_records, 507);
    assert_eq!(second.total_pages, 102);
    assert_eq!(second.items.len(), 5);
    let ranks: Vec<_> = second
        .items
        .iter()
        .map(|item| {
            item.fields
                .iter()
                .find(|f| f.field_name == "rank")
                .unwrap()
                .decode()
                .unwrap()
        })
        .collect();
    assert_eq!(ranks, vec![json!(6), json!(7), json!(8), json!(9), json!(10)]);

    let last = engine.search(&table, &page(102)).await.unwrap();
    assert_eq!(last.items.len(), 2);

    let filtered = engine
        .search(
            &table,
            &SearchCriteria {
                match_criteria: vec![
                    MatchCriterion::new("rank", "\"500\"", MatchType::Greater),
                    MatchCriterion::new("name", "\"game 50\"", MatchType::PartialMatching),
                ],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // game 501 .. game 507
    assert_eq!(filtered.total_records, 7);
    assert_eq!(filtered.total_pages, 1);

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn test_not_found_and_store_errors() {
    let Some(pool) = connect().await else { return };
    let table = games_table(&pool).await;
    let engine = CrudEngine::new(pool.clone());
    let missing = ObjectId::new(999_999_999).unwrap();

    let err = engine.get_one(&table, missing, &[]).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(
        err.to_string(),
        format!("Could not find {table} by id 999999999")
    );

    let err = engine
        .update_one(&table, missing, &[Field::new("name", "\"x\"")])
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = engine.delete_one(&table, missing).await.unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = engine
        .create(&table, &[Field::new("notexist", "1")])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(_)));

    let err = engine.delete_one("notexist", missing).await.unwrap_err();
    assert_eq!(err.to_string(), "relation \"notexist\" does not exist");
    assert_eq!(err.status_code(), 500);

    let err = engine
        .search(
            &table,
            &SearchCriteria {
                match_criteria: vec![MatchCriterion::new("name", "\"a\"", MatchType::Greater)],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid matchType for 'name'");

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn test_update_and_delete_through_execute() {
    let Some(pool) = connect().await else { return };
    let table = games_table(&pool).await;
    let engine = CrudEngine::new(pool.clone());

    let created = engine
        .execute(CrudRequest::Create {
            object_type: table.clone(),
            fields: vec![Field::new("name", "\"Go\""), Field::new("rank", "1")],
        })
        .await
        .unwrap();
    let CrudResponse::Created(id) = created else {
        panic!("expected Created, got {created:?}");
    };
    let id = ObjectId::new(id).unwrap();

    let updated = engine
        .execute(CrudRequest::UpdateOne {
            object_type: table.clone(),
            id,
            fields: vec![Field::new("rank", "null"), Field::new("owned", "true")],
        })
        .await
        .unwrap();
    assert_eq!(updated, CrudResponse::Updated);

    let fields = engine
        .get_one(&table, id, &["rank".to_string(), "owned".to_string()])
        .await
        .unwrap();
    assert_eq!(
        fields,
        vec![Field::new("rank", "null"), Field::new("owned", "true")]
    );

    let deleted = engine
        .execute(CrudRequest::DeleteOne {
            object_type: table.clone(),
            id,
        })
        .await
        .unwrap();
    assert_eq!(deleted, CrudResponse::Deleted);
    assert!(engine.get_one(&table, id, &[]).await.is_err());

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn test_numeric_bounds_on_integer_column() {
    let Some(pool) = connect().await else { return };
    let table = games_table(&pool).await;
    sqlx::query(&format!("INSERT INTO \"{table}\" (rank) VALUES (1), (2), (3)"))
        .execute(&pool)
        .await
        .unwrap();
    let engine = CrudEngine::new(pool.clone());

    // int4 > 1.5 는 numeric 비교 (2로 반올림되지 않음)
    assert_eq!(count(&engine, &table, "1.5", MatchType::Greater).await, 2);
    assert_eq!(count(&engine, &table, "2.5", MatchType::Less).await, 2);
    // int4 범위 밖 경계
    assert_eq!(count(&engine, &table, "3000000000", MatchType::Less).await, 3);
    assert_eq!(count(&engine, &table, "-3000000000", MatchType::GreaterOrEqual).await, 3);
    // 문자열은 컬럼 타입으로 CAST
    assert_eq!(count(&engine, &table, "\"2\"", MatchType::Equal).await, 1);

    drop_table(&pool, &table).await;
}

#[tokio::test]
async fn test_array_columns_and_unsupported_types() {
    let Some(pool) = connect().await else { return };
    let table = format!("shelves_{}", uuid::Uuid::new_v4().simple());
    sqlx::query(&format!(
        "CREATE TABLE \"{table}\" (\
            id serial PRIMARY KEY, \
            tags int4[], \
            labels text[], \
            addr inet)"
    ))
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(&format!(
        "INSERT INTO \"{table}\" (tags, labels) VALUES ('{{1,2}}', ARRAY['a', NULL])"
    ))
    .execute(&pool)
    .await
    .unwrap();
    let engine = CrudEngine::new(pool.clone());
    let id = ObjectId::new(1).unwrap();

    let fields = engine
        .get_one(&table, id, &["id".to_string(), "tags".to_string(), "labels".to_string()])
        .await
        .unwrap();
    assert_eq!(
        fields,
        vec![
            Field::new("id", "1"),
            Field::new("tags", "[1,2]"),
            Field::new("labels", "[\"a\",null]"),
        ]
    );

    // inet 은 JSON으로 옮길 수 없음
    let err = engine.get_one(&table, id, &[]).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert_eq!(err.status_code(), 500);

    drop_table(&pool, &table).await;
}
