use super::*;
use crate::config::ClientConfig;
use crate::testing::RecordingConnection;

async fn client_with(conn: RecordingConnection) -> Client<RecordingConnection> {
    Client::with_connection(conn, ClientConfig::default())
        .await
        .unwrap()
}

#[test]
fn column_types_render_postgres_names() {
    assert_eq!(ColumnType::BigInteger.to_string(), "BIGINT");
    assert_eq!(ColumnType::Binary.to_string(), "BYTEA");
    assert_eq!(ColumnType::Char(3).to_string(), "CHAR(3)");
    assert_eq!(
        ColumnType::Decimal {
            precision: 10,
            scale: 2
        }
        .to_string(),
        "NUMERIC(10, 2)"
    );
    assert_eq!(ColumnType::Double.to_string(), "DOUBLE PRECISION");
    assert_eq!(ColumnType::Increments.to_string(), "SERIAL");
    assert_eq!(ColumnType::String(None).to_string(), "VARCHAR");
    assert_eq!(ColumnType::String(Some(64)).to_string(), "VARCHAR(64)");
    assert_eq!(ColumnType::Timestamp.to_string(), "TIMESTAMP");
}

#[tokio::test]
async fn same_column_twice_is_added_once() {
    let mut client = client_with(RecordingConnection::new().with_table("t", &[])).await;
    client.connection().clear_log();

    let mut t = client.schema("t").await.unwrap();
    t.integer("x", None).await.unwrap();
    t.integer("x", None).await.unwrap();
    assert_eq!(t.columns(), ["x".to_string()]);

    assert_eq!(
        client.connection().sql_log(),
        vec!["ALTER TABLE t ADD x INTEGER".to_string()]
    );
}

#[tokio::test]
async fn created_shell_tracks_added_columns() {
    let mut client = client_with(RecordingConnection::new()).await;
    client.create_table("t").await.unwrap();
    client
        .schema("t")
        .await
        .unwrap()
        .add_column("x", "INTEGER", None)
        .await
        .unwrap();

    assert_eq!(client.catalog().columns_of("t").unwrap(), ["x".to_string()]);

    // The live table has the same shape, so reloading changes nothing.
    let before = client.catalog().clone();
    client.reload().await.unwrap();
    assert_eq!(&before, client.catalog());
    assert_eq!(
        client.connection().live_columns("t"),
        Some(vec!["x".to_string()])
    );
}

#[tokio::test]
async fn existing_columns_from_catalog_are_skipped() {
    let mut client = client_with(RecordingConnection::new().with_table("users", &["id"])).await;
    client.connection().clear_log();

    client
        .schema("users")
        .await
        .unwrap()
        .increments("ID")
        .await
        .unwrap();
    assert!(client.connection().statements().is_empty());
}

#[tokio::test]
async fn defaults_render_as_literals() {
    let mut client = client_with(RecordingConnection::new().with_table("t", &[])).await;
    client.connection().clear_log();

    let mut t = client.schema("t").await.unwrap();
    t.string("name", Some(32), Some("it's"))
        .await
        .unwrap()
        .small_integer("rank", Some(3))
        .await
        .unwrap()
        .jsonb("meta", Some(serde_json::json!({"a": 1})))
        .await
        .unwrap()
        .binary("blob", Some(vec![0xde, 0xad]))
        .await
        .unwrap()
        .decimal("price", 8, 2, None)
        .await
        .unwrap();

    assert_eq!(
        client.connection().sql_log(),
        vec![
            "ALTER TABLE t ADD name VARCHAR(32) DEFAULT 'it''s'".to_string(),
            "ALTER TABLE t ADD rank SMALLINT DEFAULT 3".to_string(),
            r#"ALTER TABLE t ADD meta JSONB DEFAULT '{"a":1}'"#.to_string(),
            r"ALTER TABLE t ADD blob BYTEA DEFAULT '\xdead'".to_string(),
            "ALTER TABLE t ADD price NUMERIC(8, 2)".to_string(),
        ]
    );
}

#[tokio::test]
async fn primary_key_is_replaceable() {
    let mut client = client_with(RecordingConnection::new().with_table("t", &["a", "b"])).await;
    client.connection().clear_log();

    let mut t = client.schema("t").await.unwrap();
    t.primary(&["a"]).await.unwrap();
    t.primary(&["a", "b"]).await.unwrap();

    assert_eq!(
        client.connection().sql_log(),
        vec![
            "ALTER TABLE t DROP CONSTRAINT IF EXISTS t_pk".to_string(),
            "ALTER TABLE t ADD CONSTRAINT t_pk PRIMARY KEY (a)".to_string(),
            "ALTER TABLE t DROP CONSTRAINT IF EXISTS t_pk".to_string(),
            "ALTER TABLE t ADD CONSTRAINT t_pk PRIMARY KEY (a, b)".to_string(),
        ]
    );
}

#[tokio::test]
async fn empty_primary_key_is_rejected() {
    let mut client = client_with(RecordingConnection::new().with_table("t", &[])).await;
    client.connection().clear_log();

    let err = client
        .schema("t")
        .await
        .unwrap()
        .primary::<&str>(&[])
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DbError::Validation(_)));
    assert!(client.connection().statements().is_empty());
}

#[tokio::test]
async fn nullable_and_commit() {
    let mut client = client_with(RecordingConnection::new().with_table("t", &["note"])).await;
    client.connection().clear_log();

    client
        .schema("t")
        .await
        .unwrap()
        .nullable("note")
        .await
        .unwrap()
        .commit()
        .await
        .unwrap();

    assert_eq!(
        client.connection().sql_log(),
        vec![
            "ALTER TABLE t ALTER COLUMN note DROP NOT NULL".to_string(),
            "COMMIT".to_string(),
        ]
    );
}

#[tokio::test]
async fn quoted_names_keep_their_case() {
    let mut client = client_with(RecordingConnection::new()).await;
    client
        .schema("\"Audit\"")
        .await
        .unwrap()
        .text("\"Body\"", None)
        .await
        .unwrap();

    assert!(client.has_table("\"Audit\"").unwrap());
    assert!(!client.has_table("audit").unwrap());
    assert_eq!(
        client.catalog().columns_of("Audit").unwrap(),
        ["Body".to_string()]
    );
}

#[tokio::test]
async fn failed_add_does_not_register() {
    let mut client = client_with(
        RecordingConnection::new()
            .with_table("t", &[])
            .fail_on("ADD broken"),
    )
    .await;

    let mut t = client.schema("t").await.unwrap();
    assert!(t.add_column("broken", "NOPE", None).await.is_err());
    assert!(t.columns().is_empty());
}

#[tokio::test]
async fn invalid_column_name_sends_nothing() {
    let mut client = client_with(RecordingConnection::new().with_table("t", &[])).await;
    client.connection().clear_log();

    let mut t = client.schema("t").await.unwrap();
    assert!(t.text("x; DROP TABLE t", None).await.is_err());
    assert!(client.connection().statements().is_empty());
}
