use yuju::diagnose::{classify, classify_error, ErrorCategory, ErrorContext};
use yuju::engine::{Engine, EngineError, SqliteEngine};

fn setup() -> SqliteEngine {
    let engine = SqliteEngine::open_in_memory().expect("db");
    engine
        .execute("CREATE TABLE account (id INTEGER PRIMARY KEY, email TEXT UNIQUE)")
        .expect("create");
    engine.execute("INSERT INTO account VALUES (1, 'a@example.com')").expect("insert");
    engine
}

fn failure(engine: &SqliteEngine, sql: &str) -> EngineError {
    engine.execute(sql).expect_err("statement should fail")
}

#[test]
fn missing_table_from_plain_text() {
    let engine = setup();
    let error = EngineError::new("no such table: foo");
    let category = classify(&error, &ErrorContext::statement("SELECT * FROM foo"), &engine);
    assert_eq!(category, ErrorCategory::MissingTable("foo".to_string()));
}

#[test]
fn missing_table_from_engine() {
    let engine = setup();
    let sql = "SELECT * FROM ghosts";
    let error = failure(&engine, sql);
    let diagnosis = classify_error(&error, &ErrorContext::statement(sql), &engine);
    assert_eq!(diagnosis.category, ErrorCategory::MissingTable("ghosts".to_string()));
    assert!(diagnosis.message.contains("ghosts"));
}

#[test]
fn syntax_error_names_the_token() {
    let engine = setup();
    let sql = "SELEC * FROM account";
    let error = failure(&engine, sql);
    let category = classify(&error, &ErrorContext::statement(sql), &engine);
    assert_eq!(category, ErrorCategory::SyntaxNearToken("\"SELEC\"".to_string()));
}

#[test]
fn statement_text_does_not_steer_classification() {
    let engine = setup();
    let sql = "SELECT * FROM account WHERE nope = 'near me'";
    let error = failure(&engine, sql);
    assert_eq!(error.message, "no such column: nope");
    let category = classify(&error, &ErrorContext::statement(sql), &engine);
    assert_eq!(category, ErrorCategory::Unrecognized("no such column: nope".to_string()));

    let sql = "SELECT 'no such table: x' FROM ghosts";
    let error = failure(&engine, sql);
    let category = classify(&error, &ErrorContext::statement(sql), &engine);
    assert_eq!(category, ErrorCategory::MissingTable("ghosts".to_string()));
}

#[test]
fn duplicate_key_names_the_conflicting_column() {
    let engine = setup();
    let sql = "INSERT INTO account VALUES (2, 'a@example.com')";
    let error = failure(&engine, sql);
    let context = ErrorContext::statement(sql).with_table("account");
    let category = classify(&error, &context, &engine);
    assert_eq!(category, ErrorCategory::DuplicateKey(Some("email".to_string())));

    let sql = "INSERT INTO account VALUES (1, 'b@example.com')";
    let error = failure(&engine, sql);
    let category = classify(&error, &ErrorContext::statement(sql).with_table("account"), &engine);
    assert_eq!(category, ErrorCategory::DuplicateKey(Some("id".to_string())));
}

#[test]
fn duplicate_key_falls_back_to_primary_key_lookup() {
    let engine = setup();
    let error = EngineError::new("UNIQUE constraint failed");
    let context = ErrorContext::statement("INSERT ...").with_table("account");
    assert_eq!(classify(&error, &context, &engine), ErrorCategory::DuplicateKey(Some("id".to_string())));
    let context = ErrorContext::statement("INSERT ...");
    assert_eq!(classify(&error, &context, &engine), ErrorCategory::DuplicateKey(None));
}

#[test]
fn anything_else_is_surfaced_verbatim() {
    let engine = setup();
    let error = EngineError::new("disk I/O error");
    let diagnosis = classify_error(&error, &ErrorContext::statement("SELECT 1"), &engine);
    assert_eq!(diagnosis.category, ErrorCategory::Unrecognized("disk I/O error".to_string()));
    assert!(diagnosis.message.contains("disk I/O error"));
}
