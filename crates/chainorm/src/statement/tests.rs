use super::*;
use crate::scan::{Many, Single};
use crate::test_support::{Account, Gadget, MockDriver, Reply, User, ts};
use chrono::NaiveDateTime;

fn inserted(id: u64) -> Reply {
    Reply::Exec(ExecResult {
        rows_affected: 1,
        last_insert_id: Some(id),
    })
}

fn updated(rows: u64) -> Reply {
    Reply::Exec(ExecResult {
        rows_affected: rows,
        last_insert_id: None,
    })
}

struct Harness {
    driver: MockDriver,
    config: DbConfig,
    log: ErrorLog,
}

impl Harness {
    fn new(driver: MockDriver) -> Self {
        Self {
            driver,
            config: DbConfig::default(),
            log: ErrorLog::new(),
        }
    }

    fn statement(
        &mut self,
        clauses: Vec<WhereClause>,
        orders: Vec<&str>,
    ) -> Statement<'_, MockDriver> {
        Statement::new(
            &self.driver,
            &self.config,
            &mut self.log,
            clauses,
            orders.into_iter().map(String::from).collect(),
        )
    }
}

#[tokio::test]
async fn create_writes_back_id_and_timestamps() {
    let mut h = Harness::new(MockDriver::new().reply(inserted(5)));
    let birthday = ts(2000, 10, 27);
    let mut user = User {
        name: "jinzhu".into(),
        age: 18,
        birthday,
        ..User::default()
    };

    let mut stmt = h.statement(Vec::new(), Vec::new());
    stmt.create(&mut user).await;
    assert!(!stmt.has_error());
    assert_eq!(
        stmt.sql(),
        "INSERT INTO users (age, birthday, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)"
    );
    assert_eq!(stmt.vars()[0], Value::I64(18));
    assert_eq!(stmt.vars()[2], Value::Text("jinzhu".into()));
    assert_eq!(stmt.vars()[3], stmt.vars()[4]);
    assert_eq!(stmt.result().map(|r| r.rows_affected), Some(1));

    assert_eq!(user.id, 5);
    assert_eq!(user.birthday, birthday);
    assert_ne!(user.created_at, NaiveDateTime::default());
    assert_eq!(user.created_at, user.updated_at);
    assert_eq!(Value::Timestamp(user.created_at), h.driver.calls()[0].1[3]);
}

#[tokio::test]
async fn create_keeps_caller_supplied_created_at() {
    let mut h = Harness::new(MockDriver::new().reply(inserted(1)));
    let created_at = ts(2005, 1, 1);
    let mut user = User {
        created_at,
        ..User::default()
    };

    h.statement(Vec::new(), Vec::new()).create(&mut user).await;
    assert_eq!(user.created_at, created_at);
    assert_ne!(user.updated_at, NaiveDateTime::default());
}

#[tokio::test]
async fn failed_create_leaves_record_untouched() {
    let mut h = Harness::new(MockDriver::new().reply(Reply::Fail("duplicate".into())));
    let mut user = User::default();

    let mut stmt = h.statement(Vec::new(), Vec::new());
    stmt.create(&mut user).await;
    assert_eq!(stmt.errors().len(), 1);
    drop(stmt);

    assert_eq!(user, User::default());
    assert_eq!(h.log.len(), 1);
}

#[tokio::test]
async fn missing_insert_id_is_an_error() {
    let mut h = Harness::new(MockDriver::new().reply(updated(1)));
    let mut user = User::default();

    h.statement(Vec::new(), Vec::new()).create(&mut user).await;
    assert_eq!(user.id, 0);
    assert!(matches!(h.log.last(), Some(OrmError::Other(_))));
}

#[tokio::test]
async fn narrow_keys_and_table_overrides() {
    let mut h = Harness::new(MockDriver::new().reply(inserted(3)));
    let mut account = Account {
        email: "a@b.c".into(),
        ..Account::default()
    };

    let mut stmt = h.statement(Vec::new(), Vec::new());
    stmt.create(&mut account).await;
    assert_eq!(stmt.sql(), "INSERT INTO member_accounts (email) VALUES (?)");
    assert_eq!(account.id, 3);
}

#[tokio::test]
async fn update_sets_every_column_and_targets_the_id() {
    let mut h = Harness::new(MockDriver::new().reply(updated(1)));
    let created_at = ts(2001, 1, 1);
    let mut user = User {
        id: 9,
        name: "jinzhu 2".into(),
        created_at,
        updated_at: created_at,
        ..User::default()
    };

    let mut stmt = h.statement(Vec::new(), Vec::new());
    stmt.update(&mut user).await;
    assert!(!stmt.has_error());
    assert_eq!(
        stmt.sql(),
        "UPDATE users SET age = ?, birthday = ?, name = ?, created_at = ?, updated_at = ? \
         WHERE (id = ?)"
    );
    assert_eq!(stmt.vars().last(), Some(&Value::I64(9)));
    assert_eq!(stmt.vars()[3], Value::Timestamp(created_at));

    assert_eq!(user.created_at, created_at);
    assert!(user.updated_at > created_at);
}

#[tokio::test]
async fn update_matching_no_rows_is_not_an_error() {
    let mut h = Harness::new(MockDriver::new().reply(updated(0)));
    let mut user = User {
        id: 404,
        ..User::default()
    };

    h.statement(Vec::new(), Vec::new()).update(&mut user).await;
    assert!(h.log.is_empty());
}

#[tokio::test]
async fn failed_update_keeps_old_timestamp() {
    let mut h = Harness::new(MockDriver::new().reply(Reply::Fail("gone".into())));
    let stamp = ts(2002, 2, 2);
    let mut user = User {
        id: 1,
        updated_at: stamp,
        ..User::default()
    };

    h.statement(Vec::new(), Vec::new()).update(&mut user).await;
    assert_eq!(user.updated_at, stamp);
    assert_eq!(h.log.len(), 1);
}

#[tokio::test]
async fn save_dispatches_on_primary_key() {
    let mut h = Harness::new(MockDriver::new().reply(inserted(1)).reply(updated(1)));
    let mut user = User::default();

    h.statement(Vec::new(), Vec::new()).save(&mut user).await;
    h.statement(Vec::new(), Vec::new()).save(&mut user).await;

    let sql = h.driver.sql();
    assert!(sql[0].starts_with("INSERT INTO users"));
    assert!(sql[1].starts_with("UPDATE users SET"));
    assert_eq!(h.driver.calls()[1].1.last(), Some(&Value::I64(1)));
}

#[tokio::test]
async fn delete_by_id_and_without_conditions() {
    let mut h = Harness::new(MockDriver::new());
    let user = User {
        id: 2,
        ..User::default()
    };

    h.statement(Vec::new(), Vec::new()).delete(&user).await;
    h.statement(Vec::new(), Vec::new()).delete(&User::default()).await;

    assert_eq!(
        h.driver.calls(),
        vec![
            ("DELETE FROM users WHERE (id = ?)".to_string(), vec![Value::I64(2)]),
            ("DELETE FROM users".to_string(), vec![]),
        ]
    );
}

#[tokio::test]
async fn primary_key_groups_the_other_conditions() {
    let mut h = Harness::new(MockDriver::new());
    let user = User {
        id: 7,
        ..User::default()
    };
    let clauses = vec![
        WhereClause::literal("name = ?", ("jinzhu",)),
        WhereClause::literal("age > ?", (10,)),
    ];

    h.statement(clauses, Vec::new()).delete(&user).await;
    assert_eq!(
        h.driver.calls()[0],
        (
            "DELETE FROM users WHERE (id = ?) AND ((name = ?) AND (age > ?))".to_string(),
            vec![Value::I64(7), Value::Text("jinzhu".into()), Value::I32(10)],
        )
    );
}

#[tokio::test]
async fn query_renders_order_and_limit() {
    let mut rows = RowSet::new(vec!["id".into(), "name".into()]);
    rows.push_row(vec![Value::I64(1), Value::Text("a".into())]);
    let mut h = Harness::new(MockDriver::new().reply(Reply::Rows(rows)));
    let mut user = User::default();

    let mut stmt = h.statement(Vec::new(), vec!["age desc", "name"]);
    stmt.limit(1);
    stmt.query(Single(&mut user), None).await;
    assert!(!stmt.has_error());
    assert_eq!(stmt.sql(), "SELECT * FROM users ORDER BY age desc, name LIMIT 1");
    assert_eq!(user.name, "a");
}

#[tokio::test]
async fn query_by_bound_record_id() {
    let mut h = Harness::new(MockDriver::new());
    let mut user = User {
        id: 3,
        ..User::default()
    };

    let mut stmt = h.statement(Vec::new(), Vec::new());
    stmt.query(Single(&mut user), None).await;
    assert_eq!(stmt.sql(), "SELECT * FROM users WHERE (id = ?)");
    assert!(stmt.errors()[0].is_not_found());
}

#[tokio::test]
async fn collection_query_ignores_element_ids() {
    let mut h = Harness::new(MockDriver::new());
    let mut users = vec![User {
        id: 3,
        ..User::default()
    }];

    let mut stmt = h.statement(vec![WhereClause::PrimaryKey(Value::I64(8))], Vec::new());
    stmt.query(Many(&mut users), None).await;
    assert!(!stmt.has_error());
    assert_eq!(stmt.sql(), "SELECT * FROM users WHERE (id = ?)");
    assert_eq!(stmt.vars(), &[Value::I64(8)]);
}

#[test]
fn list_arguments_expand() {
    let mut h = Harness::new(MockDriver::new());
    let mut stmt = h.statement(Vec::new(), Vec::new());

    let sql = stmt.bind_fragment(
        "id in (?) AND age > ?",
        &[Value::list([1i64, 2, 3]), Value::I64(5)],
    );
    assert_eq!(sql, "id in (?, ?, ?) AND age > ?");
    assert_eq!(
        stmt.vars(),
        &[Value::I64(1), Value::I64(2), Value::I64(3), Value::I64(5)]
    );
}

#[test]
fn empty_list_renders_null() {
    let mut h = Harness::new(MockDriver::new());
    let mut stmt = h.statement(Vec::new(), Vec::new());

    let sql = stmt.bind_fragment("id in (?)", &[Value::list(Vec::<i64>::new())]);
    assert_eq!(sql, "id in (NULL)");
    assert!(stmt.vars().is_empty());
}

#[test]
fn quoted_question_marks_are_not_placeholders() {
    let mut h = Harness::new(MockDriver::new());
    let mut stmt = h.statement(Vec::new(), Vec::new());

    let sql = stmt.bind_fragment("name <> 'who?' AND age = ?", &[Value::I64(1)]);
    assert_eq!(sql, "name <> 'who?' AND age = ?");
    assert_eq!(stmt.vars(), &[Value::I64(1)]);
}

#[test]
fn double_quoted_literals_do_not_hide_placeholders() {
    let mut h = Harness::new(MockDriver::new());
    let mut stmt = h.statement(Vec::new(), Vec::new());

    let sql = stmt.bind_fragment(
        "name <> \"O'Brien\" AND id in (?)",
        &[Value::list([1i64, 2])],
    );
    assert_eq!(sql, "name <> \"O'Brien\" AND id in (?, ?)");
    assert_eq!(stmt.vars(), &[Value::I64(1), Value::I64(2)]);
}

#[test]
fn escaped_quotes_stay_inside_the_literal() {
    let mut h = Harness::new(MockDriver::new());
    let mut stmt = h.statement(Vec::new(), Vec::new());

    let sql = stmt.bind_fragment(
        r"name <> 'it\'s ?' AND `odd?col` = ? AND id in (?)",
        &[Value::I64(3), Value::list([4i64, 5])],
    );
    assert_eq!(sql, r"name <> 'it\'s ?' AND `odd?col` = ? AND id in (?, ?)");
    assert_eq!(stmt.vars(), &[Value::I64(3), Value::I64(4), Value::I64(5)]);
}

#[test]
fn prepare_without_model_is_rejected() {
    let mut h = Harness::new(MockDriver::new());
    let mut stmt = h.statement(Vec::new(), Vec::new());

    assert!(matches!(stmt.prepare_query_sql(), Err(OrmError::ModelNotSet)));
    assert!(matches!(stmt.prepare_delete_sql(), Err(OrmError::ModelNotSet)));
}

#[tokio::test]
async fn create_table_rejects_non_integer_keys_before_the_driver() {
    let mut h = Harness::new(MockDriver::new());

    let mut stmt = h.statement(Vec::new(), Vec::new());
    stmt.create_table::<Gadget>().await;
    assert!(stmt.errors()[0].is_mapping_error());
    drop(stmt);

    assert!(h.driver.calls().is_empty());
}

#[tokio::test]
async fn create_table_for_narrow_key() {
    let mut h = Harness::new(MockDriver::new());

    h.statement(Vec::new(), Vec::new()).create_table::<Account>().await;
    assert_eq!(
        h.driver.sql(),
        vec![
            "CREATE TABLE member_accounts (id int NOT NULL AUTO_INCREMENT PRIMARY KEY, \
             email longtext)"
        ]
    );
}

#[tokio::test]
async fn exec_raw_passes_sql_through() {
    let mut h = Harness::new(MockDriver::new().reply(updated(4)));

    let mut stmt = h.statement(Vec::new(), Vec::new());
    stmt.exec_raw("UPDATE users SET age = age + 1").await;
    assert_eq!(stmt.result().map(|r| r.rows_affected), Some(4));
    assert!(stmt.vars().is_empty());
}
