use voucher_core::db::migrations::latest_version;
use voucher_core::db::open_db_in_memory;
use voucher_core::{Customer, CustomerPool, CustomerRepository, RepoError, SqliteCustomerRepository};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn insert_and_find_roundtrip_preserves_every_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let customer = Customer::with_id(Uuid::new_v4(), "test", "test@gmail.com", true);
    repo.insert(&customer).unwrap();

    let loaded = repo.find_by_id(customer.customer_id).unwrap().unwrap();
    assert_eq!(loaded, customer);
}

#[test]
fn customer_id_is_stored_as_sixteen_bytes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let customer = Customer::new("bytes", "bytes@example.com");
    repo.insert(&customer).unwrap();

    let (length, raw): (i64, Vec<u8>) = conn
        .query_row(
            "SELECT length(customer_id), customer_id FROM customers;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(length, 16);
    assert_eq!(raw, customer.customer_id.as_bytes().to_vec());
}

#[test]
fn duplicate_id_returns_already_exists_and_keeps_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let id = Uuid::new_v4();
    let first = Customer::with_id(id, "test", "test@gmail.com", false);
    let second = Customer::with_id(id, "test2", "test2@gmail.com", true);

    repo.insert(&first).unwrap();
    let err = repo.insert(&second).unwrap_err();

    assert!(matches!(err, RepoError::AlreadyExists(existing) if existing == id));
    assert_eq!(repo.find_by_id(id).unwrap(), Some(first));
}

#[test]
fn find_by_id_miss_is_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    assert_eq!(repo.find_by_id(Uuid::new_v4()).unwrap(), None);
}

#[test]
fn update_changes_mutable_fields_but_not_created_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let mut customer = Customer::new("draft", "draft@example.com");
    repo.insert(&customer).unwrap();
    let original_created_at = customer.created_at;

    customer.name = "final".to_string();
    customer.email = "final@example.com".to_string();
    customer.block();
    customer.created_at = original_created_at - chrono::Duration::days(30);
    repo.update(&customer).unwrap();

    let loaded = repo.find_by_id(customer.customer_id).unwrap().unwrap();
    assert_eq!(loaded.name, "final");
    assert_eq!(loaded.email, "final@example.com");
    assert!(loaded.is_blocked);
    assert_eq!(loaded.created_at, original_created_at);
}

#[test]
fn update_and_delete_of_missing_id_fail_without_touching_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let stored = Customer::new("kept", "kept@example.com");
    repo.insert(&stored).unwrap();
    let missing = Customer::new("ghost", "ghost@example.com");

    let update_err = repo.update(&missing).unwrap_err();
    assert!(matches!(
        update_err,
        RepoError::UpdateFailed { id, affected: 0 } if id == missing.customer_id
    ));

    let delete_err = repo.delete(missing.customer_id).unwrap_err();
    assert!(matches!(
        delete_err,
        RepoError::DeleteFailed { id, affected: 0 } if id == missing.customer_id
    ));

    assert_eq!(repo.find_all().unwrap(), vec![stored]);
}

#[test]
fn delete_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let customer = Customer::new("gone", "gone@example.com");
    repo.insert(&customer).unwrap();
    repo.delete(customer.customer_id).unwrap();

    assert_eq!(repo.find_by_id(customer.customer_id).unwrap(), None);
}

#[test]
fn find_all_on_empty_storage_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    assert!(repo.find_all().unwrap().is_empty());
    assert!(repo.find_all_in_pool(CustomerPool::Blocked).unwrap().is_empty());
}

#[test]
fn find_by_name_and_email() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let alice = Customer::new("alice", "alice@example.com");
    let bob = Customer::new("bob", "bob@example.com");
    repo.insert(&alice).unwrap();
    repo.insert(&bob).unwrap();

    assert_eq!(repo.find_by_name("alice").unwrap(), Some(alice));
    assert_eq!(repo.find_by_email("bob@example.com").unwrap(), Some(bob));
    assert_eq!(repo.find_by_email("carol@example.com").unwrap(), None);
}

#[test]
fn find_all_in_pool_splits_by_blocked_flag() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let normal = Customer::new("normal", "normal@example.com");
    let mut blocked = Customer::new("blocked", "blocked@example.com");
    blocked.block();
    repo.insert(&normal).unwrap();
    repo.insert(&blocked).unwrap();

    assert_eq!(
        repo.find_all_in_pool(CustomerPool::Normal).unwrap(),
        vec![normal]
    );
    assert_eq!(
        repo.find_all_in_pool(CustomerPool::Blocked).unwrap(),
        vec![blocked]
    );
    assert_eq!(repo.find_all().unwrap().len(), 2);
}

#[test]
fn delete_all_reports_removed_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    repo.insert(&Customer::new("a", "a@example.com")).unwrap();
    repo.insert(&Customer::new("b", "b@example.com")).unwrap();

    assert_eq!(repo.delete_all().unwrap(), 2);
    assert_eq!(repo.delete_all().unwrap(), 0);
}

#[test]
fn corrupted_id_column_is_reported_as_codec_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;").unwrap();
    conn.execute(
        "INSERT INTO customers (customer_id, name, email, created_at, is_blocked)
         VALUES (X'0102', 'short', 'short@example.com', '2024-01-01T00:00:00', 0);",
        [],
    )
    .unwrap();

    let err = repo.find_all().unwrap_err();
    assert!(matches!(err, RepoError::Codec(_)), "unexpected error: {err}");
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteCustomerRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_customers_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteCustomerRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("customers"))
    ));
}
