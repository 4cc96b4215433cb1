use std::fs;

use scribe_db::{Catalog, DatabaseError, Selection, StoreConfig, Table, TableSchema, Value};
use tempfile::TempDir;

fn setup() -> (TempDir, Catalog) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let config = StoreConfig::new(tmp.path()).with_sync_writes(false);
    let catalog = Catalog::with_default_tables(&config).expect("Failed to open tables");
    (tmp, catalog)
}

#[test]
fn test_insert_and_select_employees() {
    let (_tmp, mut db) = setup();
    db.insert("employees", "1 Alice 30 70000 101").unwrap();
    db.insert("employees", "2 Bob 28 60000 102").unwrap();

    let employees = db
        .select("employees", &Selection::range(1, 2))
        .unwrap()
        .unwrap();
    assert_eq!(employees.len(), 2);
    assert_eq!(employees[0].get("name"), Some("Alice"));
    assert_eq!(employees[1].get("name"), Some("Bob"));

    assert!(matches!(
        db.insert("justtable", "1 asd 123"),
        Err(DatabaseError::TableNotFound(_))
    ));
}

#[test]
fn test_unique_department() {
    let (tmp, mut db) = setup();
    db.insert("departments", "101 HR").unwrap();
    let path = tmp.path().join("department_table.csv");
    let before = fs::read_to_string(&path).unwrap();

    let result = db.insert("departments", "101 HR");
    assert!(matches!(result, Err(DatabaseError::DuplicateKey { .. })));

    assert_eq!(db.get_table("departments").unwrap().len(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_unique_employee() {
    let (_tmp, mut db) = setup();
    db.insert("employees", "1 Alice 30 70000 101").unwrap();

    let result = db.insert("employees", "1 Alice 30 70000 101");
    assert!(matches!(result, Err(DatabaseError::DuplicateKey { .. })));
}

#[test]
fn test_select_goods_by_price() {
    let (_tmp, mut db) = setup();
    db.insert("goods", "1 Laptop 1200 101").unwrap();
    db.insert("goods", "2 Mouse 50 101").unwrap();
    db.insert("goods", "3 Keyboard 80 102").unwrap();

    let goods = db.select("goods", &Selection::range(60, 100)).unwrap().unwrap();
    assert_eq!(goods.len(), 1);
    assert_eq!(goods[0].get("name"), Some("Keyboard"));
}

#[test]
fn test_join_employees_with_departments() {
    let (_tmp, mut db) = setup();
    db.insert("departments", "101 HR").unwrap();
    db.insert("departments", "102 IT").unwrap();
    db.insert("employees", "1 Alice 30 70000 101").unwrap();
    db.insert("employees", "2 Bob 28 60000 102").unwrap();

    let employees = db.get_table("employees").unwrap();
    let departments = db.get_table("departments").unwrap();

    let result = db
        .join(&[employees, departments], &[("department_id", "id")])
        .unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].get("department_name"), Some("HR"));
    assert_eq!(result[1].get("department_name"), Some("IT"));

    let result = db.join(&[employees], &[("department_id", "id")]);
    assert!(matches!(result, Err(DatabaseError::InvalidArgument(_))));
}

#[test]
fn test_aggregate_goods() {
    let (_tmp, mut db) = setup();
    db.insert("goods", "100 Laptop 1500 20").unwrap();
    db.insert("goods", "200 Mouse 50 10").unwrap();
    db.insert("goods", "300 Keyboard 100 10").unwrap();

    assert_eq!(db.aggregate("goods", "count", "price").unwrap(), Value::Int64(3));
    assert_eq!(db.aggregate("goods", "avg", "price").unwrap(), Value::Float64(550.0));
    assert_eq!(db.aggregate("goods", "min", "price").unwrap(), Value::Int64(50));

    assert!(matches!(
        db.aggregate("justtable", "count", "price"),
        Err(DatabaseError::TableNotFound(_))
    ));
    assert!(matches!(
        db.aggregate("goods", "avg", "name"),
        Err(DatabaseError::NonNumericAggregation { .. })
    ));
}

#[test]
fn test_count_ignores_contents() {
    let (_tmp, mut db) = setup();
    db.insert("goods", "1 Laptop 1200 101").unwrap();
    db.insert("goods", "2 Mouse cheap 101").unwrap();

    assert_eq!(db.aggregate("goods", "count", "name").unwrap(), Value::Int64(2));
    assert_eq!(db.aggregate("goods", "count", "price").unwrap(), Value::Int64(2));
    assert_eq!(db.aggregate("goods", "count", "salary").unwrap(), Value::Int64(0));
}

#[test]
fn test_reopen_restores_every_table() {
    let tmp = TempDir::new().unwrap();
    let config = StoreConfig::new(tmp.path()).with_sync_writes(false);

    let mut db = Catalog::with_default_tables(&config).unwrap();
    db.insert("employees", "1 Alice 30 70000 101").unwrap();
    db.insert("employees", "2 Bob 28 60000 102").unwrap();
    db.insert("departments", "101 HR").unwrap();
    db.insert("goods", "1 Laptop 1200 101").unwrap();
    let employees_before = db.get_table("employees").unwrap().records().to_vec();
    drop(db);

    let mut db = Catalog::with_default_tables(&config).unwrap();
    assert_eq!(
        db.get_table("employees").unwrap().records(),
        employees_before.as_slice()
    );
    assert_eq!(db.get_table("departments").unwrap().len(), 1);
    assert_eq!(db.get_table("goods").unwrap().len(), 1);

    // Keys come back with the rows
    assert!(matches!(
        db.insert("departments", "101 Payroll"),
        Err(DatabaseError::DuplicateKey { .. })
    ));
}

#[test]
fn test_corrupt_file_fails_to_open() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("goods_table.csv"),
        "id,name,price,department_id\n1,Laptop,1200\n",
    )
    .unwrap();

    let result = Table::open(
        TableSchema::GOODS,
        tmp.path().join("goods_table.csv"),
        false,
    );
    assert!(matches!(result, Err(DatabaseError::Load { line: 2, .. })));

    let result = Catalog::with_default_tables(&StoreConfig::new(tmp.path()));
    assert!(matches!(result, Err(DatabaseError::Load { .. })));
}
