use rusqlite::Connection;
use staffreview_core::db::open_db_in_memory;
use staffreview_core::{
    EmployeeId, EmployeeRepository, RepoError, ReviewChanges, ReviewService,
    ReviewValidationError, SqliteEmployeeRepository, SqliteReviewRepository,
};
use std::rc::Rc;

fn seed_employee(conn: &Connection, name: &str) -> EmployeeId {
    SqliteEmployeeRepository::try_new(conn)
        .unwrap()
        .create(name, "Engineer", None)
        .unwrap()
        .id
}

fn service(conn: &Connection) -> ReviewService<SqliteReviewRepository<'_>> {
    let service = ReviewService::new(SqliteReviewRepository::try_new(conn).unwrap());
    service.prepare_schema().unwrap();
    service
}

#[test]
fn record_and_list_reviews_per_employee() {
    let conn = open_db_in_memory().unwrap();
    let ann = seed_employee(&conn, "Ann");
    let ben = seed_employee(&conn, "Ben");
    let service = service(&conn);

    service.record_review(2021, "ann 2021", ann).unwrap();
    service.record_review(2022, "ben 2022", ben).unwrap();
    service.record_review(2023, "ann 2023", ann).unwrap();

    let years: Vec<i64> = service
        .list_reviews(Some(ann))
        .unwrap()
        .iter()
        .map(|review| review.borrow().year())
        .collect();
    assert_eq!(years, vec![2021, 2023]);
    assert_eq!(service.list_reviews(None).unwrap().len(), 3);
}

#[test]
fn revise_review_applies_all_changes() {
    let conn = open_db_in_memory().unwrap();
    let ann = seed_employee(&conn, "Ann");
    let ben = seed_employee(&conn, "Ben");
    let service = service(&conn);

    let review = service.record_review(2021, "draft", ann).unwrap();
    let id = review.borrow().id().unwrap();

    let changes = ReviewChanges {
        year: Some(2022),
        summary: Some("final".to_string()),
        employee_id: Some(ben),
    };
    let revised = service.revise_review(id, &changes).unwrap();

    assert!(Rc::ptr_eq(&revised, &review));
    let stored: (i64, String, i64) = conn
        .query_row(
            "SELECT year, summary, employee_id FROM reviews WHERE id = ?1;",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(stored, (2022, "final".to_string(), ben));
}

#[test]
fn revise_review_with_invalid_change_touches_nothing() {
    let conn = open_db_in_memory().unwrap();
    let ann = seed_employee(&conn, "Ann");
    let service = service(&conn);

    let review = service.record_review(2021, "steady", ann).unwrap();
    let id = review.borrow().id().unwrap();

    let changes = ReviewChanges {
        year: Some(2030),
        summary: Some(String::new()),
        employee_id: None,
    };
    let err = service.revise_review(id, &changes).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ReviewValidationError::EmptySummary)
    ));
    assert_eq!(review.borrow().year(), 2021);
    assert_eq!(review.borrow().summary(), "steady");
}

#[test]
fn revise_and_remove_missing_review_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .revise_review(11, &ReviewChanges::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { table: "reviews", id: 11 }));

    let err = service.remove_review(11).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id: 11, .. }));
}

#[test]
fn remove_review_resets_id_and_reset_schema_empties_table() {
    let conn = open_db_in_memory().unwrap();
    let ann = seed_employee(&conn, "Ann");
    let service = service(&conn);

    let first = service.record_review(2021, "one", ann).unwrap();
    service.record_review(2022, "two", ann).unwrap();
    let first_id = first.borrow().id().unwrap();

    let removed = service.remove_review(first_id).unwrap();
    assert_eq!(removed.borrow().id(), None);
    assert!(service.get_review(first_id).unwrap().is_none());

    service.reset_schema().unwrap();
    assert!(service.list_reviews(None).unwrap().is_empty());
    assert_eq!(service.repository().cached_len(), 0);
}
