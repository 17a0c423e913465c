//! Database tests for the loan workflow invariants.
//!
//! These run against a real Postgres via `#[sqlx::test]`, which provisions
//! an isolated database per test and applies `./migrations`. They are
//! ignored by default; run with a configured DATABASE_URL:
//! `cargo test -- --ignored`

use chrono::{Duration, Utc};
use sqlx::PgPool;

use bookstack_server::{
    error::AppError,
    models::{
        loan::LoanStatus,
        user::{Role, UserClaims},
    },
    repository::Repository,
    services::loans::LoansService,
};

async fn seed_book(repo: &Repository, isbn: &str, stock: i32) -> i32 {
    sqlx::query_scalar(
        r#"
        INSERT INTO books (title, author, isbn, publisher, publish_date, category, stock)
        VALUES ('The Test Book', 'A. Writer', $1, 'Test House', '2020-01-01', 'fiction', $2)
        RETURNING id
        "#,
    )
    .bind(isbn)
    .bind(stock)
    .fetch_one(&repo.pool)
    .await
    .expect("failed to seed book")
}

async fn seed_user(repo: &Repository, username: &str) -> i32 {
    repo.users
        .create(username, &format!("{}@example.org", username), "not-a-real-hash", Role::User)
        .await
        .expect("failed to seed user")
        .id
}

async fn stock_of(repo: &Repository, book_id: i32) -> i32 {
    repo.books.get_by_id(book_id).await.expect("book missing").stock
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn create_loan_decrements_stock_and_sets_due_date(pool: PgPool) {
    let repo = Repository::new(pool);
    let book_id = seed_book(&repo, "978-0-00-000001-1", 3).await;
    let user_id = seed_user(&repo, "alice").await;

    let loan = repo.loans.create(book_id, user_id).await.unwrap();

    assert_eq!(loan.status, LoanStatus::Borrowed);
    assert_eq!(loan.renewed_times, 0);
    assert!(loan.return_date.is_none());
    assert_eq!(stock_of(&repo, book_id).await, 2);

    // Due date is borrow date + 14 days
    let expected_due = loan.borrow_date + Duration::days(14);
    assert!((loan.due_date - expected_due).num_seconds().abs() < 5);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn create_loan_fails_on_missing_book_or_user(pool: PgPool) {
    let repo = Repository::new(pool);
    let book_id = seed_book(&repo, "978-0-00-000002-2", 1).await;
    let user_id = seed_user(&repo, "bob").await;

    assert!(matches!(
        repo.loans.create(9999, user_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        repo.loans.create(book_id, 9999).await,
        Err(AppError::NotFound(_))
    ));
    // Neither failure touched the stock or the ledger
    assert_eq!(stock_of(&repo, book_id).await, 1);
    assert!(repo.loans.list(None).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn create_loan_at_zero_stock_fails_without_mutation(pool: PgPool) {
    let repo = Repository::new(pool);
    let book_id = seed_book(&repo, "978-0-00-000003-3", 0).await;
    let user_id = seed_user(&repo, "carol").await;

    assert!(matches!(
        repo.loans.create(book_id, user_id).await,
        Err(AppError::InsufficientStock(_))
    ));
    assert_eq!(stock_of(&repo, book_id).await, 0);
    assert!(repo.loans.list(None).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn return_is_not_idempotent(pool: PgPool) {
    let repo = Repository::new(pool);
    let book_id = seed_book(&repo, "978-0-00-000004-4", 1).await;
    let user_id = seed_user(&repo, "dave").await;

    let loan = repo.loans.create(book_id, user_id).await.unwrap();
    assert_eq!(stock_of(&repo, book_id).await, 0);

    let returned = repo.loans.return_loan(loan.id).await.unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert!(returned.return_date.is_some());
    assert_eq!(stock_of(&repo, book_id).await, 1);

    // Second return fails and stock is incremented exactly once total
    assert!(matches!(
        repo.loans.return_loan(loan.id).await,
        Err(AppError::InvalidState(_))
    ));
    assert_eq!(stock_of(&repo, book_id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn renewals_cap_at_two_and_extend_by_fourteen_days(pool: PgPool) {
    let repo = Repository::new(pool);
    let book_id = seed_book(&repo, "978-0-00-000005-5", 1).await;
    let user_id = seed_user(&repo, "erin").await;

    let loan = repo.loans.create(book_id, user_id).await.unwrap();
    let original_due = loan.due_date;

    let first = repo.loans.renew_loan(loan.id).await.unwrap();
    assert_eq!(first.renewed_times, 1);
    assert!((first.due_date - (original_due + Duration::days(14))).num_seconds().abs() < 5);

    let second = repo.loans.renew_loan(loan.id).await.unwrap();
    assert_eq!(second.renewed_times, 2);
    assert!((second.due_date - (original_due + Duration::days(28))).num_seconds().abs() < 5);

    // Third renewal hits the cap
    assert!(matches!(
        repo.loans.renew_loan(loan.id).await,
        Err(AppError::InvalidState(_))
    ));

    // Renewals never touch stock
    assert_eq!(stock_of(&repo, book_id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn returned_loan_cannot_be_renewed(pool: PgPool) {
    let repo = Repository::new(pool);
    let book_id = seed_book(&repo, "978-0-00-000006-6", 1).await;
    let user_id = seed_user(&repo, "frank").await;

    let loan = repo.loans.create(book_id, user_id).await.unwrap();
    repo.loans.return_loan(loan.id).await.unwrap();

    assert!(matches!(
        repo.loans.renew_loan(loan.id).await,
        Err(AppError::InvalidState(_))
    ));
    assert!(matches!(
        repo.loans.renew_loan(9999).await,
        Err(AppError::NotFound(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn racing_borrows_never_oversell_the_last_copy(pool: PgPool) {
    let repo = Repository::new(pool);
    let book_id = seed_book(&repo, "978-0-00-000007-7", 1).await;
    let u1 = seed_user(&repo, "grace").await;
    let u2 = seed_user(&repo, "heidi").await;

    let r1 = repo.clone();
    let r2 = repo.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { r1.loans.create(book_id, u1).await }),
        tokio::spawn(async move { r2.loans.create(book_id, u2).await }),
    );
    let results = [a.unwrap(), b.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let stock_failures = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::InsufficientStock(_))))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(stock_failures, 1);
    assert_eq!(stock_of(&repo, book_id).await, 0);
    assert_eq!(repo.loans.list(None).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn borrow_renew_return_round_trip(pool: PgPool) {
    let repo = Repository::new(pool);
    let book_id = seed_book(&repo, "978-0-00-000008-8", 3).await;
    let user_id = seed_user(&repo, "ivan").await;

    let loan = repo.loans.create(book_id, user_id).await.unwrap();
    assert_eq!(stock_of(&repo, book_id).await, 2);

    let renewed = repo.loans.renew_loan(loan.id).await.unwrap();
    assert_eq!(renewed.renewed_times, 1);
    assert!(
        (renewed.due_date - (loan.borrow_date + Duration::days(28)))
            .num_seconds()
            .abs()
            < 5
    );

    let returned = repo.loans.return_loan(loan.id).await.unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(stock_of(&repo, book_id).await, 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn only_the_borrower_or_an_admin_can_return(pool: PgPool) {
    let repo = Repository::new(pool);
    let service = LoansService::new(repo.clone());
    let book_id = seed_book(&repo, "978-0-00-000011-2", 1).await;
    let owner = seed_user(&repo, "olivia").await;
    let stranger = seed_user(&repo, "peggy").await;

    let loan = service.create_loan(book_id, owner).await.unwrap();

    let claims = |user_id: i32, role: Role| UserClaims {
        sub: "test".to_string(),
        user_id,
        role,
        exp: chrono::Utc::now().timestamp() + 3600,
        iat: chrono::Utc::now().timestamp(),
    };

    // A different plain user is rejected and the loan is untouched
    assert!(matches!(
        service.return_loan(loan.id, &claims(stranger, Role::User)).await,
        Err(AppError::Authorization(_))
    ));
    assert_eq!(
        repo.loans.get_by_id(loan.id).await.unwrap().status,
        LoanStatus::Borrowed
    );
    assert_eq!(stock_of(&repo, book_id).await, 0);

    // An admin who is not the borrower may return it
    let returned = service
        .return_loan(loan.id, &claims(stranger, Role::Admin))
        .await
        .unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(stock_of(&repo, book_id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn loan_listing_joins_details_newest_first(pool: PgPool) {
    let repo = Repository::new(pool);
    let book_id = seed_book(&repo, "978-0-00-000009-9", 5).await;
    let u1 = seed_user(&repo, "judy").await;
    let u2 = seed_user(&repo, "mallory").await;

    let first = repo.loans.create(book_id, u1).await.unwrap();
    let second = repo.loans.create(book_id, u2).await.unwrap();

    let all = repo.loans.list(None).await.unwrap();
    assert_eq!(all.len(), 2);
    // Newest first
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[0].book_title, "The Test Book");
    assert_eq!(all[0].book_author, "A. Writer");
    assert_eq!(all[0].username, "mallory");
    assert!(!all[0].is_overdue);

    let only_u1 = repo.loans.list(Some(u1)).await.unwrap();
    assert_eq!(only_u1.len(), 1);
    assert_eq!(only_u1[0].id, first.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn overdue_is_derived_from_due_date(pool: PgPool) {
    let repo = Repository::new(pool);
    let book_id = seed_book(&repo, "978-0-00-000010-5", 1).await;
    let user_id = seed_user(&repo, "nina").await;

    let loan = repo.loans.create(book_id, user_id).await.unwrap();

    // Backdate the due date past now
    sqlx::query("UPDATE loans SET due_date = $1 WHERE id = $2")
        .bind(Utc::now() - Duration::days(1))
        .bind(loan.id)
        .execute(&repo.pool)
        .await
        .unwrap();

    let listed = repo.loans.list(Some(user_id)).await.unwrap();
    assert!(listed[0].is_overdue);
}
