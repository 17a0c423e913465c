//! Loans repository for database operations
//!
//! The create/return/renew operations run inside a single transaction and
//! use conditional UPDATEs as the only concurrency control: the row lock
//! taken by `UPDATE books SET stock = stock - 1 WHERE ... AND stock > 0`
//! guarantees that two borrows racing for the last copy cannot both
//! succeed.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::loan::{LoanDetails, LoanRecord, LoanStatus},
};

/// Loan duration and renewal extension, in days
const LOAN_PERIOD_DAYS: i32 = 14;

/// Maximum number of renewals per loan
const MAX_RENEWALS: i16 = 2;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<LoanRecord> {
        sqlx::query_as::<_, LoanRecord>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// List loans joined with book and borrower details, newest first
    pub async fn list(&self, user_id: Option<i32>) -> AppResult<Vec<LoanDetails>> {
        let mut query = String::from(
            r#"
            SELECT l.id, l.book_id, l.user_id,
                   b.title as book_title, b.author as book_author,
                   u.username as username,
                   l.borrow_date, l.due_date, l.return_date,
                   l.status, l.renewed_times,
                   (l.status = 'borrowed' AND l.due_date < NOW()) as is_overdue
            FROM loans l
            JOIN books b ON l.book_id = b.id
            JOIN users u ON l.user_id = u.id
            "#,
        );
        if user_id.is_some() {
            query.push_str(" WHERE l.user_id = $1");
        }
        query.push_str(" ORDER BY l.created_at DESC");

        let mut q = sqlx::query_as::<_, LoanDetails>(&query);
        if let Some(uid) = user_id {
            q = q.bind(uid);
        }

        let loans = q.fetch_all(&self.pool).await?;
        Ok(loans)
    }

    /// Create a new loan, decrementing the book's stock in the same
    /// transaction.
    ///
    /// The stock check and decrement are a single conditional UPDATE: a
    /// concurrent transaction cannot interleave between them, so stock
    /// never goes negative and the last copy is never lent twice.
    pub async fn create(&self, book_id: i32, user_id: i32) -> AppResult<LoanRecord> {
        let mut tx = self.pool.begin().await?;

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound(format!("User with id {} not found", user_id)));
        }

        let updated = sqlx::query("UPDATE books SET stock = stock - 1 WHERE id = $1 AND stock > 0")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            // Zero rows means either a missing book or an exhausted stock
            let book_exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(book_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !book_exists {
                return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
            }
            return Err(AppError::InsufficientStock(
                "No copies of this book are currently available".to_string(),
            ));
        }

        let loan = sqlx::query_as::<_, LoanRecord>(
            r#"
            INSERT INTO loans (book_id, user_id, borrow_date, due_date, status, renewed_times)
            VALUES ($1, $2, NOW(), NOW() + make_interval(days => $3), $4, 0)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(LOAN_PERIOD_DAYS)
        .bind(LoanStatus::Borrowed)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(loan_id = loan.id, book_id, user_id, "loan created");
        Ok(loan)
    }

    /// Return a loan, incrementing the book's stock in the same
    /// transaction. Only a borrowed loan can be returned; the operation is
    /// deliberately not idempotent.
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<LoanRecord> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, LoanRecord>(
            r#"
            UPDATE loans
            SET status = $1, return_date = NOW()
            WHERE id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(LoanStatus::Returned)
        .bind(loan_id)
        .bind(LoanStatus::Borrowed)
        .fetch_optional(&mut *tx)
        .await?;

        let loan = match loan {
            Some(loan) => loan,
            None => {
                // Zero rows means either a missing loan or one that is not
                // in borrowed state
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loans WHERE id = $1)")
                        .bind(loan_id)
                        .fetch_one(&mut *tx)
                        .await?;
                if exists {
                    return Err(AppError::InvalidState(
                        "Loan is not in borrowed state".to_string(),
                    ));
                }
                return Err(AppError::NotFound(format!("Loan with id {} not found", loan_id)));
            }
        };

        sqlx::query("UPDATE books SET stock = stock + 1 WHERE id = $1")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(loan_id, book_id = loan.book_id, "loan returned");
        Ok(loan)
    }

    /// Renew a loan, extending the due date by the loan period. Allowed
    /// only while the loan is borrowed and under the renewal cap; stock is
    /// untouched.
    pub async fn renew_loan(&self, loan_id: i32) -> AppResult<LoanRecord> {
        let loan = sqlx::query_as::<_, LoanRecord>(
            r#"
            UPDATE loans
            SET due_date = due_date + make_interval(days => $1),
                renewed_times = renewed_times + 1
            WHERE id = $2 AND status = $3 AND renewed_times < $4
            RETURNING *
            "#,
        )
        .bind(LOAN_PERIOD_DAYS)
        .bind(loan_id)
        .bind(LoanStatus::Borrowed)
        .bind(MAX_RENEWALS)
        .fetch_optional(&self.pool)
        .await?;

        match loan {
            Some(loan) => {
                tracing::info!(loan_id, renewed_times = loan.renewed_times, "loan renewed");
                Ok(loan)
            }
            None => {
                // Distinguish a missing loan, a non-borrowed loan, and a
                // loan at the renewal cap in the error detail.
                let existing = self.get_by_id(loan_id).await?;
                if existing.status != LoanStatus::Borrowed {
                    Err(AppError::InvalidState(
                        "Only borrowed loans can be renewed".to_string(),
                    ))
                } else {
                    Err(AppError::InvalidState(format!(
                        "Renewal limit reached ({}/{})",
                        existing.renewed_times, MAX_RENEWALS
                    )))
                }
            }
        }
    }

    /// Count loans currently out
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = $1")
            .bind(LoanStatus::Borrowed)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Most-borrowed books, by total number of loan records
    pub async fn popular_books(&self, limit: i64) -> AppResult<Vec<(i32, String, i64)>> {
        let rows: Vec<(i32, String, i64)> = sqlx::query_as(
            r#"
            SELECT b.id, b.title, COUNT(l.id) as borrow_count
            FROM books b
            LEFT JOIN loans l ON b.id = l.book_id
            GROUP BY b.id, b.title
            ORDER BY borrow_count DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
