//! Loan workflow service
//!
//! Orchestrates borrow, return and renew. The repository performs each
//! operation as one transaction; this layer adds the ownership check: a
//! loan may only be returned or renewed by its borrower or by an admin.

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{LoanDetails, LoanRecord},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List loans, optionally restricted to one borrower
    pub async fn list_loans(&self, user_id: Option<i32>) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list(user_id).await
    }

    /// Borrow a book
    pub async fn create_loan(&self, book_id: i32, user_id: i32) -> AppResult<LoanRecord> {
        self.repository.loans.create(book_id, user_id).await
    }

    /// Return a borrowed book
    pub async fn return_loan(&self, loan_id: i32, actor: &UserClaims) -> AppResult<LoanRecord> {
        self.authorize(loan_id, actor).await?;
        self.repository.loans.return_loan(loan_id).await
    }

    /// Renew a loan, extending its due date
    pub async fn renew_loan(&self, loan_id: i32, actor: &UserClaims) -> AppResult<LoanRecord> {
        self.authorize(loan_id, actor).await?;
        self.repository.loans.renew_loan(loan_id).await
    }

    /// The acting user must own the loan or be an admin. Ownership cannot
    /// change after creation, so checking it outside the workflow
    /// transaction is safe.
    async fn authorize(&self, loan_id: i32, actor: &UserClaims) -> AppResult<()> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;
        if loan.user_id != actor.user_id && !actor.is_admin() {
            return Err(AppError::Authorization(
                "Only the borrower or an administrator can modify this loan".to_string(),
            ));
        }
        Ok(())
    }
}
