//! Loan workflow endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, LoanDetails, LoanQuery, LoanRecord},
};

use super::AuthenticatedUser;

/// List loans joined with book and borrower details, newest first.
/// Non-admin users only see their own loans.
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Loan records", body = Vec<LoanDetails>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let user_id = if claims.is_admin() {
        query.user_id
    } else {
        // Non-admins are always scoped to their own ledger
        Some(claims.user_id)
    };

    let loans = state.services.loans.list_loans(user_id).await?;
    Ok(Json(loans))
}

/// Borrow a book. Fails when no copies remain; the stock decrement and the
/// ledger insert commit atomically.
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanRecord),
        (status = 404, description = "Book or user not found"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanRecord>)> {
    // A plain user can only borrow for themselves; an admin can check a
    // book out to any patron.
    let user_id = if claims.is_admin() {
        request.user_id
    } else {
        claims.user_id
    };

    let loan = state.services.loans.create_loan(request.book_id, user_id).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan returned", body = LoanRecord),
        (status = 403, description = "Not the borrower or an administrator"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan is not in borrowed state")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanRecord>> {
    let loan = state.services.loans.return_loan(loan_id, &claims).await?;
    Ok(Json(loan))
}

/// Renew a loan, extending the due date by 14 days (at most twice)
#[utoipa::path(
    post,
    path = "/loans/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan renewed", body = LoanRecord),
        (status = 403, description = "Not the borrower or an administrator"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Not borrowed or renewal limit reached")
    )
)]
pub async fn renew_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanRecord>> {
    let loan = state.services.loans.renew_loan(loan_id, &claims).await?;
    Ok(Json(loan))
}
