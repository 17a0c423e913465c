//! Dashboard statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, repository::Repository};

/// Dashboard statistics payload
#[derive(Serialize, ToSchema)]
pub struct Stats {
    /// Total number of books in the catalog
    pub total_books: i64,
    /// Total number of registered users
    pub total_users: i64,
    /// Loans currently out
    pub active_loans: i64,
    /// Most-borrowed books
    pub popular_books: Vec<PopularBook>,
}

#[derive(Serialize, ToSchema)]
pub struct PopularBook {
    pub book_id: i32,
    pub title: String,
    pub borrow_count: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Aggregate counts for the dashboard
    pub async fn get_stats(&self) -> AppResult<Stats> {
        let total_books = self.repository.books.count().await?;
        let total_users = self.repository.users.count().await?;
        let active_loans = self.repository.loans.count_active().await?;
        let popular_books = self
            .repository
            .loans
            .popular_books(5)
            .await?
            .into_iter()
            .map(|(book_id, title, borrow_count)| PopularBook {
                book_id,
                title,
                borrow_count,
            })
            .collect();

        Ok(Stats {
            total_books,
            total_users,
            active_loans,
            popular_books,
        })
    }
}
