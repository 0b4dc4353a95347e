use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::schema::users;

/// Reads the `users` table. The table is created by this crate's migration as
/// a read model; rows are written by the account service during registration.
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for DieselUserRepository {
    fn registration_dates(&self) -> Result<Vec<DateTime<Utc>>, DomainError> {
        let mut conn = self.pool.get()?;
        let dates = users::table
            .select(users::created_at)
            .order(users::created_at.asc())
            .load::<DateTime<Utc>>(&mut conn)?;
        Ok(dates)
    }
}
