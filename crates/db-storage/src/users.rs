// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the user specific database structs and queries

use super::schema::users;
use database::{DbConnection, Result};
use diesel::{ExpressionMethods, Identifiable, Insertable, QueryDsl, Queryable, RunQueryDsl};

diesel_newtype! {
    #[derive(Copy)] UserId(uuid::Uuid) => diesel::sql_types::Uuid,
    #[derive(Copy)] SerialUserId(i64) => diesel::sql_types::BigInt
}

impl UserId {
    pub fn generate() -> Self {
        Self::from(uuid::Uuid::new_v4())
    }
}

/// Diesel user struct
///
/// Is used as a result in various queries. Represents a user column
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: UserId,
    pub id_serial: SerialUserId,
    pub email: String,
    pub display_name: String,
    /// Ordered lowercase preference tokens, empty means no tag filtering
    pub tag_prefs: Vec<String>,
    /// Preferred search radius in miles, `None` or `<= 0` means unlimited
    pub search_radius: Option<f64>,
}

impl User {
    #[tracing::instrument(err, skip_all)]
    pub fn get(conn: &mut DbConnection, user_id: UserId) -> Result<User> {
        let user = users::table.filter(users::id.eq(user_id)).first(conn)?;

        Ok(user)
    }
}

/// Diesel insertable user struct
///
/// Represents fields that have to be provided on user insertion.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub tag_prefs: Vec<String>,
    pub search_radius: Option<f64>,
}

impl NewUser {
    #[tracing::instrument(err, skip_all)]
    pub fn insert(self, conn: &mut DbConnection) -> Result<User> {
        let user = self.insert_into(users::table).get_result(conn)?;

        Ok(user)
    }
}
