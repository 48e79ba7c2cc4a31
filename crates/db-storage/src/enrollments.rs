// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Enrollment structs and the capacity-bounded admission query
//!
//! Sign-up is the one correctness-critical concurrency point of the engine: a
//! naive count-then-insert can overbook an event when two requests race. The
//! admission query therefore locks the event row (`SELECT ... FOR UPDATE`)
//! before counting, which serializes concurrent sign-ups for the same event.
//! The composite primary key on `(user_id, event_id)` backstops the
//! one-enrollment-per-user invariant.

use super::schema::{enrollments, events, users};
use super::users::{User, UserId};
use crate::events::{Event, EventId};
use chrono::{DateTime, Utc};
use database::{DbConnection, Result};
use diesel::{
    Associations, BoolExpressionMethods, Connection, ExpressionMethods, Identifiable, Insertable,
    JoinOnDsl, OptionalExtension, QueryDsl, Queryable, RunQueryDsl,
};

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations)]
#[diesel(table_name = enrollments)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(belongs_to(Event, foreign_key = event_id))]
#[diesel(primary_key(user_id, event_id))]
pub struct Enrollment {
    pub user_id: UserId,
    pub event_id: EventId,
    pub created_at: DateTime<Utc>,
}

/// Outcome of an admission attempt
///
/// Business rejections are values, not errors; only store failures surface as
/// `Err`.
#[derive(Debug, PartialEq)]
pub enum AdmissionOutcome {
    Admitted(Enrollment),
    AlreadyEnrolled,
    CapacityExceeded,
}

impl Enrollment {
    #[tracing::instrument(err, skip_all)]
    pub fn count_for_event(conn: &mut DbConnection, event_id: EventId) -> Result<i64> {
        let count = enrollments::table
            .filter(enrollments::event_id.eq(event_id))
            .count()
            .get_result(conn)?;

        Ok(count)
    }

    #[tracing::instrument(err, skip_all)]
    pub fn get_with_users_for_event(
        conn: &mut DbConnection,
        event_id: EventId,
    ) -> Result<Vec<(Enrollment, User)>> {
        let query = enrollments::table
            .inner_join(users::table.on(enrollments::user_id.eq(users::id)))
            .filter(enrollments::event_id.eq(event_id))
            .order_by(enrollments::created_at.asc());

        let enrollments = query.load(conn)?;

        Ok(enrollments)
    }

    /// Deletes the enrollment of `user_id` for `event_id` if present.
    ///
    /// Withdrawal is idempotent; returns true if a row was deleted.
    #[tracing::instrument(err, skip_all)]
    pub fn delete_by_id(
        conn: &mut DbConnection,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<bool> {
        let lines_changed = diesel::delete(enrollments::table)
            .filter(
                enrollments::user_id
                    .eq(user_id)
                    .and(enrollments::event_id.eq(event_id)),
            )
            .execute(conn)?;

        Ok(lines_changed > 0)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = enrollments)]
pub struct NewEnrollment {
    pub user_id: UserId,
    pub event_id: EventId,
}

impl NewEnrollment {
    /// Tries to admit the user into the event.
    ///
    /// Locks the event row, checks the existing enrollment and the capacity,
    /// then inserts. The whole check-then-insert runs inside one transaction
    /// while holding the row lock, so two concurrent sign-ups for the same
    /// event cannot both observe `count < capacity`. The capacity is read from
    /// the locked event row, a capacity of `<= 0` admits unconditionally.
    ///
    /// Returns [`database::DatabaseError::NotFound`] when the event does not
    /// exist.
    #[tracing::instrument(err, skip_all)]
    pub fn try_admit(self, conn: &mut DbConnection) -> Result<AdmissionOutcome> {
        conn.transaction(|conn| {
            let event: Event = events::table
                .filter(events::id.eq(self.event_id))
                .for_update()
                .first(conn)?;

            let existing: Option<Enrollment> = enrollments::table
                .filter(
                    enrollments::user_id
                        .eq(self.user_id)
                        .and(enrollments::event_id.eq(self.event_id)),
                )
                .first(conn)
                .optional()?;

            if existing.is_some() {
                return Ok(AdmissionOutcome::AlreadyEnrolled);
            }

            if event.capacity > 0 {
                let enrolled: i64 = enrollments::table
                    .filter(enrollments::event_id.eq(self.event_id))
                    .count()
                    .get_result(conn)?;

                if enrolled >= i64::from(event.capacity) {
                    return Ok(AdmissionOutcome::CapacityExceeded);
                }
            }

            let enrollment = self.insert_into(enrollments::table).get_result(conn)?;

            Ok(AdmissionOutcome::Admitted(enrollment))
        })
    }
}
