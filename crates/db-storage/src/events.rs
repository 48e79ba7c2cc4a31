// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the event specific database structs and queries
//!
//! An event's `lat_bucket`/`long_bucket` columns are derived from its stored
//! coordinates via [`crate::geo::bucket`]. They are computed on insert and
//! recomputed by every coordinate update, never written independently.

use super::schema::{enrollments, events, group_memberships};
use super::users::{User, UserId};
use crate::geo;
use crate::groups::GroupId;
use chrono::{DateTime, Utc};
use database::{DbConnection, Result};
use diesel::{
    Associations, BoolExpressionMethods, Connection, ExpressionMethods, Identifiable, Insertable,
    JoinOnDsl, NullableExpressionMethods, QueryDsl, Queryable, RunQueryDsl,
};

diesel_newtype! {
    #[derive(Copy)] EventId(uuid::Uuid) => diesel::sql_types::Uuid,
    #[derive(Copy)] SerialEventId(i64) => diesel::sql_types::BigInt
}

impl EventId {
    pub fn generate() -> Self {
        Self::from(uuid::Uuid::new_v4())
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations)]
#[diesel(table_name = events)]
#[diesel(belongs_to(User, foreign_key = created_by))]
pub struct Event {
    pub id: EventId,
    pub id_serial: SerialEventId,
    pub title: String,
    pub description: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,

    /// Group hosting the event, `None` for events hosted by the creator alone
    pub host_group: Option<GroupId>,

    /// Public events are discoverable by proximity, independent of membership
    pub is_public: bool,

    pub starts_at: DateTime<Utc>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,

    /// Derived bucket key of `latitude`
    pub lat_bucket: i32,

    /// Derived bucket key of `longitude`
    pub long_bucket: i32,

    /// Free-text tag tokens, matched case-insensitively by the relevance filter
    pub tags: String,

    /// Maximum number of enrollments, `<= 0` means unlimited
    pub capacity: i32,
}

impl Event {
    #[tracing::instrument(err, skip_all)]
    pub fn get(conn: &mut DbConnection, event_id: EventId) -> Result<Event> {
        let event = events::table.filter(events::id.eq(event_id)).first(conn)?;

        Ok(event)
    }

    /// Returns all future events hosted by groups the user has an accepted
    /// membership in, ordered by start time.
    #[tracing::instrument(err, skip_all)]
    pub fn get_upcoming_for_user_groups(
        conn: &mut DbConnection,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let query = events::table
            .inner_join(
                group_memberships::table
                    .on(group_memberships::group_id.nullable().eq(events::host_group)),
            )
            .filter(
                group_memberships::user_id
                    .eq(user_id)
                    .and(group_memberships::pending.eq(false)),
            )
            .filter(events::starts_at.ge(now))
            .select(events::all_columns)
            .order_by(events::starts_at.asc());

        let events = query.load(conn)?;

        Ok(events)
    }

    /// Returns all future public events whose bucket keys fall into the given
    /// bucket neighborhoods.
    ///
    /// This is the coarse candidate set; exact radius and relevance filtering
    /// happen downstream on the loaded rows.
    #[tracing::instrument(err, skip_all)]
    pub fn get_upcoming_public_in_buckets(
        conn: &mut DbConnection,
        lat_buckets: &[i32],
        long_buckets: &[i32],
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let query = events::table
            .filter(events::is_public.eq(true))
            .filter(events::lat_bucket.eq_any(lat_buckets))
            .filter(events::long_bucket.eq_any(long_buckets))
            .filter(events::starts_at.ge(now))
            .order_by(events::starts_at.asc());

        let events = query.load(conn)?;

        Ok(events)
    }

    /// Deletes the event and all enrollments referencing it.
    ///
    /// Runs as a single transaction so enrollment rows can never outlive their
    /// event. Returns false if no event with the given id existed.
    #[tracing::instrument(err, skip_all)]
    pub fn delete_by_id(conn: &mut DbConnection, event_id: EventId) -> Result<bool> {
        conn.transaction(|conn| {
            diesel::delete(enrollments::table)
                .filter(enrollments::event_id.eq(event_id))
                .execute(conn)?;

            let deleted = diesel::delete(events::table)
                .filter(events::id.eq(event_id))
                .execute(conn)?;

            Ok(deleted > 0)
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub created_by: UserId,
    pub host_group: Option<GroupId>,
    pub is_public: bool,
    pub starts_at: DateTime<Utc>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub tags: String,
    pub capacity: i32,
}

impl NewEvent {
    #[tracing::instrument(err, skip_all)]
    pub fn insert(self, conn: &mut DbConnection) -> Result<Event> {
        let lat_bucket = geo::bucket(self.latitude);
        let long_bucket = geo::bucket(self.longitude);

        let query = diesel::insert_into(events::table).values((
            self,
            events::lat_bucket.eq(lat_bucket),
            events::long_bucket.eq(long_bucket),
        ));

        let event = query.get_result(conn)?;

        Ok(event)
    }
}

/// Diesel event struct for updates
///
/// None fields will be ignored on update queries. The bucket fields are
/// private and only writable through [`UpdateEvent::with_latitude`] and
/// [`UpdateEvent::with_longitude`], keeping them in lockstep with the
/// coordinates.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = events)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub host_group: Option<Option<GroupId>>,
    pub is_public: Option<bool>,
    pub starts_at: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub tags: Option<String>,
    pub capacity: Option<i32>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    lat_bucket: Option<i32>,
    long_bucket: Option<i32>,
}

impl UpdateEvent {
    pub fn with_latitude(mut self, latitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.lat_bucket = Some(geo::bucket(latitude));
        self
    }

    pub fn with_longitude(mut self, longitude: f64) -> Self {
        self.longitude = Some(longitude);
        self.long_bucket = Some(geo::bucket(longitude));
        self
    }

    #[tracing::instrument(err, skip_all)]
    pub fn apply(self, conn: &mut DbConnection, event_id: EventId) -> Result<Event> {
        let query = diesel::update(events::table)
            .filter(events::id.eq(event_id))
            .set(self)
            .returning(events::all_columns);

        let event = query.get_result(conn)?;

        Ok(event)
    }
}
