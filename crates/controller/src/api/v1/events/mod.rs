// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Event CRUD endpoints
use super::response::NoContent;
use super::util::deserialize_some;
use super::{ApiResponse, DefaultApiResult};
use crate::api::v1::response::ApiError;
use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, patch, post};
use chrono::{DateTime, Utc};
use database::{Db, DbConnection, OptionalExt};
use db_storage::events::{Event, EventId, NewEvent, UpdateEvent};
use db_storage::groups::{Group, GroupId};
use db_storage::users::UserId;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub mod enrollments;
pub mod feed;

/// API representation of an event
#[derive(Debug, Clone, Serialize)]
pub struct EventResource {
    pub id: EventId,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub host_group: Option<GroupId>,
    pub is_public: bool,
    pub starts_at: DateTime<Utc>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub tags: String,
    pub capacity: i32,
}

impl From<Event> for EventResource {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            created_by: event.created_by,
            created_at: event.created_at,
            title: event.title,
            description: event.description,
            host_group: event.host_group,
            is_public: event.is_public,
            starts_at: event.starts_at,
            address: event.address,
            latitude: event.latitude,
            longitude: event.longitude,
            tags: event.tags,
            capacity: event.capacity,
        }
    }
}

/// Body of a POST /events request
#[derive(Debug, Deserialize, Validate)]
pub struct PostEventsBody {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(max = 4096))]
    #[serde(default)]
    pub description: String,

    pub created_by: UserId,

    pub host_group: Option<GroupId>,

    #[serde(default)]
    pub is_public: bool,

    pub starts_at: DateTime<Utc>,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub address: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[serde(default)]
    pub tags: String,

    /// `<= 0` leaves the event uncapped
    #[serde(default)]
    pub capacity: i32,
}

/// Rejects a `host_group` reference that points to no existing group
fn ensure_host_group_exists(conn: &mut DbConnection, group_id: GroupId) -> Result<(), ApiError> {
    if Group::get(conn, group_id).optional()?.is_none() {
        return Err(ApiError::conflict()
            .with_code("unknown_host_group")
            .with_message("The referenced host group does not exist"));
    }

    Ok(())
}

/// API Endpoint `POST /events`
///
/// Creates a new event. The bucket keys are derived from the coordinates on
/// insert. Referencing an unknown user or group yields a 409.
#[post("/events")]
pub async fn new_event(
    db: Data<Db>,
    new_event: Json<PostEventsBody>,
) -> DefaultApiResult<EventResource> {
    let new_event = new_event.into_inner();

    new_event.validate()?;

    let event = crate::block(move || -> Result<Event, ApiError> {
        let mut conn = db.get_conn()?;

        if let Some(group_id) = new_event.host_group {
            ensure_host_group_exists(&mut conn, group_id)?;
        }

        let event = NewEvent {
            title: new_event.title,
            description: new_event.description,
            created_by: new_event.created_by,
            host_group: new_event.host_group,
            is_public: new_event.is_public,
            starts_at: new_event.starts_at,
            address: new_event.address,
            latitude: new_event.latitude,
            longitude: new_event.longitude,
            tags: new_event.tags,
            capacity: new_event.capacity,
        }
        .insert(&mut conn)?;

        Ok(event)
    })
    .await??;

    Ok(ApiResponse::new(EventResource::from(event)).created())
}

/// API Endpoint `GET /events/{event_id}`
#[get("/events/{event_id}")]
pub async fn get_event(
    db: Data<Db>,
    event_id: Path<EventId>,
) -> DefaultApiResult<EventResource> {
    let event_id = event_id.into_inner();

    let event = crate::block(move || {
        let mut conn = db.get_conn()?;

        Event::get(&mut conn, event_id)
    })
    .await??;

    Ok(ApiResponse::new(EventResource::from(event)))
}

/// Body of a PATCH /events/{event_id} request
///
/// All fields are optional, only set fields are written. `host_group` is a
/// double option to distinguish an absent field from an explicit null.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PatchEventBody {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(max = 4096))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub host_group: Option<Option<GroupId>>,

    pub is_public: Option<bool>,

    pub starts_at: Option<DateTime<Utc>>,

    #[validate(length(max = 255))]
    pub address: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub tags: Option<String>,

    pub capacity: Option<i32>,
}

impl PatchEventBody {
    fn is_empty(&self) -> bool {
        let PatchEventBody {
            title,
            description,
            host_group,
            is_public,
            starts_at,
            address,
            latitude,
            longitude,
            tags,
            capacity,
        } = self;

        title.is_none()
            && description.is_none()
            && host_group.is_none()
            && is_public.is_none()
            && starts_at.is_none()
            && address.is_none()
            && latitude.is_none()
            && longitude.is_none()
            && tags.is_none()
            && capacity.is_none()
    }
}

/// API Endpoint `PATCH /events/{event_id}`
///
/// Coordinate changes recompute the bucket keys atomically with the
/// coordinate write. An empty patch returns the unchanged event.
#[patch("/events/{event_id}")]
pub async fn patch_event(
    db: Data<Db>,
    event_id: Path<EventId>,
    patch: Json<PatchEventBody>,
) -> DefaultApiResult<EventResource> {
    let event_id = event_id.into_inner();
    let patch = patch.into_inner();

    patch.validate()?;

    let event = crate::block(move || -> Result<Event, ApiError> {
        let mut conn = db.get_conn()?;

        if patch.is_empty() {
            return Ok(Event::get(&mut conn, event_id)?);
        }

        if let Some(Some(group_id)) = patch.host_group {
            ensure_host_group_exists(&mut conn, group_id)?;
        }

        let mut update = UpdateEvent::default();
        update.title = patch.title;
        update.description = patch.description;
        update.host_group = patch.host_group;
        update.is_public = patch.is_public;
        update.starts_at = patch.starts_at;
        update.address = patch.address;
        update.tags = patch.tags;
        update.capacity = patch.capacity;

        if let Some(latitude) = patch.latitude {
            update = update.with_latitude(latitude);
        }

        if let Some(longitude) = patch.longitude {
            update = update.with_longitude(longitude);
        }

        Ok(update.apply(&mut conn, event_id)?)
    })
    .await??;

    Ok(ApiResponse::new(EventResource::from(event)))
}

/// API Endpoint `DELETE /events/{event_id}`
///
/// Deletes the event and all of its enrollments in one transaction.
#[delete("/events/{event_id}")]
pub async fn delete_event(db: Data<Db>, event_id: Path<EventId>) -> Result<NoContent, ApiError> {
    let event_id = event_id.into_inner();

    let deleted = crate::block(move || {
        let mut conn = db.get_conn()?;

        Event::delete_by_id(&mut conn, event_id)
    })
    .await??;

    if !deleted {
        return Err(ApiError::not_found());
    }

    Ok(NoContent)
}
