// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Enrollment endpoints
//!
//! Sign-up delegates to the capacity-bounded admission query; the two
//! business rejections surface as 409 responses with distinct error codes.
use super::super::response::NoContent;
use crate::api::v1::response::ApiError;
use crate::api::v1::{ApiResponse, DefaultApiResult};
use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post};
use chrono::{DateTime, Utc};
use database::Db;
use db_storage::enrollments::{AdmissionOutcome, Enrollment, NewEnrollment};
use db_storage::events::{Event, EventId};
use db_storage::users::{User, UserId};
use serde::{Deserialize, Serialize};

/// API representation of an enrollment
#[derive(Debug, Serialize)]
pub struct EnrollmentResource {
    pub user_id: UserId,
    pub event_id: EventId,
    pub created_at: DateTime<Utc>,
}

impl From<Enrollment> for EnrollmentResource {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            user_id: enrollment.user_id,
            event_id: enrollment.event_id,
            created_at: enrollment.created_at,
        }
    }
}

/// An enrolled user as returned by the enrollment listing
#[derive(Debug, Serialize)]
pub struct EnrolledUserResource {
    pub user_id: UserId,
    pub display_name: String,
    pub enrolled_at: DateTime<Utc>,
}

/// Body of a POST /events/{event_id}/enrollments request
#[derive(Debug, Deserialize)]
pub struct PostEnrollmentBody {
    pub user_id: UserId,
}

/// API Endpoint `POST /events/{event_id}/enrollments`
///
/// Tries to enroll the user into the event. Responds with 201 on admission,
/// 409 `already_enrolled` for a duplicate sign-up and 409 `capacity_exceeded`
/// when the event is full. An unknown event yields a 404.
#[post("/events/{event_id}/enrollments")]
pub async fn sign_up(
    db: Data<Db>,
    event_id: Path<EventId>,
    body: Json<PostEnrollmentBody>,
) -> DefaultApiResult<EnrollmentResource> {
    let event_id = event_id.into_inner();
    let user_id = body.into_inner().user_id;

    let outcome = crate::block(move || {
        let mut conn = db.get_conn()?;

        NewEnrollment { user_id, event_id }.try_admit(&mut conn)
    })
    .await??;

    match outcome {
        AdmissionOutcome::Admitted(enrollment) => {
            Ok(ApiResponse::new(EnrollmentResource::from(enrollment)).created())
        }
        AdmissionOutcome::AlreadyEnrolled => Err(ApiError::conflict()
            .with_code("already_enrolled")
            .with_message("The user is already enrolled for this event")),
        AdmissionOutcome::CapacityExceeded => Err(ApiError::conflict()
            .with_code("capacity_exceeded")
            .with_message("The event has reached its enrollment capacity")),
    }
}

/// API Endpoint `GET /events/{event_id}/enrollments`
///
/// Lists the enrolled users in sign-up order.
#[get("/events/{event_id}/enrollments")]
pub async fn get_enrollments(
    db: Data<Db>,
    event_id: Path<EventId>,
) -> DefaultApiResult<Vec<EnrolledUserResource>> {
    let event_id = event_id.into_inner();

    let enrollments = crate::block(move || -> database::Result<Vec<(Enrollment, User)>> {
        let mut conn = db.get_conn()?;

        // 404 for unknown events instead of an empty list
        Event::get(&mut conn, event_id)?;

        Enrollment::get_with_users_for_event(&mut conn, event_id)
    })
    .await??;

    let enrolled = enrollments
        .into_iter()
        .map(|(enrollment, user)| EnrolledUserResource {
            user_id: user.id,
            display_name: user.display_name,
            enrolled_at: enrollment.created_at,
        })
        .collect();

    Ok(ApiResponse::new(enrolled))
}

/// API Endpoint `DELETE /events/{event_id}/enrollments/{user_id}`
///
/// Withdraws the user from the event. Idempotent, responds 204 whether or
/// not an enrollment existed.
#[delete("/events/{event_id}/enrollments/{user_id}")]
pub async fn withdraw(
    db: Data<Db>,
    path: Path<(EventId, UserId)>,
) -> Result<NoContent, ApiError> {
    let (event_id, user_id) = path.into_inner();

    crate::block(move || {
        let mut conn = db.get_conn()?;

        Enrollment::delete_by_id(&mut conn, user_id, event_id)
    })
    .await??;

    Ok(NoContent)
}
