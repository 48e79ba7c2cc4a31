// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! REST API v1
//!
//! Current Endpoints. See their respective function:
//! - `/events` ([POST](events::new_event))
//! - `/events/{event_id}` ([GET](events::get_event), [PATCH](events::patch_event), [DELETE](events::delete_event))
//! - `/events/{event_id}/enrollments` ([GET](events::enrollments::get_enrollments), [POST](events::enrollments::sign_up))
//! - `/events/{event_id}/enrollments/{user_id}` ([DELETE](events::enrollments::withdraw))
//! - `/users/{user_id}/feed` ([GET](events::feed::get_feed))

pub use response::{ApiResponse, DefaultApiResult};

pub mod events;
pub mod response;
mod util;
