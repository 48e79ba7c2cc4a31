// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Contains the database ORM and database migrations for the controller/storage
//! Builds upon gather-database

#[macro_use]
extern crate diesel;

#[macro_use]
mod macros;
mod schema;

pub mod enrollments;
pub mod events;
pub mod geo;
pub mod groups;
pub mod migrations;
pub mod users;
