// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Gather REST API
pub mod v1;
