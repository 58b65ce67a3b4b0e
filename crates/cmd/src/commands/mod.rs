// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod history;
pub mod query;
pub mod run;

pub use history::{history_command, snapshots_command};
pub use query::query_command;
pub use run::run_command;
