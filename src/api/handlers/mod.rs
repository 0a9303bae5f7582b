// Copyright (c) DVB Team
// SPDX-License-Identifier: Apache-2.0

pub mod health;
pub mod indexer;
pub mod listings;
pub mod metrics;
pub mod profiles;
