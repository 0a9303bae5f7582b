// Copyright (c) DVB Team
// SPDX-License-Identifier: Apache-2.0

mod source;

pub use source::{
    ChainEvent, EventFilter, EventId, EventPage, EventSource, RpcEventSource, SourceError,
};
