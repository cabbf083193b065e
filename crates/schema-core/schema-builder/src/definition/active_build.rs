// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::cell::Cell;

use crate::error::SchemaBuildingError;

thread_local! {
    static ACTIVE_BUILD: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running a declaration block or build until dropped.
#[derive(Debug)]
pub(crate) struct ActiveBuildGuard {
    _private: (),
}

impl ActiveBuildGuard {
    pub(crate) fn acquire() -> Result<Self, SchemaBuildingError> {
        if ACTIVE_BUILD.with(|active| active.replace(true)) {
            return Err(SchemaBuildingError::NestedBuild);
        }
        Ok(ActiveBuildGuard { _private: () })
    }
}

impl Drop for ActiveBuildGuard {
    fn drop(&mut self) {
        ACTIVE_BUILD.with(|active| active.set(false));
    }
}

/// Whether a declaration block or build is running on the current thread.
pub fn is_build_active() -> bool {
    ACTIVE_BUILD.with(Cell::get)
}
