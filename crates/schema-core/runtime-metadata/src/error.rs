// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeMetadataError {
    #[error("Unable to serialize runtime metadata: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Unable to load runtime metadata: {0}")]
    Deserialize(#[source] serde_json::Error),
}
