// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Output side: primitive writers and the per-session object writer.

mod graph;
mod identity;
mod primitive;

pub use graph::{GraphWriter, ObjectWriter};
pub use identity::{IdentityTable, TypeIndex};
pub use primitive::{BufferWriter, PrimitiveWriter, StreamWriter};
