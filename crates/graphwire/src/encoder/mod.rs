// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type encoders.
//!
//! Every formal type gets a [`SlotPlan`] deciding how a slot of that type
//! is written: skipped, inline as a value, or as a reference. Every actual
//! reference type gets a [`TypeEncoder`] for its body. Both are built once
//! and memoized in an [`EncoderCache`].

mod array;
mod builder;
mod collection;
mod plan;
mod reference;
mod value;

pub use array::ArrayPlan;
pub use builder::{BodyPlan, EncoderCache, TypeEncoder};
pub use collection::{CollectionPlan, DictionaryPlan};
pub use plan::{FieldPlan, IdentityWrite, ReferencePlan, SlotPlan};
