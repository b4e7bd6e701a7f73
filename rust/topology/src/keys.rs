// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology key types for arena-based storage.
//!
//! Keys are created by `slotmap::SlotMap` and remain valid even after other
//! entities are removed (generational indices). For a freshly built arena
//! they are assigned in insertion order, so deterministic construction
//! yields deterministic keys.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a topological vertex (a snapped endpoint cluster).
    pub struct VertexKey;

    /// Key for an undirected wall edge between two vertices.
    pub struct EdgeKey;
}
