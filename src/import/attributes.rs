//! Per-corner attribute resolution
//!
//! Normals and UVs live in [`AttributeLayer`] streams whose interpretation is
//! governed by two independent policies: the mapping mode picks the lookup key
//! (control-point id vs. running corner ordinal) and the reference mode picks
//! the lookup path (direct vs. through an index array). Resolution is a pure
//! function of the layer and the corner identity.
//!
//! A missing layer or an out-of-range lookup resolves to a zero value rather
//! than failing; a mesh without normal or UV channels is valid input.

use crate::import::document::{AttributeLayer, MappingMode, MeshGeometry, ReferenceMode};

/// Identity of one polygon corner during a mesh walk.
///
/// `ordinal` is the running corner counter across the whole mesh, incremented
/// once per corner visited regardless of polygon boundaries. Corner-mapped
/// layers are keyed by this flat ordinal, not by the polygon-local position.
#[derive(Copy, Clone, Debug)]
pub struct Corner {
    pub polygon: usize,
    pub position: usize,
    pub control_point: u32,
    pub ordinal: usize,
}

/// Resolves the normal for a corner, or `[0.0; 3]` if the mesh has no normal
/// layer or the layer data does not cover this corner.
pub fn resolve_normal(mesh: &MeshGeometry, corner: &Corner) -> [f32; 3] {
    resolve(mesh.normals.as_ref(), corner, "normal").unwrap_or([0.0; 3])
}

/// Resolves the UV for a corner, or `[0.0; 2]` if the mesh has no UV layer or
/// the layer data does not cover this corner.
pub fn resolve_uv(mesh: &MeshGeometry, corner: &Corner) -> [f32; 2] {
    resolve(mesh.uvs.as_ref(), corner, "uv").unwrap_or([0.0; 2])
}

fn resolve<T: Copy>(layer: Option<&AttributeLayer<T>>, corner: &Corner, kind: &str) -> Option<T> {
    let layer = layer?;

    let key = match layer.mapping {
        MappingMode::ByControlPoint => corner.control_point as usize,
        MappingMode::ByPolygonCorner => corner.ordinal,
    };

    let value_index = match layer.reference {
        ReferenceMode::Direct => key,
        ReferenceMode::IndexToDirect => match layer.indices.get(key) {
            Some(&index) => index as usize,
            None => {
                log::debug!(
                    "{kind} index array has no entry for key {key} (corner {}); using default",
                    corner.ordinal
                );
                return None;
            }
        },
    };

    let value = layer.values.get(value_index).copied();
    if value.is_none() {
        log::debug!(
            "{kind} value index {value_index} out of range (corner {}); using default",
            corner.ordinal
        );
    }
    value
}
