//! In-memory scene document model
//!
//! A loaded scene is a tree of [`SceneNode`]s, each optionally carrying a
//! [`MeshGeometry`]. Geometry is stored the way interchange formats author it:
//! a pool of control points (unique positions) referenced by polygon corners,
//! with normal/UV data in separate [`AttributeLayer`] streams that may be
//! keyed per control point or per corner, directly or through an index array.
//!
//! The document is an immutable snapshot of the source file. All memory is
//! owned by the [`SceneDocument`]; dropping it releases the whole tree.

use std::path::Path;

use crate::import::error::ImportError;

/// A fully parsed scene file.
#[derive(Debug)]
pub struct SceneDocument {
    pub root: SceneNode,
}

impl SceneDocument {
    /// Opens and parses a scene file completely into memory.
    ///
    /// Fails with [`ImportError`] on an unreadable file, an unsupported
    /// format, or a malformed document. No partial scene is ever returned.
    pub fn load(path: impl AsRef<Path>) -> Result<SceneDocument, ImportError> {
        super::obj::load_document(path.as_ref())
    }

    /// Number of nodes in the hierarchy, root included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![&self.root];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }

    /// Number of nodes that carry geometry.
    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![&self.root];
        while let Some(node) = pending.pop() {
            if node.geometry.is_some() {
                count += 1;
            }
            pending.extend(node.children.iter());
        }
        count
    }
}

/// One node in the scene hierarchy.
///
/// Nodes own their children; traversal order throughout the crate is
/// depth-first, children after self.
#[derive(Debug)]
pub struct SceneNode {
    pub name: String,
    pub geometry: Option<MeshGeometry>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Creates a grouping node without geometry.
    pub fn group(name: impl Into<String>, children: Vec<SceneNode>) -> Self {
        Self {
            name: name.into(),
            geometry: None,
            children,
        }
    }

    /// Creates a leaf node carrying geometry.
    pub fn mesh(name: impl Into<String>, geometry: MeshGeometry) -> Self {
        Self {
            name: name.into(),
            geometry: Some(geometry),
            children: Vec::new(),
        }
    }
}

/// Granularity at which an attribute layer's values are keyed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MappingMode {
    /// One value per control point, shared by every corner that references it.
    ByControlPoint,
    /// One value per polygon corner, keyed by the running corner ordinal.
    ByPolygonCorner,
}

/// How an attribute value is looked up for a given key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReferenceMode {
    /// The key indexes the value array directly.
    Direct,
    /// The key indexes an index array, which in turn indexes the values.
    IndexToDirect,
}

/// An optional per-mesh attribute stream (normals or UVs).
///
/// `indices` is only consulted in [`ReferenceMode::IndexToDirect`] and stays
/// empty otherwise.
#[derive(Debug)]
pub struct AttributeLayer<T> {
    pub mapping: MappingMode,
    pub reference: ReferenceMode,
    pub values: Vec<T>,
    pub indices: Vec<u32>,
}

impl<T> AttributeLayer<T> {
    pub fn direct(mapping: MappingMode, values: Vec<T>) -> Self {
        Self {
            mapping,
            reference: ReferenceMode::Direct,
            values,
            indices: Vec::new(),
        }
    }

    pub fn indexed(mapping: MappingMode, values: Vec<T>, indices: Vec<u32>) -> Self {
        Self {
            mapping,
            reference: ReferenceMode::IndexToDirect,
            values,
            indices,
        }
    }
}

/// Polygon-soup geometry for one mesh node.
///
/// Corners are stored as one flat stream of control-point ids in document
/// order, partitioned into polygons by `polygon_sizes`. Polygons keep their
/// authored arity and winding.
#[derive(Debug)]
pub struct MeshGeometry {
    control_points: Vec<[f32; 3]>,
    corner_points: Vec<u32>,
    polygon_sizes: Vec<u32>,
    // Cumulative offsets into corner_points, one per polygon.
    polygon_starts: Vec<u32>,
    pub normals: Option<AttributeLayer<[f32; 3]>>,
    pub uvs: Option<AttributeLayer<[f32; 2]>>,
}

impl MeshGeometry {
    /// Builds geometry from a control-point pool, a flat corner stream and
    /// per-polygon corner counts. `polygon_sizes` must sum to
    /// `corner_points.len()`; trailing polygons past the corner stream are
    /// truncated rather than trusted.
    pub fn new(
        control_points: Vec<[f32; 3]>,
        corner_points: Vec<u32>,
        polygon_sizes: Vec<u32>,
    ) -> Self {
        let mut polygon_starts = Vec::with_capacity(polygon_sizes.len());
        let mut sizes = Vec::with_capacity(polygon_sizes.len());
        let mut offset = 0u32;
        for &size in &polygon_sizes {
            if offset + size > corner_points.len() as u32 {
                log::warn!(
                    "polygon sizes overrun the corner stream ({} corners); truncating",
                    corner_points.len()
                );
                break;
            }
            polygon_starts.push(offset);
            sizes.push(size);
            offset += size;
        }

        Self {
            control_points,
            corner_points,
            polygon_sizes: sizes,
            polygon_starts,
            normals: None,
            uvs: None,
        }
    }

    pub fn with_normals(mut self, layer: AttributeLayer<[f32; 3]>) -> Self {
        self.normals = Some(layer);
        self
    }

    pub fn with_uvs(mut self, layer: AttributeLayer<[f32; 2]>) -> Self {
        self.uvs = Some(layer);
        self
    }

    pub fn control_point_count(&self) -> usize {
        self.control_points.len()
    }

    /// Raw position of a control point, or `None` for an out-of-range id.
    pub fn control_point(&self, id: u32) -> Option<[f32; 3]> {
        self.control_points.get(id as usize).copied()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygon_sizes.len()
    }

    pub fn polygon_size(&self, polygon: usize) -> usize {
        self.polygon_sizes[polygon] as usize
    }

    /// Control-point id referenced by corner `position` of `polygon`.
    pub fn polygon_vertex(&self, polygon: usize, position: usize) -> u32 {
        let start = self.polygon_starts[polygon] as usize;
        self.corner_points[start + position]
    }

    /// Total number of corners across all polygons.
    pub fn corner_count(&self) -> usize {
        self.polygon_sizes.iter().map(|&s| s as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(n: usize) -> Vec<[f32; 3]> {
        (0..n).map(|i| [i as f32, 0.0, 0.0]).collect()
    }

    #[test]
    fn test_polygon_accessors_mixed_arity() {
        // A triangle followed by a quad sharing an edge.
        let geometry = MeshGeometry::new(
            points(5),
            vec![0, 1, 2, 1, 3, 4, 2],
            vec![3, 4],
        );

        assert_eq!(geometry.polygon_count(), 2);
        assert_eq!(geometry.polygon_size(0), 3);
        assert_eq!(geometry.polygon_size(1), 4);
        assert_eq!(geometry.polygon_vertex(0, 0), 0);
        assert_eq!(geometry.polygon_vertex(0, 2), 2);
        assert_eq!(geometry.polygon_vertex(1, 0), 1);
        assert_eq!(geometry.polygon_vertex(1, 3), 2);
        assert_eq!(geometry.corner_count(), 7);
    }

    #[test]
    fn test_overrunning_polygon_sizes_are_truncated() {
        let geometry = MeshGeometry::new(points(3), vec![0, 1, 2], vec![3, 3]);
        assert_eq!(geometry.polygon_count(), 1);
        assert_eq!(geometry.corner_count(), 3);
    }

    #[test]
    fn test_out_of_range_control_point() {
        let geometry = MeshGeometry::new(points(2), vec![0, 1], vec![2]);
        assert_eq!(geometry.control_point(1), Some([1.0, 0.0, 0.0]));
        assert_eq!(geometry.control_point(2), None);
    }

    #[test]
    fn test_document_counts() {
        let document = SceneDocument {
            root: SceneNode::group(
                "root",
                vec![
                    SceneNode::mesh("a", MeshGeometry::new(points(3), vec![0, 1, 2], vec![3])),
                    SceneNode::group(
                        "g",
                        vec![SceneNode::mesh(
                            "b",
                            MeshGeometry::new(points(3), vec![0, 1, 2], vec![3]),
                        )],
                    ),
                ],
            ),
        };

        assert_eq!(document.node_count(), 4);
        assert_eq!(document.mesh_count(), 2);
    }
}
