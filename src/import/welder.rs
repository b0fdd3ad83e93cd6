//! Vertex welding and index construction
//!
//! Converts polygon-soup geometry into a compact indexed triangle list. Two
//! corners of a mesh collapse into one output vertex exactly when they
//! reference the same control point *and* resolve to bit-identical normal and
//! UV values; any attribute difference splits the vertex instead, which is
//! what preserves hard edges and UV seams.
//!
//! All meshes of a document are welded into a single shared vertex/index
//! buffer pair. Each mesh's indices are offset by the number of vertices
//! already emitted, so the combined buffers can be uploaded and drawn as one
//! unit.

use crate::gfx::vertex::TexturedVertex;
use crate::import::attributes::{resolve_normal, resolve_uv, Corner};
use crate::import::document::{MeshGeometry, SceneDocument, SceneNode};

/// Combined output of welding a whole document: one vertex buffer and one
/// u32 triangle index buffer, ready for GPU upload.
#[derive(Default)]
pub struct MeshBuffers {
    pub vertices: Vec<TexturedVertex>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Draw-call primitive count: the total number of indices.
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Welds every mesh in the document into one shared buffer pair.
///
/// The hierarchy is walked depth-first, children after self, with an explicit
/// worklist so arbitrarily deep trees cannot exhaust the call stack. Each
/// mesh's base offset is the vertex count at the moment that node is
/// processed, which keeps all emitted indices valid in the shared buffer.
/// Nodes without geometry contribute nothing but their children are still
/// visited.
pub fn weld_document(document: &SceneDocument) -> MeshBuffers {
    let mut buffers = MeshBuffers::default();
    let mut corners = 0usize;
    let mut meshes = 0usize;

    let mut pending: Vec<&SceneNode> = vec![&document.root];
    while let Some(node) = pending.pop() {
        if let Some(geometry) = &node.geometry {
            let base_offset = buffers.vertices.len() as u32;
            weld_mesh(geometry, base_offset, &mut buffers.vertices, &mut buffers.indices);
            corners += geometry.corner_count();
            meshes += 1;
            log::debug!(
                "welded mesh '{}' at offset {}: {} vertices total",
                node.name,
                base_offset,
                buffers.vertices.len()
            );
        }
        // Reverse push keeps children in document order on the stack.
        pending.extend(node.children.iter().rev());
    }

    log::info!(
        "welded {} meshes: {} corners -> {} vertices, {} triangles",
        meshes,
        corners,
        buffers.vertices.len(),
        buffers.triangle_count()
    );
    buffers
}

/// Welds one mesh into the shared buffers, offsetting every emitted index by
/// `base_offset`.
///
/// The registry maps each control point to the output vertices already created
/// for it (as indices into the shared buffer). Every corner is either matched
/// against those copies by bit-identical normal+UV, or appended as a new
/// vertex. Per polygon, the matched local indices are fan-triangulated from
/// corner 0 in authored winding order; polygons with fewer than three corners
/// are skipped.
///
/// This pass never fails: unresolvable attribute data falls back to zero
/// values and malformed polygons are dropped, so one bad mesh cannot halt the
/// import.
pub fn weld_mesh(
    mesh: &MeshGeometry,
    base_offset: u32,
    vertices: &mut Vec<TexturedVertex>,
    indices: &mut Vec<u32>,
) {
    let mut registry: Vec<Vec<u32>> = vec![Vec::new(); mesh.control_point_count()];
    let mut polygon_corners: Vec<u32> = Vec::with_capacity(8);
    let mut ordinal = 0usize;

    for polygon in 0..mesh.polygon_count() {
        let size = mesh.polygon_size(polygon);
        polygon_corners.clear();

        for position in 0..size {
            let control_point = mesh.polygon_vertex(polygon, position);
            let corner = Corner {
                polygon,
                position,
                control_point,
                ordinal,
            };
            ordinal += 1;

            let position3 = match mesh.control_point(control_point) {
                Some(p) => p,
                None => {
                    log::warn!(
                        "polygon {polygon} references control point {control_point} \
                         outside the pool; substituting the origin"
                    );
                    [0.0; 3]
                }
            };
            let vertex = TexturedVertex {
                position: position3,
                normal: resolve_normal(mesh, &corner),
                uv: resolve_uv(mesh, &corner),
            };

            let local_index = match registry.get_mut(control_point as usize) {
                Some(copies) => {
                    let reused = copies
                        .iter()
                        .copied()
                        .find(|&global| vertices[global as usize].attributes_match(&vertex));
                    match reused {
                        Some(global) => global - base_offset,
                        None => {
                            vertices.push(vertex);
                            let global = (vertices.len() - 1) as u32;
                            copies.push(global);
                            global - base_offset
                        }
                    }
                }
                // Out-of-pool control point: emit the vertex but keep it out
                // of the registry so nothing else welds against it.
                None => {
                    vertices.push(vertex);
                    (vertices.len() - 1) as u32 - base_offset
                }
            };
            polygon_corners.push(local_index);
        }

        if polygon_corners.len() < 3 {
            log::debug!(
                "skipping degenerate polygon {polygon} with {} corners",
                polygon_corners.len()
            );
            continue;
        }

        // Fan triangulation from corner 0; a triangle passes through as-is.
        for i in 2..polygon_corners.len() {
            indices.push(polygon_corners[0] + base_offset);
            indices.push(polygon_corners[i - 1] + base_offset);
            indices.push(polygon_corners[i] + base_offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::document::{AttributeLayer, MappingMode};

    fn quad_points() -> Vec<[f32; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ]
    }

    fn corner_normals(normals: Vec<[f32; 3]>) -> AttributeLayer<[f32; 3]> {
        AttributeLayer::direct(MappingMode::ByPolygonCorner, normals)
    }

    fn corner_uvs(uvs: Vec<[f32; 2]>) -> AttributeLayer<[f32; 2]> {
        AttributeLayer::direct(MappingMode::ByPolygonCorner, uvs)
    }

    fn weld_single(mesh: &MeshGeometry) -> MeshBuffers {
        let mut buffers = MeshBuffers::default();
        weld_mesh(mesh, 0, &mut buffers.vertices, &mut buffers.indices);
        buffers
    }

    #[test]
    fn test_single_triangle() {
        let mesh = MeshGeometry::new(quad_points()[..3].to_vec(), vec![0, 1, 2], vec![3])
            .with_normals(corner_normals(vec![
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ]))
            .with_uvs(corner_uvs(vec![[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]]));

        let buffers = weld_single(&mesh);
        assert_eq!(buffers.vertices.len(), 3);
        assert_eq!(buffers.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_quad_fans_into_two_triangles() {
        let mesh = MeshGeometry::new(quad_points(), vec![0, 1, 2, 3], vec![4]);

        let buffers = weld_single(&mesh);
        assert_eq!(buffers.vertices.len(), 4);
        assert_eq!(buffers.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_shared_corner_with_identical_attributes_welds() {
        // Two triangles sharing the edge 1-2, all normals/uvs identical per
        // control point, so the shared corners must reuse vertices.
        let mesh = MeshGeometry::new(
            quad_points(),
            vec![0, 1, 2, 2, 1, 3],
            vec![3, 3],
        )
        .with_normals(AttributeLayer::direct(
            MappingMode::ByControlPoint,
            vec![[0.0, 0.0, 1.0]; 4],
        ));

        let buffers = weld_single(&mesh);
        assert_eq!(buffers.vertices.len(), 4, "shared corners must not duplicate");
        assert_eq!(buffers.indices, vec![0, 1, 2, 2, 1, 3]);
    }

    #[test]
    fn test_attribute_discontinuity_splits_vertex() {
        // Same control points in both triangles, but the second polygon's
        // corners carry a different normal: a hard edge. Every corner of the
        // second triangle must become a fresh vertex.
        let mesh = MeshGeometry::new(
            quad_points()[..3].to_vec(),
            vec![0, 1, 2, 0, 1, 2],
            vec![3, 3],
        )
        .with_normals(corner_normals(vec![
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ]));

        let buffers = weld_single(&mesh);
        assert_eq!(buffers.vertices.len(), 6);
        assert_eq!(buffers.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_uv_seam_splits_and_rejoins() {
        // Third polygon repeats the first polygon's attributes exactly, so it
        // must weld back onto the first polygon's vertices.
        let mesh = MeshGeometry::new(
            quad_points()[..3].to_vec(),
            vec![0, 1, 2, 0, 1, 2, 0, 1, 2],
            vec![3, 3, 3],
        )
        .with_uvs(corner_uvs(vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.5, 1.0],
            [0.5, 0.0],
            [1.0, 0.5],
            [0.5, 0.5],
            [0.0, 0.0],
            [1.0, 0.0],
            [0.5, 1.0],
        ]));

        let buffers = weld_single(&mesh);
        assert_eq!(buffers.vertices.len(), 6);
        assert_eq!(buffers.indices, vec![0, 1, 2, 3, 4, 5, 0, 1, 2]);
    }

    #[test]
    fn test_degenerate_polygons_are_skipped() {
        let mesh = MeshGeometry::new(
            quad_points()[..3].to_vec(),
            vec![0, 0, 1, 0, 1, 2],
            vec![1, 2, 3],
        );

        let buffers = weld_single(&mesh);
        assert_eq!(buffers.indices.len(), 3, "only the triangle may emit indices");
        // Degenerate polygons still visit their corners and may emit vertices,
        // but must not emit any triangle.
        assert!(buffers.indices.iter().all(|&i| (i as usize) < buffers.vertices.len()));
    }

    #[test]
    fn test_triangle_count_per_arity() {
        for arity in 3..8usize {
            let points: Vec<[f32; 3]> = (0..arity).map(|i| [i as f32, 0.0, 0.0]).collect();
            let mesh = MeshGeometry::new(
                points,
                (0..arity as u32).collect(),
                vec![arity as u32],
            );
            let buffers = weld_single(&mesh);
            assert_eq!(buffers.indices.len(), (arity - 2) * 3);
        }
    }

    #[test]
    fn test_base_offset_applies_to_all_indices() {
        let mesh = MeshGeometry::new(quad_points(), vec![0, 1, 2, 3], vec![4]);

        let mut buffers = MeshBuffers::default();
        // Pretend five vertices were already emitted by an earlier mesh.
        buffers.vertices.extend(vec![TexturedVertex::default(); 5]);
        weld_mesh(&mesh, 5, &mut buffers.vertices, &mut buffers.indices);

        assert_eq!(buffers.vertices.len(), 9);
        assert!(buffers.indices.iter().all(|&i| i >= 5));
        assert_eq!(buffers.indices, vec![5, 6, 7, 5, 7, 8]);
    }

    #[test]
    fn test_weld_is_idempotent() {
        let mesh = MeshGeometry::new(
            quad_points(),
            vec![0, 1, 2, 2, 1, 3],
            vec![3, 3],
        )
        .with_normals(corner_normals(vec![
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]));

        let first = weld_single(&mesh);
        let second = weld_single(&mesh);
        assert_eq!(first.indices, second.indices);
        assert_eq!(
            bytemuck::cast_slice::<_, u8>(&first.vertices),
            bytemuck::cast_slice::<_, u8>(&second.vertices)
        );
    }

    #[test]
    fn test_negative_zero_does_not_weld_with_zero() {
        let mesh = MeshGeometry::new(
            quad_points()[..3].to_vec(),
            vec![0, 1, 2, 0, 1, 2],
            vec![3, 3],
        )
        .with_normals(corner_normals(vec![
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [-0.0, 0.0, 1.0],
            [-0.0, 0.0, 1.0],
            [-0.0, 0.0, 1.0],
        ]));

        // Comparison is on bits, not numeric equality.
        let buffers = weld_single(&mesh);
        assert_eq!(buffers.vertices.len(), 6);
    }

    #[test]
    fn test_out_of_pool_control_point_does_not_panic() {
        let mesh = MeshGeometry::new(
            quad_points()[..2].to_vec(),
            vec![0, 1, 9],
            vec![3],
        );

        let buffers = weld_single(&mesh);
        assert_eq!(buffers.vertices.len(), 3);
        assert_eq!(buffers.vertices[2].position, [0.0, 0.0, 0.0]);
        assert_eq!(buffers.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_document_traversal_offsets_meshes() {
        use crate::import::document::{SceneDocument, SceneNode};

        // root -> [first (5 distinct vertices), group -> [second]]
        let first = MeshGeometry::new(
            (0..5).map(|i| [i as f32, 0.0, 0.0]).collect(),
            vec![0, 1, 2, 3, 4],
            vec![5],
        );
        let second = MeshGeometry::new(quad_points(), vec![0, 1, 2, 3], vec![4]);

        let document = SceneDocument {
            root: SceneNode::group(
                "root",
                vec![
                    SceneNode::mesh("first", first),
                    SceneNode::group("group", vec![SceneNode::mesh("second", second)]),
                ],
            ),
        };

        let buffers = weld_document(&document);
        assert_eq!(buffers.vertices.len(), 9);
        // First mesh: a 5-gon fanned into 3 triangles, indices 0..5.
        assert!(buffers.indices[..9].iter().all(|&i| i < 5));
        // Second mesh appended after the first, so all its indices are >= 5.
        assert!(buffers.indices[9..].iter().all(|&i| i >= 5));
        assert!(buffers
            .indices
            .iter()
            .all(|&i| (i as usize) < buffers.vertices.len()));
        assert_eq!(buffers.index_count(), buffers.indices.len() as u32);
    }

    #[test]
    fn test_geometryless_nodes_still_visit_children() {
        use crate::import::document::{SceneDocument, SceneNode};

        let leaf = MeshGeometry::new(quad_points()[..3].to_vec(), vec![0, 1, 2], vec![3]);
        let document = SceneDocument {
            root: SceneNode::group(
                "root",
                vec![SceneNode::group(
                    "empty",
                    vec![SceneNode::group(
                        "deeper",
                        vec![SceneNode::mesh("leaf", leaf)],
                    )],
                )],
            ),
        };

        let buffers = weld_document(&document);
        assert_eq!(buffers.vertices.len(), 3);
        assert_eq!(buffers.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_sibling_order_is_document_order() {
        use crate::import::document::{SceneDocument, SceneNode};

        // Distinguish siblings by their x coordinate.
        let make = |x: f32| {
            MeshGeometry::new(
                vec![[x, 0.0, 0.0], [x, 1.0, 0.0], [x, 0.0, 1.0]],
                vec![0, 1, 2],
                vec![3],
            )
        };
        let document = SceneDocument {
            root: SceneNode::group(
                "root",
                vec![
                    SceneNode::mesh("a", make(1.0)),
                    SceneNode::mesh("b", make(2.0)),
                    SceneNode::mesh("c", make(3.0)),
                ],
            ),
        };

        let buffers = weld_document(&document);
        assert_eq!(buffers.vertices.len(), 9);
        assert_eq!(buffers.vertices[0].position[0], 1.0);
        assert_eq!(buffers.vertices[3].position[0], 2.0);
        assert_eq!(buffers.vertices[6].position[0], 3.0);
    }
}
