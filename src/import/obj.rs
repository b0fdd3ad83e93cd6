//! Wavefront OBJ document loader
//!
//! Parses an OBJ file into the [`SceneDocument`] model, keeping the polygon
//! soup exactly as authored: faces keep their arity, and normal/UV streams
//! keep their own index arrays instead of being collapsed onto positions.
//! Material libraries are ignored; the renderer supplies its own texture.

use std::path::Path;

use crate::import::document::{
    AttributeLayer, MappingMode, MeshGeometry, SceneDocument, SceneNode,
};
use crate::import::error::ImportError;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        // Keep authored polygon arity; triangulation happens in the welder.
        triangulate: false,
        // Keep per-corner normal/uv index streams separate from positions.
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

pub(crate) fn load_document(path: &Path) -> Result<SceneDocument, ImportError> {
    let supported = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("obj"));
    if !supported {
        return Err(ImportError::UnsupportedFormat {
            path: path.to_owned(),
        });
    }

    let (models, materials) = tobj::load_obj(path, &load_options()).map_err(|source| match source
    {
        tobj::LoadError::OpenFileFailed => ImportError::OpenFailed {
            path: path.to_owned(),
        },
        source => ImportError::Parse {
            path: path.to_owned(),
            source,
        },
    })?;

    if materials.is_err() {
        log::debug!(
            "no usable material library for {}; continuing without one",
            path.display()
        );
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("scene")
        .to_string();
    let document = document_from_models(models, name);

    log::info!(
        "loaded scene {} ({} nodes, {} meshes)",
        path.display(),
        document.node_count(),
        document.mesh_count()
    );
    Ok(document)
}

/// Builds the node hierarchy: a geometry-less root with one child per OBJ
/// model, in document order.
pub(crate) fn document_from_models(models: Vec<tobj::Model>, name: String) -> SceneDocument {
    let children = models
        .into_iter()
        .enumerate()
        .map(|(i, model)| {
            let node_name = if model.name.is_empty() {
                format!("mesh_{i}")
            } else {
                model.name.clone()
            };
            log::debug!(
                "model '{}': {} control points, {} corners",
                node_name,
                model.mesh.positions.len() / 3,
                model.mesh.indices.len()
            );
            SceneNode::mesh(node_name, geometry_from_mesh(&model.mesh))
        })
        .collect();

    SceneDocument {
        root: SceneNode::group(name, children),
    }
}

fn geometry_from_mesh(mesh: &tobj::Mesh) -> MeshGeometry {
    let control_points = chunks3(&mesh.positions);
    let polygon_sizes = if mesh.face_arities.is_empty() {
        // Already triangulated source; every face has three corners.
        vec![3; mesh.indices.len() / 3]
    } else {
        mesh.face_arities.clone()
    };

    let mut geometry = MeshGeometry::new(control_points, mesh.indices.clone(), polygon_sizes);
    if let Some(layer) = normal_layer(mesh) {
        geometry = geometry.with_normals(layer);
    }
    if let Some(layer) = uv_layer(mesh) {
        geometry = geometry.with_uvs(layer);
    }
    geometry
}

/// Classifies the normal stream. A dedicated index array means the values are
/// keyed per corner through that array; an index-free stream aligned with the
/// control points is a smooth per-point mapping.
fn normal_layer(mesh: &tobj::Mesh) -> Option<AttributeLayer<[f32; 3]>> {
    if mesh.normals.is_empty() {
        return None;
    }
    let values = chunks3(&mesh.normals);
    if !mesh.normal_indices.is_empty() {
        Some(AttributeLayer::indexed(
            MappingMode::ByPolygonCorner,
            values,
            mesh.normal_indices.clone(),
        ))
    } else if values.len() == mesh.positions.len() / 3 {
        Some(AttributeLayer::direct(MappingMode::ByControlPoint, values))
    } else {
        log::debug!("normal stream matches neither corners nor control points; dropping layer");
        None
    }
}

fn uv_layer(mesh: &tobj::Mesh) -> Option<AttributeLayer<[f32; 2]>> {
    if mesh.texcoords.is_empty() {
        return None;
    }
    let values = chunks2(&mesh.texcoords);
    if !mesh.texcoord_indices.is_empty() {
        Some(AttributeLayer::indexed(
            MappingMode::ByPolygonCorner,
            values,
            mesh.texcoord_indices.clone(),
        ))
    } else if values.len() == mesh.positions.len() / 3 {
        Some(AttributeLayer::direct(MappingMode::ByControlPoint, values))
    } else {
        log::debug!("uv stream matches neither corners nor control points; dropping layer");
        None
    }
}

fn chunks3(values: &[f32]) -> Vec<[f32; 3]> {
    values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

fn chunks2(values: &[f32]) -> Vec<[f32; 2]> {
    values.chunks_exact(2).map(|c| [c[0], c[1]]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::document::ReferenceMode;
    use crate::import::welder::weld_document;
    use std::io::BufReader;

    fn parse(source: &str) -> SceneDocument {
        let mut reader = BufReader::new(source.as_bytes());
        let (models, _) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
            Err(tobj::LoadError::GenericFailure)
        })
        .expect("fixture OBJ must parse");
        document_from_models(models, "fixture".to_string())
    }

    const CUBE_FACE: &str = "\
o face
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_face_document_shape() {
        let document = parse(CUBE_FACE);
        assert_eq!(document.node_count(), 2);
        assert_eq!(document.mesh_count(), 1);

        let geometry = document.root.children[0].geometry.as_ref().unwrap();
        assert_eq!(geometry.control_point_count(), 4);
        assert_eq!(geometry.polygon_count(), 1);
        assert_eq!(geometry.polygon_size(0), 4);
    }

    #[test]
    fn test_corner_streams_classified_as_indexed() {
        let document = parse(CUBE_FACE);
        let geometry = document.root.children[0].geometry.as_ref().unwrap();

        let normals = geometry.normals.as_ref().unwrap();
        assert_eq!(normals.mapping, MappingMode::ByPolygonCorner);
        assert_eq!(normals.reference, ReferenceMode::IndexToDirect);
        assert_eq!(normals.values.len(), 1);
        assert_eq!(normals.indices, vec![0, 0, 0, 0]);

        let uvs = geometry.uvs.as_ref().unwrap();
        assert_eq!(uvs.mapping, MappingMode::ByPolygonCorner);
        assert_eq!(uvs.reference, ReferenceMode::IndexToDirect);
        assert_eq!(uvs.indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_quad_welds_to_four_vertices_two_triangles() {
        let document = parse(CUBE_FACE);
        let buffers = weld_document(&document);
        assert_eq!(buffers.vertices.len(), 4);
        assert_eq!(buffers.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(buffers.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(buffers.vertices[2].uv, [1.0, 1.0]);
    }

    #[test]
    fn test_mesh_without_attribute_streams() {
        let source = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
        let document = parse(source);
        let geometry = document.root.children[0].geometry.as_ref().unwrap();
        assert!(geometry.normals.is_none());
        assert!(geometry.uvs.is_none());

        // Welding still succeeds with zero-valued attributes.
        let buffers = weld_document(&document);
        assert_eq!(buffers.vertices.len(), 3);
        assert_eq!(buffers.vertices[0].normal, [0.0, 0.0, 0.0]);
        assert_eq!(buffers.vertices[0].uv, [0.0, 0.0]);
    }

    #[test]
    fn test_multiple_models_become_sibling_nodes() {
        let source = "\
o first
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
o second
v 0.0 0.0 1.0
v 1.0 0.0 1.0
v 0.0 1.0 1.0
f 4 5 6
";
        let document = parse(source);
        assert_eq!(document.mesh_count(), 2);
        assert_eq!(document.root.children[0].name, "first");
        assert_eq!(document.root.children[1].name, "second");

        // The second mesh appends after the first in the shared buffers.
        let buffers = weld_document(&document);
        assert_eq!(buffers.vertices.len(), 6);
        assert!(buffers.indices[3..].iter().all(|&i| i >= 3));
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let err = SceneDocument::load("model.fbx").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file_fails_to_open() {
        let err = SceneDocument::load("does_not_exist.obj").unwrap_err();
        assert!(matches!(err, ImportError::OpenFailed { .. }));
    }
}
