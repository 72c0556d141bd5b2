use meshdata::{attribute::AttributeUsage, MeshData, MeshError};
use nalgebra::{Point2, Point3, Vector3};

fn triangle() -> MeshData {
    MeshData {
        positions: Some(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]),
        normals: Some(vec![Vector3::z(); 3]),
        indices: Some(vec![0, 1, 2]),
        ..Default::default()
    }
}

#[test]
fn empty() {
    let mesh = MeshData::<f32>::new();
    assert_eq!(mesh.vertex_count(), 0);
    assert_eq!(mesh.vertex_size(), 0);
    assert_eq!(mesh.triangle_count(), 0);
    assert!(mesh.has_valid_attribute_count());
    assert_eq!(mesh.validate(), Err(MeshError::Empty));
}

#[test]
fn counts() {
    let mesh = triangle();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.vertex_size(), 24);
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(
        mesh.attribute_usages().collect::<Vec<_>>(),
        [AttributeUsage::Position, AttributeUsage::Normal]
    );
    assert_eq!(mesh.validate(), Ok(()));
}

#[test]
fn mismatched_attributes() {
    let mut mesh = triangle();
    mesh.texcoords = Some(vec![Point2::origin(); 2]);
    assert!(!mesh.has_valid_attribute_count());
    assert_eq!(
        mesh.validate(),
        Err(MeshError::AttributeCount {
            usage: AttributeUsage::Texcoord,
            expected: 3,
            actual: 2
        })
    );

    // empty sequences don't count against the attribute count, but still can't be packed
    mesh.texcoords = Some(vec![]);
    assert!(mesh.has_valid_attribute_count());
    assert!(mesh.validate().is_err());
}

#[test]
fn bad_indices() {
    let mut mesh = triangle();
    mesh.indices = Some(vec![0, 1]);
    assert_eq!(mesh.validate(), Err(MeshError::IncompleteTriangle(2)));

    mesh.indices = Some(vec![0, 1, 2, 2, 1, 3]);
    assert_eq!(
        mesh.validate(),
        Err(MeshError::IndexOutOfRange {
            position: 5,
            index: 3,
            vertex_count: 3
        })
    );
}

#[test]
fn attribute_locations() {
    for (i, usage) in AttributeUsage::ALL.into_iter().enumerate() {
        assert_eq!(usage.location(), i as u32);
        assert_eq!(AttributeUsage::from_location(i as u32), Some(usage));
    }
    assert_eq!(AttributeUsage::from_location(4), None);
}
