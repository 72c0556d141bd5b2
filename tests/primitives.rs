mod common;

use std::collections::HashSet;

use common::{approx, faces_outward};
use protomesh::{
    capsule, cuboid, cylinder,
    primitive::{Capsule, CapsuleLayout, CapsuleSection, Cuboid, Cylinder, Quad, Sphere},
    quad, sphere, Error, Primitive,
};

#[test]
fn quad_faces_its_normal() {
    let mesh = quad(2.0f32, 1.0);
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.index_count(), 6);
    assert!(mesh.normals.as_ref().unwrap().iter().all(|n| *n == nalgebra::Vector3::z()));
    assert!(faces_outward(&mesh));

    let positions = mesh.positions.as_ref().unwrap();
    assert!(positions.iter().all(|p| p.x.abs() == 1.0 && p.y.abs() == 0.5 && p.z == 0.0));
    let uvs = mesh.texcoords.as_ref().unwrap();
    assert!(uvs.iter().all(|t| (0.0..=1.0).contains(&t.x) && (0.0..=1.0).contains(&t.y)));
    assert_eq!(mesh.validate(), Ok(()));
}

#[test]
fn cuboid_faces() {
    let mesh = cuboid(1.0f32, 2.0, 3.0);
    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.index_count(), 36);
    assert!(mesh.validate().is_ok());
    assert!(faces_outward(&mesh));

    let normals = mesh.normals.as_ref().unwrap();
    let expected = [
        [0.0, 0.0, -1.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];
    for (face, normal) in expected.into_iter().enumerate() {
        for n in &normals[face * 4..face * 4 + 4] {
            assert_eq!(n.as_slice(), normal.as_slice());
        }
    }

    for (p, n) in mesh.positions.as_ref().unwrap().iter().zip(normals) {
        assert!(approx(p.x.abs(), 0.5) && approx(p.y.abs(), 1.0) && approx(p.z.abs(), 1.5));
        // every vertex lies on the face its normal names
        assert!(approx(p.coords.dot(n), [0.5, 1.0, 1.5][n.iamax()]));
    }
}

#[test]
fn sphere_counts() {
    for n in 0..4 {
        let mesh = sphere(n, 1.0f32);
        assert_eq!(mesh.triangle_count() as u64, Sphere::triangle_count(n));
        assert_eq!(mesh.vertex_count() as u64, Sphere::vertex_count(n));
    }
    // shared edges produce a single midpoint
    assert_eq!(sphere(1, 1.0f32).vertex_count(), 42);
}

#[test]
fn largest_sphere_is_indexable() {
    let n = Sphere::MAX_SUBDIVISIONS;
    assert!(Sphere::index_count(n) <= u32::MAX as u64);
    assert!(Sphere::index_count(n + 1) > Sphere::index_count(n));

    let mesh = Sphere::new(n, 1.0f32).try_generate().unwrap();
    assert_eq!(mesh.index_count() as u64, Sphere::index_count(n));
    assert_eq!(mesh.vertex_count() as u64, Sphere::vertex_count(n));
    assert!(mesh.validate().is_ok());
}

#[test]
fn sphere_surface() {
    let radius = 0.75f32;
    let mesh = sphere(2, radius);
    for (p, n) in mesh
        .positions
        .as_ref()
        .unwrap()
        .iter()
        .zip(mesh.normals.as_ref().unwrap())
    {
        assert!(approx(p.coords.norm(), radius));
        assert!(approx(n.norm(), 1.0));
        assert!((p.coords / radius - n).norm() < 1e-5);
    }
    assert!(faces_outward(&mesh));
    assert!(mesh.texcoords.is_none());
}

#[test]
fn cylinder_counts() {
    for s in [3, 4, 16, 33] {
        let mesh = cylinder(0.5f32, 1.0, s);
        assert_eq!(mesh.vertex_count(), 4 * s as usize);
        assert_eq!(mesh.index_count(), 6 * s as usize + 6 * (s as usize - 2));
        assert!(faces_outward(&mesh));
    }
    // too few segments clamp to a triangular prism
    assert_eq!(cylinder(0.5f32, 1.0, 0), cylinder(0.5, 1.0, 3));
    assert_eq!(cylinder(0.5f32, 1.0, 2).vertex_count(), 12);
    // the largest ring still addresses every vertex with a u32
    let max = Cylinder::<f32>::MAX_SEGMENTS as u64;
    assert!(4 * max - 1 <= u32::MAX as u64);
    assert!(4 * (max + 1) - 1 > u32::MAX as u64);
}

#[test]
fn cylinder_cap_normals() {
    let s = 8;
    let mesh = cylinder(1.0f32, 2.0, s);
    let normals = mesh.normals.as_ref().unwrap();
    let positions = mesh.positions.as_ref().unwrap();
    let s = s as usize;
    for i in 0..s {
        assert_eq!(normals[2 * s + i], nalgebra::Vector3::y());
        assert_eq!(normals[3 * s + i], -nalgebra::Vector3::y());
        assert_eq!(positions[2 * s + i].y, 1.0);
        assert_eq!(positions[3 * s + i].y, -1.0);
        // side normals are horizontal & radial
        assert_eq!(normals[i].y, 0.0);
        assert!(approx(normals[i].norm(), 1.0));
    }
}

#[test]
fn capsule_counts() {
    for ((lat, lon, rings), (vertices, indices)) in [
        ((16, 16, 0), (304, 1536)),
        ((16, 16, 3), (355, 1824)),
        ((2, 8, 0), (34, 96)),
        ((4, 8, 1), (61, 240)),
        ((5, 3, 2), (38, 144)),
    ] {
        let mesh = capsule(0.5f32, 1.0, lat, lon, rings);
        assert_eq!(mesh.vertex_count(), vertices, "{lat} {lon} {rings}");
        assert_eq!(mesh.index_count(), indices, "{lat} {lon} {rings}");
        let layout = CapsuleLayout::new(lat, lon, rings);
        assert_eq!(layout.vertex_count, vertices);
        assert_eq!(layout.index_count, indices);
    }
}

#[test]
fn capsule_clamps() {
    assert_eq!(capsule(0.5f32, 1.0, 0, 0, 0), capsule(0.5, 1.0, 2, 3, 0));
    assert_eq!(capsule(0.5f32, 1.0, 7, 5, 1), capsule(0.5, 1.0, 8, 5, 1));
    let layout = CapsuleLayout::new(1, 1, 0);
    assert_eq!(layout.latitude_segments, 2);
    assert_eq!(layout.longitude_segments, 3);
}

#[test]
fn capsule_sections_tile_the_mesh() {
    for (lat, lon, rings) in [(16, 16, 0), (6, 5, 4), (2, 3, 0)] {
        let layout = CapsuleLayout::new(lat, lon, rings);
        let mut next_vertex = 0;
        let mut next_index = 0;
        for section in CapsuleSection::ALL {
            let v = layout.vertices(section);
            let i = layout.indices(section);
            assert_eq!(v.start, next_vertex, "{section:?}");
            assert_eq!(i.start, next_index, "{section:?}");
            next_vertex = v.end;
            next_index = i.end;
        }
        assert_eq!(next_vertex, layout.vertex_count);
        assert_eq!(next_index, layout.index_count);
    }
}

#[test]
fn capsule_without_rings() {
    let (radius, height) = (0.5f32, 1.0);
    let mesh = capsule(radius, height, 16, 16, 0);
    let layout = CapsuleLayout::new(16, 16, 0);
    assert!(layout.vertices(CapsuleSection::Cylinder).is_empty());
    // the equators are still joined by a single strip
    assert_eq!(layout.indices(CapsuleSection::Cylinder).len(), 6 * 16);
    assert!(faces_outward(&mesh));
    assert_eq!(mesh.validate(), Ok(()));

    let positions = mesh.positions.as_ref().unwrap();
    let top = positions.iter().map(|p| p.y).fold(f32::MIN, f32::max);
    let bottom = positions.iter().map(|p| p.y).fold(f32::MAX, f32::min);
    assert!(approx(top, height / 2.0 + radius));
    assert!(approx(bottom, -(height / 2.0 + radius)));
    for p in positions {
        let horizontal = (p.x * p.x + p.z * p.z).sqrt();
        assert!(horizontal <= radius + 1e-5);
    }
}

#[test]
fn capsule_texcoords() {
    let mesh = capsule(0.5f32, 1.0, 8, 12, 2);
    let layout = CapsuleLayout::new(8, 12, 2);
    let uvs = mesh.texcoords.as_ref().unwrap();
    assert!(uvs
        .iter()
        .all(|t| (0.0..=1.0).contains(&t.x) && (0.0..=1.0).contains(&t.y)));
    for i in layout.vertices(CapsuleSection::NorthCap) {
        assert_eq!(uvs[i].y, 1.0);
    }
    for i in layout.vertices(CapsuleSection::SouthCap) {
        assert_eq!(uvs[i].y, 0.0);
    }
    for i in layout.vertices(CapsuleSection::NorthEquator) {
        assert!(approx(uvs[i].y, 2.0 / 3.0));
    }
    for i in layout.vertices(CapsuleSection::SouthEquator) {
        assert!(approx(uvs[i].y, 1.0 / 3.0));
    }
    // the seam is duplicated: same position, opposite ends of the texture
    let eq = layout.north_equator;
    let positions = mesh.positions.as_ref().unwrap();
    assert!((positions[eq] - positions[eq + 12]).norm() < 1e-5);
    assert_eq!(uvs[eq].x, 1.0);
    assert!(approx(uvs[eq + 12].x, 0.0));
}

#[test]
fn distinct_cuboid_normals() {
    let mesh = cuboid(1.0f32, 1.0, 1.0);
    let normals = mesh
        .normals
        .as_ref()
        .unwrap()
        .iter()
        .map(|n| n.map(|c| c as i32))
        .map(|n| (n.x, n.y, n.z))
        .collect::<HashSet<_>>();
    assert_eq!(normals.len(), 6);
}

#[test]
fn validation() {
    assert!(Quad::new(1.0f32, 1.0).try_generate().is_ok());
    assert_eq!(
        Quad::new(0.0f32, 1.0).validate(),
        Err(Error::NonPositive {
            name: "width",
            value: 0.0
        })
    );
    assert!(matches!(
        Cuboid::new(1.0f32, f32::NAN, 1.0).validate(),
        Err(Error::NonPositive { name: "height", .. })
    ));
    assert_eq!(
        Sphere::new(Sphere::MAX_SUBDIVISIONS + 1, 1.0f32).validate(),
        Err(Error::TooMany {
            name: "subdivisions",
            max: Sphere::MAX_SUBDIVISIONS,
            value: Sphere::MAX_SUBDIVISIONS + 1
        })
    );
    assert!(Sphere::new(Sphere::MAX_SUBDIVISIONS, 1.0f32).validate().is_ok());
    assert!(matches!(
        Sphere::new(14, 1.0f32).validate(),
        Err(Error::TooMany { name: "subdivisions", .. })
    ));
    assert_eq!(
        Cylinder::new(1.0f32, 1.0, u32::MAX).validate(),
        Err(Error::TooMany {
            name: "segments",
            max: Cylinder::<f32>::MAX_SEGMENTS,
            value: u32::MAX
        })
    );
    assert!(Cylinder::new(1.0f32, 1.0, Cylinder::<f32>::MAX_SEGMENTS)
        .validate()
        .is_ok());
    assert_eq!(
        Cylinder::new(1.0f32, 1.0, 2).validate(),
        Err(Error::TooFew {
            name: "segments",
            min: 3,
            value: 2
        })
    );
    assert!(Capsule::new(0.5f32, 0.0, 2, 3, 0).try_generate().is_ok());
    assert!(matches!(
        Capsule::new(0.5f32, -1.0, 16, 16, 0).validate(),
        Err(Error::Negative { name: "height", .. })
    ));
    assert!(matches!(
        Capsule::new(0.5f32, 1.0, 1, 16, 0).validate(),
        Err(Error::TooFew {
            name: "latitude_segments",
            ..
        })
    ));
    assert!(matches!(
        Capsule::new(0.5f32, 1.0, 16, u32::MAX, u32::MAX).validate(),
        Err(Error::TooManyVertices(_))
    ));
}

#[test]
fn double_precision() {
    let single = capsule(0.5f32, 1.0, 8, 8, 1);
    let double = capsule(0.5f64, 1.0, 8, 8, 1);
    assert_eq!(single.indices, double.indices);
    for (a, b) in single
        .positions
        .as_ref()
        .unwrap()
        .iter()
        .zip(double.positions.as_ref().unwrap())
    {
        assert!((a.coords.cast::<f64>() - b.coords).norm() < 1e-5);
    }
}
