use nalgebra::Vector3;
use protomesh::MeshData;

/// Whether every triangle winds counter-clockwise as seen from the side its vertex normals point
/// to.
pub fn faces_outward(mesh: &MeshData) -> bool {
    let positions = mesh.positions.as_ref().unwrap();
    let normals = mesh.normals.as_ref().unwrap();
    mesh.indices.as_ref().unwrap().chunks_exact(3).all(|tri| {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let face = (positions[b] - positions[a]).cross(&(positions[c] - positions[a]));
        let avg: Vector3<f32> = normals[a] + normals[b] + normals[c];
        face.dot(&avg) > 0.0
    })
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-4 * a.abs().max(b.abs()).max(1.0)
}
