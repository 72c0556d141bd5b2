use std::ops::Range;

use nalgebra::{Point2, Point3, Vector3};

use super::{addressable, at_least, finish, non_negative, positive, Primitive};
use crate::{error::Error, Float, MeshData};

/// A Y-up capsule centered at the origin: a cylinder of height `height` capped by two
/// hemispheres of radius `radius`, for a total height of `height + 2·radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule<R = f32> {
    /// Radius of the cylinder and of both hemispheres
    pub radius: R,
    /// Length of the cylindrical section, not counting the hemispheres
    pub height: R,
    /// Rings from pole to pole; rounded up to the next even number
    pub latitude_segments: u32,
    /// Segments around the Y axis
    pub longitude_segments: u32,
    /// Extra vertex rings along the cylindrical section
    pub rings: u32,
}

impl<R: Float> Capsule<R> {
    /// Parameters in field order.
    pub fn new(
        radius: R,
        height: R,
        latitude_segments: u32,
        longitude_segments: u32,
        rings: u32,
    ) -> Self {
        Self {
            radius,
            height,
            latitude_segments,
            longitude_segments,
            rings,
        }
    }

    /// Vertex and index ranges of the mesh [generate](Primitive::generate) will produce.
    pub fn layout(&self) -> CapsuleLayout {
        CapsuleLayout::new(self.latitude_segments, self.longitude_segments, self.rings)
    }
}

impl<R: Float> Primitive for Capsule<R> {
    type Real = R;

    fn generate(&self) -> MeshData<R> {
        capsule(
            self.radius,
            self.height,
            self.latitude_segments,
            self.longitude_segments,
            self.rings,
        )
    }

    fn validate(&self) -> Result<(), Error> {
        positive("radius", self.radius)?;
        non_negative("height", self.height)?;
        at_least(
            "latitude_segments",
            CapsuleLayout::MIN_LATITUDE_SEGMENTS,
            self.latitude_segments,
        )?;
        at_least(
            "longitude_segments",
            CapsuleLayout::MIN_LONGITUDE_SEGMENTS,
            self.longitude_segments,
        )?;
        // `lat + rings` full rings, counting both equators; both caps add `lon` more
        let lat = self.latitude_segments as u64 + self.latitude_segments as u64 % 2;
        let ring = self.longitude_segments as u64 + 1;
        let vertices = (lat + self.rings as u64)
            .saturating_mul(ring)
            .saturating_add(2 * self.longitude_segments as u64);
        addressable(vertices)
    }
}

/// Sections of a capsule mesh, from north to south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapsuleSection {
    /// Triangle fan around the north pole
    NorthCap,
    /// Rings between the north pole and the north equator
    NorthHemisphere,
    /// Vertices only; index-wise, the equators belong to [CapsuleSection::Cylinder]
    NorthEquator,
    /// Rings between the equators, plus the strips joining both equators to them
    Cylinder,
    /// Vertices only, like [CapsuleSection::NorthEquator]
    SouthEquator,
    /// Includes the ring adjacent to the south cap
    SouthHemisphere,
    /// Triangle fan around the south pole
    SouthCap,
}

impl CapsuleSection {
    /// Every section, in mesh order.
    pub const ALL: [CapsuleSection; 7] = [
        CapsuleSection::NorthCap,
        CapsuleSection::NorthHemisphere,
        CapsuleSection::NorthEquator,
        CapsuleSection::Cylinder,
        CapsuleSection::SouthEquator,
        CapsuleSection::SouthHemisphere,
        CapsuleSection::SouthCap,
    ];
}

/// Where each section of a capsule lives within its vertex and index sequences.
///
/// Every ring but the caps holds `longitude_segments + 1` vertices; the seam vertex is
/// duplicated so that it can carry both `s = 1` and `s = 0`. Each cap holds one pole vertex
/// per longitude segment so that each cap triangle gets its own texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapsuleLayout {
    /// Always even
    pub latitude_segments: usize,
    /// At least [CapsuleLayout::MIN_LONGITUDE_SEGMENTS]
    pub longitude_segments: usize,
    /// Rings strictly between the equators
    pub rings: usize,

    /// First vertex of the north hemisphere rings; the north cap's poles come before it
    pub north_hemisphere: usize,
    /// First vertex of the north equator ring
    pub north_equator: usize,
    /// First vertex of the cylinder rings
    pub cylinder: usize,
    /// First vertex of the south equator ring
    pub south_equator: usize,
    /// First vertex of the south hemisphere rings
    pub south_hemisphere: usize,
    /// The southernmost hemisphere ring, around which the south cap is fanned
    pub south_polar: usize,
    /// First south pole vertex
    pub south_cap: usize,
    /// Total vertices
    pub vertex_count: usize,

    /// First index of the north hemisphere strips; the north cap fan comes before it
    pub north_hemisphere_indices: usize,
    /// First index of the strips from the north equator to the south equator
    pub cylinder_indices: usize,
    /// First index of the south hemisphere strips
    pub south_hemisphere_indices: usize,
    /// First index of the south cap fan
    pub south_cap_indices: usize,
    /// Total indices
    pub index_count: usize,
}

impl CapsuleLayout {
    /// One ring per hemisphere, besides the poles
    pub const MIN_LATITUDE_SEGMENTS: u32 = 2;
    /// Fewer would collapse the rings into a line
    pub const MIN_LONGITUDE_SEGMENTS: u32 = 3;

    /// Compute the layout for the given segment counts, after clamping them to the minimums
    /// and rounding `latitude_segments` up to an even number.
    pub fn new(latitude_segments: u32, longitude_segments: u32, rings: u32) -> Self {
        let lat = latitude_segments.max(Self::MIN_LATITUDE_SEGMENTS) as usize;
        let lat = lat + lat % 2;
        let lon = longitude_segments.max(Self::MIN_LONGITUDE_SEGMENTS) as usize;
        let rings = rings as usize;

        let half_lats = lat / 2;
        let ring = lon + 1;

        let north_hemisphere = lon;
        let north_equator = north_hemisphere + ring * (half_lats - 1);
        let cylinder = north_equator + ring;
        let south_equator = cylinder + ring * rings;
        let south_hemisphere = south_equator + ring;
        let south_polar = south_equator + ring * (half_lats - 1);
        let south_cap = south_polar + ring;
        let vertex_count = south_cap + lon;

        let strip = lon * 6;
        let north_hemisphere_indices = lon * 3;
        let cylinder_indices = north_hemisphere_indices + strip * (half_lats - 1);
        let south_hemisphere_indices = cylinder_indices + strip * (rings + 1);
        let south_cap_indices = south_hemisphere_indices + strip * (half_lats - 1);
        let index_count = south_cap_indices + lon * 3;

        Self {
            latitude_segments: lat,
            longitude_segments: lon,
            rings,
            north_hemisphere,
            north_equator,
            cylinder,
            south_equator,
            south_hemisphere,
            south_polar,
            south_cap,
            vertex_count,
            north_hemisphere_indices,
            cylinder_indices,
            south_hemisphere_indices,
            south_cap_indices,
            index_count,
        }
    }

    /// Latitude segments per hemisphere.
    #[inline]
    pub fn half_lats(&self) -> usize {
        self.latitude_segments / 2
    }

    /// Vertices per ring.
    #[inline]
    pub fn ring_len(&self) -> usize {
        self.longitude_segments + 1
    }

    /// Vertex range of `section`.
    pub fn vertices(&self, section: CapsuleSection) -> Range<usize> {
        match section {
            CapsuleSection::NorthCap => 0..self.north_hemisphere,
            CapsuleSection::NorthHemisphere => self.north_hemisphere..self.north_equator,
            CapsuleSection::NorthEquator => self.north_equator..self.cylinder,
            CapsuleSection::Cylinder => self.cylinder..self.south_equator,
            CapsuleSection::SouthEquator => self.south_equator..self.south_hemisphere,
            CapsuleSection::SouthHemisphere => self.south_hemisphere..self.south_cap,
            CapsuleSection::SouthCap => self.south_cap..self.vertex_count,
        }
    }

    /// Index range of `section`; empty for the equators.
    pub fn indices(&self, section: CapsuleSection) -> Range<usize> {
        match section {
            CapsuleSection::NorthCap => 0..self.north_hemisphere_indices,
            CapsuleSection::NorthHemisphere => {
                self.north_hemisphere_indices..self.cylinder_indices
            }
            CapsuleSection::NorthEquator => self.cylinder_indices..self.cylinder_indices,
            CapsuleSection::Cylinder => self.cylinder_indices..self.south_hemisphere_indices,
            CapsuleSection::SouthEquator => {
                self.south_hemisphere_indices..self.south_hemisphere_indices
            }
            CapsuleSection::SouthHemisphere => {
                self.south_hemisphere_indices..self.south_cap_indices
            }
            CapsuleSection::SouthCap => self.south_cap_indices..self.index_count,
        }
    }

    /// Join `steps` consecutive rings, starting at vertex `first`, with quads.
    fn push_strips(&self, indices: &mut Vec<u32>, first: usize, steps: usize) {
        let ring = self.ring_len();
        for step in 0..steps {
            let current = first + step * ring;
            let next = current + ring;
            for j in 0..self.longitude_segments {
                let (c0, c1) = ((current + j) as u32, (current + j + 1) as u32);
                let (n0, n1) = ((next + j) as u32, (next + j + 1) as u32);
                indices.extend([c0, n1, c1, c0, n0, n1]);
            }
        }
    }
}

/// Capsule with positions, normals, and texture coordinates.
///
/// `latitude_segments` is clamped to at least 2 and rounded up to an even number;
/// `longitude_segments` is clamped to at least 3. With `rings == 0` the two equators are
/// joined directly.
///
/// Texture coordinates wrap `s` once around the Y axis and run `t` from 0 at the south pole to
/// 1 at the north pole, with the cylindrical section covering the middle third.
pub fn capsule<R: Float>(
    radius: R,
    height: R,
    latitude_segments: u32,
    longitude_segments: u32,
    rings: u32,
) -> MeshData<R> {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!(
        "capsule",
        ?radius,
        ?height,
        latitude_segments,
        longitude_segments,
        rings
    )
    .entered();

    let layout = CapsuleLayout::new(latitude_segments, longitude_segments, rings);
    #[cfg(feature = "tracing")]
    if layout.latitude_segments != latitude_segments as usize
        || layout.longitude_segments != longitude_segments as usize
    {
        tracing::debug!(
            latitude_segments = layout.latitude_segments,
            longitude_segments = layout.longitude_segments,
            "adjusted capsule segments"
        );
    }

    let lon_count = layout.longitude_segments;
    let half_lats = layout.half_lats();
    let half_height = height * R::HALF;
    let third = R::ONE / R::cast_u32(3);
    let t_north = R::ONE - third;
    let t_south = third;

    let to_theta = R::two_pi() / R::cast_u32(lon_count as u32);
    let to_phi = R::pi() / R::cast_u32(layout.latitude_segments as u32);

    // (cos θ, sin θ) for each longitude; the seam reuses the first
    let around = (0..lon_count)
        .map(|lon| {
            let (sin, cos) = (to_theta * R::cast_u32(lon as u32)).sin_cos();
            (cos, sin)
        })
        .collect::<Vec<_>>();
    let longitudes = R::cast_u32(lon_count as u32);
    let s_tex = |lon: usize| R::ONE - R::cast_u32(lon as u32) / longitudes;

    let mut positions = vec![Point3::origin(); layout.vertex_count];
    let mut normals = vec![Vector3::zeros(); layout.vertex_count];
    let mut texcoords = vec![Point2::origin(); layout.vertex_count];

    // write one ring of `ring_len` vertices at radius `rho` and height `y`; `normal` maps
    // (cos θ, sin θ) to the vertex normal
    let mut write_ring = |first: usize,
                          rho: R,
                          y: R,
                          t: R,
                          normal: &dyn Fn(R, R) -> Vector3<R>| {
        for lon in 0..=lon_count {
            let (cos, sin) = around[lon % lon_count];
            positions[first + lon] = Point3::new(rho * cos, y, -(rho * sin));
            normals[first + lon] = normal(cos, sin);
            texcoords[first + lon] = Point2::new(s_tex(lon), t);
        }
    };

    let horizontal = |cos: R, sin: R| Vector3::new(cos, R::ZERO, -sin);
    write_ring(layout.north_equator, radius, half_height, t_north, &horizontal);
    write_ring(layout.south_equator, radius, -half_height, t_south, &horizontal);

    for lat in 0..half_lats - 1 {
        let phi = R::cast_u32(lat as u32 + 1) * to_phi;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let fac = R::cast_u32(lat as u32 + 1) / R::cast_u32(half_lats as u32);
        let cmpl = R::ONE - fac;

        // north: ring radius grows from the pole down
        write_ring(
            layout.north_hemisphere + lat * layout.ring_len(),
            radius * sin_phi,
            half_height + radius * cos_phi,
            cmpl + t_north * fac,
            &|cos, sin| Vector3::new(sin_phi * cos, cos_phi, -(sin_phi * sin)),
        );
        // south: ring radius shrinks from the equator down
        write_ring(
            layout.south_hemisphere + lat * layout.ring_len(),
            radius * cos_phi,
            -half_height - radius * sin_phi,
            cmpl * t_south,
            &|cos, sin| Vector3::new(cos_phi * cos, -sin_phi, -(cos_phi * sin)),
        );
    }

    for h in 1..=layout.rings {
        let fac = R::cast_u32(h as u32) / R::cast_u32(layout.rings as u32 + 1);
        write_ring(
            layout.cylinder + (h - 1) * layout.ring_len(),
            radius,
            half_height - height * fac,
            (R::ONE - fac) * t_north + fac * t_south,
            &horizontal,
        );
    }

    let pole = half_height + radius;
    for lon in 0..lon_count {
        let s = R::ONE - (R::cast_u32(lon as u32) + R::HALF) / longitudes;
        positions[lon] = Point3::new(R::ZERO, pole, R::ZERO);
        normals[lon] = Vector3::y();
        texcoords[lon] = Point2::new(s, R::ONE);

        let south = layout.south_cap + lon;
        positions[south] = Point3::new(R::ZERO, -pole, R::ZERO);
        normals[south] = -Vector3::y();
        texcoords[south] = Point2::new(s, R::ZERO);
    }

    let mut indices = Vec::with_capacity(layout.index_count);
    for i in 0..lon_count {
        let nh = layout.north_hemisphere + i;
        indices.extend([i as u32, nh as u32, nh as u32 + 1]);
    }
    layout.push_strips(&mut indices, layout.north_hemisphere, half_lats - 1);
    layout.push_strips(&mut indices, layout.north_equator, layout.rings + 1);
    layout.push_strips(&mut indices, layout.south_equator, half_lats - 1);
    for i in 0..lon_count {
        let sp = layout.south_polar + i;
        indices.extend([(layout.south_cap + i) as u32, sp as u32 + 1, sp as u32]);
    }

    finish(MeshData {
        positions: Some(positions),
        normals: Some(normals),
        texcoords: Some(texcoords),
        colors: None,
        indices: Some(indices),
    })
}
