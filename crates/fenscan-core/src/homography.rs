use crate::{sample_bilinear_u8, GrayImage, GrayImageView};
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};
use serde::{Deserialize, Serialize};

/// Projective map of the plane, `dst ~ h * src` in homogeneous coordinates.
///
/// Matrices built by [`homography_from_4pt`] are scaled so that `h[(2, 2)] == 1`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let q = self.h * Vector3::new(f64::from(p.x), f64::from(p.y), 1.0);
        Point2::new((q.x / q.z) as f32, (q.y / q.z) as f32)
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.h.determinant()
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

/// Similarity that moves a quad's centroid to the origin and its mean
/// radius to `sqrt(2)`, which keeps the 8x8 solve well conditioned.
struct Conditioner {
    t: Matrix3<f64>,
    pts: [Point2<f64>; 4],
}

impl Conditioner {
    fn new(quad: &[Point2<f32>; 4]) -> Self {
        let pts = quad.map(|p| Point2::new(f64::from(p.x), f64::from(p.y)));
        let centroid = pts.iter().fold(Vector3::zeros(), |acc, p| {
            acc + Vector3::new(p.x, p.y, 0.0)
        }) / 4.0;
        let radius = pts
            .iter()
            .map(|p| (p.x - centroid.x).hypot(p.y - centroid.y))
            .sum::<f64>()
            / 4.0;
        let s = if radius > 1e-12 {
            std::f64::consts::SQRT_2 / radius
        } else {
            1.0
        };

        let t = Matrix3::new(
            s, 0.0, -s * centroid.x, //
            0.0, s, -s * centroid.y, //
            0.0, 0.0, 1.0,
        );
        let pts = pts.map(|p| Point2::new(s * (p.x - centroid.x), s * (p.y - centroid.y)));
        Self { t, pts }
    }
}

/// Solve for the homography mapping the four `src` points onto the four `dst`
/// points, index for index.
///
/// Returns `None` when the correspondences do not determine a projective map,
/// e.g. when three of the points are collinear.
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    let src = Conditioner::new(src);
    let dst = Conditioner::new(dst);

    // unknowns h11..h32 with h33 fixed to 1, two rows per correspondence
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (k, (s, d)) in src.pts.iter().zip(&dst.pts).enumerate() {
        let (x, y) = (s.x, s.y);
        for (row, target, offset) in [(2 * k, d.x, 0), (2 * k + 1, d.y, 3)] {
            a[(row, offset)] = x;
            a[(row, offset + 1)] = y;
            a[(row, offset + 2)] = 1.0;
            a[(row, 6)] = -target * x;
            a[(row, 7)] = -target * y;
            b[row] = target;
        }
    }

    let sol = a.lu().solve(&b)?;
    if !sol.iter().all(|v| v.is_finite()) {
        return None;
    }
    let conditioned = Matrix3::new(
        sol[0], sol[1], sol[2], //
        sol[3], sol[4], sol[5], //
        sol[6], sol[7], 1.0,
    );

    let h = dst.t.try_inverse()? * conditioned * src.t;
    let scale = h[(2, 2)];
    if scale.abs() < 1e-12 {
        return None;
    }
    Some(Homography::new(h / scale))
}

/// Inverse-map warp: output pixel centers go through `h_src_from_out` and the
/// source is sampled bilinearly. Samples outside `src` read as 0.
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    h_src_from_out: Homography,
    out_w: usize,
    out_h: usize,
) -> GrayImage {
    let data = (0..out_h)
        .flat_map(|y| (0..out_w).map(move |x| (x, y)))
        .map(|(x, y)| {
            let p = h_src_from_out.apply(Point2::new(x as f32 + 0.5, y as f32 + 0.5));
            sample_bilinear_u8(src, p.x - 0.5, p.y - 0.5)
        })
        .collect();

    GrayImage {
        width: out_w,
        height: out_h,
        data,
    }
}
