use nalgebra::{Matrix2, Vector2};

/// Calculates the second moment tensor of the given points about their centroid.
///
/// \\begin{equation}
///     S = \frac{1}{N}\sum_i (\vec{p}_i - \vec{c})(\vec{p}_i - \vec{c})^T
/// \\end{equation}
///
/// Returns the zero matrix if no points are given.
pub fn second_moment<'a, I>(points: I) -> Matrix2<f64>
where
    I: IntoIterator<Item = &'a Vector2<f64>>,
    I::IntoIter: Clone,
{
    let iter = points.into_iter();
    let n = iter.clone().count();
    if n == 0 {
        return Matrix2::zeros();
    }
    let center = iter.clone().sum::<Vector2<f64>>() / n as f64;
    iter.map(|p| {
        let d = p - center;
        d * d.transpose()
    })
    .sum::<Matrix2<f64>>()
        / n as f64
}

/// Which eigenvector of a symmetric tensor should be returned by [principal_direction].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrincipalAxis {
    /// Eigenvector of the largest eigenvalue
    Largest,
    /// Eigenvector of the smallest eigenvalue
    Smallest,
}

/// Normalizes the sign of a direction such that its first non-vanishing component is positive.
pub fn canonical_direction(v: Vector2<f64>) -> Vector2<f64> {
    if v.x < 0.0 || (v.x == 0.0 && v.y < 0.0) {
        -v
    } else {
        v
    }
}

/// Calculates the eigenvector of the largest or smallest eigenvalue of a symmetric 2x2 tensor.
///
/// For a symmetric tensor with entries $a, b, d$ the eigenvalues are
/// \\begin{equation}
///     \lambda_\pm = \frac{a+d}{2} \pm \sqrt{\left(\frac{a-d}{2}\right)^2 + b^2}.
/// \\end{equation}
/// When the discriminant is smaller than `tolerance` times the magnitude of the tensor, the
/// tensor is considered isotropic and every direction is an eigenvector.
/// In this case the x-axis is returned for [PrincipalAxis::Largest] and the y-axis for
/// [PrincipalAxis::Smallest].
/// The result is always normalized and its sign is fixed by [canonical_direction].
pub fn principal_direction(
    tensor: &Matrix2<f64>,
    axis: PrincipalAxis,
    tolerance: f64,
) -> Vector2<f64> {
    let a = tensor[(0, 0)];
    let d = tensor[(1, 1)];
    let b = 0.5 * (tensor[(0, 1)] + tensor[(1, 0)]);
    let half_diff = 0.5 * (a - d);
    let disc = (half_diff * half_diff + b * b).sqrt();
    let scale = a.abs().max(d.abs()).max(b.abs());

    if !disc.is_finite() || disc <= tolerance * scale || scale == 0.0 {
        return match axis {
            PrincipalAxis::Largest => Vector2::x(),
            PrincipalAxis::Smallest => Vector2::y(),
        };
    }

    let lambda = match axis {
        PrincipalAxis::Largest => 0.5 * (a + d) + disc,
        PrincipalAxis::Smallest => 0.5 * (a + d) - disc,
    };
    // Pick the better conditioned of the two equivalent eigenvector formulas
    let v1 = Vector2::new(b, lambda - a);
    let v2 = Vector2::new(lambda - d, b);
    let v = if v1.norm_squared() >= v2.norm_squared() {
        v1
    } else {
        v2
    };
    canonical_direction(v.normalize())
}

/// Rotation matrix by the given angle.
pub fn rotation(angle: f64) -> Matrix2<f64> {
    let (s, c) = angle.sin_cos();
    Matrix2::new(c, -s, s, c)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn second_moment_of_segment() {
        let points = [Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)];
        let s = second_moment(points.iter());
        assert_abs_diff_eq!(s, Matrix2::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn principal_axes_of_diagonal_tensor() {
        let t = Matrix2::new(1.0, 0.0, 0.0, 3.0);
        let largest = principal_direction(&t, PrincipalAxis::Largest, 1e-9);
        let smallest = principal_direction(&t, PrincipalAxis::Smallest, 1e-9);
        assert_abs_diff_eq!(largest, Vector2::new(0.0, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(smallest, Vector2::new(1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn principal_axes_of_rotated_tensor() {
        let r = rotation(std::f64::consts::FRAC_PI_4);
        let t = r * Matrix2::new(4.0, 0.0, 0.0, 1.0) * r.transpose();
        let largest = principal_direction(&t, PrincipalAxis::Largest, 1e-9);
        let expected = Vector2::new(1.0, 1.0).normalize();
        assert_abs_diff_eq!(largest, expected, epsilon = 1e-12);
        let smallest = principal_direction(&t, PrincipalAxis::Smallest, 1e-9);
        assert_abs_diff_eq!(smallest.dot(&largest), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn isotropic_tensor_tie_break() {
        let t = Matrix2::identity() * 2.5;
        assert_eq!(
            principal_direction(&t, PrincipalAxis::Largest, 1e-9),
            Vector2::x()
        );
        assert_eq!(
            principal_direction(&t, PrincipalAxis::Smallest, 1e-9),
            Vector2::y()
        );
        assert_eq!(
            principal_direction(&Matrix2::zeros(), PrincipalAxis::Smallest, 1e-9),
            Vector2::y()
        );
    }

    #[test]
    fn canonical_sign() {
        assert_eq!(
            canonical_direction(Vector2::new(-1.0, 2.0)),
            Vector2::new(1.0, -2.0)
        );
        assert_eq!(
            canonical_direction(Vector2::new(0.0, -1.0)),
            Vector2::new(0.0, 1.0)
        );
    }
}
