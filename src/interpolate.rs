//! Finite-field interpolator
//!
//! Recovers the master key from exactly `threshold` share points by Lagrange
//! interpolation at x = 0, byte by byte over GF(256). Pure: no state, no I/O,
//! no logging. Which `threshold`-sized subset of the issued shares is supplied
//! makes no difference to the result.

use zeroize::Zeroizing;

use crate::domain::{ShareIndex, Threshold};
use crate::field::Gf256;
use crate::key::{KeyCheck, MasterKey};

/// One share point: x-coordinate and its bytewise y-values
pub struct SharePoint {
    pub index: ShareIndex,
    pub value: Zeroizing<Vec<u8>>,
}

impl SharePoint {
    #[must_use]
    pub fn new(index: ShareIndex, value: Zeroizing<Vec<u8>>) -> Self {
        Self { index, value }
    }
}

impl std::fmt::Debug for SharePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharePoint")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Reconstruction failure
///
/// Deliberately carries no detail: which share was wrong, or whether the
/// points were inconsistent rather than merely wrong, is not disclosed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("master key reconstruction failed")]
pub struct ReconstructionError;

/// Lagrange interpolation at x = 0
///
/// Callers must supply distinct indices and equally long values; the result
/// has the length of the first value.
///
/// # Errors
/// Returns an error if `points` is empty, indices repeat, or value lengths differ
pub fn interpolate_at_zero(points: &[SharePoint]) -> Result<Zeroizing<Vec<u8>>, ReconstructionError> {
    let first = points.first().ok_or(ReconstructionError)?;
    let length = first.value.len();
    if points.iter().any(|p| p.value.len() != length) {
        return Err(ReconstructionError);
    }

    // Basis coefficients l_i(0) = prod_{j != i} x_j / (x_j - x_i); these depend
    // only on the indices, so compute them once for all bytes.
    let mut basis = Zeroizing::new(Vec::with_capacity(points.len()));
    for (i, point_i) in points.iter().enumerate() {
        let x_i = Gf256::new(*point_i.index);
        let mut numerator = Gf256::ONE;
        let mut denominator = Gf256::ONE;
        for (j, point_j) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            let x_j = Gf256::new(*point_j.index);
            numerator = numerator * x_j;
            denominator = denominator * (x_j + x_i);
        }
        // A zero denominator means a repeated index
        let inverse = denominator.inverse().ok_or(ReconstructionError)?;
        basis.push((numerator * inverse).value());
    }

    let mut secret = Zeroizing::new(vec![0u8; length]);
    for (position, byte) in secret.iter_mut().enumerate() {
        *byte = points
            .iter()
            .zip(basis.iter())
            .map(|(point, &l)| Gf256::new(l) * Gf256::new(point.value[position]))
            .sum::<Gf256>()
            .value();
    }
    Ok(secret)
}

/// Reconstructs and verifies the master key
///
/// Requires exactly `threshold` points. The interpolated value is only
/// returned as a [`MasterKey`] if it matches `key_check`; otherwise it is
/// zeroized here.
///
/// # Errors
/// Returns [`ReconstructionError`] if the point count is wrong, the points are
/// inconsistent, or the result does not match the key check
pub fn reconstruct(
    points: &[SharePoint],
    threshold: Threshold,
    key_check: &KeyCheck,
) -> Result<MasterKey, ReconstructionError> {
    if points.len() != usize::from(*threshold) {
        return Err(ReconstructionError);
    }
    let secret = interpolate_at_zero(points)?;
    if !key_check.matches(&secret) {
        return Err(ReconstructionError);
    }
    Ok(MasterKey::new(secret))
}
