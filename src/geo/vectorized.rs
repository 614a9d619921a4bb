use ndarray::{Array2, ArrayView2, Axis, Zip};
use thiserror::Error;

use crate::geo::haversine::haversine_distance;
use crate::Coordinate;

#[derive(Debug, Error, PartialEq)]
pub enum BroadcastError {
    #[error("cannot broadcast shape {left:?} against {right:?}")]
    Incompatible {
        left: (usize, usize),
        right: (usize, usize),
    },
}

/// Haversine distance applied elementwise over four coordinate arrays.
///
/// Axes of length 1 are stretched to match the other operands, the same
/// rules NumPy uses, so an `N x 1` column of origins against a `1 x N` row of
/// destinations yields the full `N x N` matrix. Each element is computed by
/// [`haversine_distance`], so results match the scalar path exactly.
pub fn haversine_broadcast(
    lat1: ArrayView2<'_, f64>,
    lon1: ArrayView2<'_, f64>,
    lat2: ArrayView2<'_, f64>,
    lon2: ArrayView2<'_, f64>,
) -> Result<Array2<f64>, BroadcastError> {
    let shape = [lon1.dim(), lat2.dim(), lon2.dim()]
        .into_iter()
        .try_fold(lat1.dim(), broadcast_shape)?;

    let lat1 = stretch(&lat1, shape)?;
    let lon1 = stretch(&lon1, shape)?;
    let lat2 = stretch(&lat2, shape)?;
    let lon2 = stretch(&lon2, shape)?;

    let mut out = Array2::<f64>::zeros(shape);
    Zip::from(&mut out)
        .and(&lat1)
        .and(&lon1)
        .and(&lat2)
        .and(&lon2)
        .for_each(|d, &la1, &lo1, &la2, &lo2| {
            *d = haversine_distance(la1, lo1, la2, lo2);
        });
    Ok(out)
}

/// All-pairs distance matrix: entry `(i, j)` is the distance from
/// `coords[i]` to `coords[j]`. Symmetric, with an exact-zero diagonal.
///
/// Built by broadcasting an `N x 1` column against its `1 x N` transpose,
/// which always succeeds for a single coordinate set.
pub fn pairwise_distance_matrix(coords: &[Coordinate]) -> Result<Array2<f64>, BroadcastError> {
    let n = coords.len();
    let lats = Array2::from_shape_fn((n, 1), |(i, _)| coords[i].latitude);
    let lons = Array2::from_shape_fn((n, 1), |(i, _)| coords[i].longitude);

    let out = haversine_broadcast(lats.view(), lons.view(), lats.t(), lons.t())?;

    log::debug!(
        "pairwise distance matrix built: {} airports, {} cells",
        out.len_of(Axis(0)),
        out.len()
    );
    Ok(out)
}

fn broadcast_shape(
    left: (usize, usize),
    right: (usize, usize),
) -> Result<(usize, usize), BroadcastError> {
    let axis = |a: usize, b: usize| match (a, b) {
        _ if a == b => Some(a),
        (1, _) => Some(b),
        (_, 1) => Some(a),
        _ => None,
    };
    match (axis(left.0, right.0), axis(left.1, right.1)) {
        (Some(rows), Some(cols)) => Ok((rows, cols)),
        _ => Err(BroadcastError::Incompatible { left, right }),
    }
}

fn stretch<'a>(
    view: &'a ArrayView2<'_, f64>,
    shape: (usize, usize),
) -> Result<ArrayView2<'a, f64>, BroadcastError> {
    view.broadcast(shape).ok_or(BroadcastError::Incompatible {
        left: view.dim(),
        right: shape,
    })
}
