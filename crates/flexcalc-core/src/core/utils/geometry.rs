use nalgebra::Point3;

/// Root-mean-square deviation between two equally sized coordinate sets.
///
/// Returns `None` if the sets differ in length or are empty; no partial comparison is
/// ever performed.
pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

/// Adds `coords / divisor` onto `accumulator`, element by element.
///
/// Dividing before summing keeps the running sums at the magnitude of a single frame,
/// which matters for long trajectories with large coordinates.
///
/// Returns `false` without touching the accumulator when the lengths differ.
pub fn accumulate_scaled(
    accumulator: &mut [Point3<f64>],
    coords: &[Point3<f64>],
    divisor: f64,
) -> bool {
    if accumulator.len() != coords.len() {
        return false;
    }
    for (acc, p) in accumulator.iter_mut().zip(coords.iter()) {
        *acc += p.coords / divisor;
    }
    true
}
