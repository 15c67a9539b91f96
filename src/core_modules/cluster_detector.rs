// THEORY:
// The `ClusterDetector` is the stateless grouping step of the cluster engine. It
// implements a single-pass, seed-anchored greedy grouping over points in
// ingestion order.
//
// Algorithm steps:
// 1.  **Seeding**: Walk the points in order. The first point not yet claimed by a
//     group becomes the seed of a new group.
// 2.  **Claiming**: Every other unclaimed point whose planar distance to the
//     *seed's own coordinate* is within the threshold joins the seed's group. The
//     distance is never re-measured against the group's growing centroid, and a
//     claimed point is never reconsidered.
// 3.  **Output**: Groups are returned as index lists into the input slice, in
//     seed order. Every input index appears in exactly one group; groups of one
//     are singletons.
//
// Because claiming is anchored on the seed and happens in input order, the result
// is deterministic for a fixed order but depends on that order. Permuting the
// input can legitimately produce a different grouping.

use crate::core_modules::geo_point::GeoPoint;

pub mod cluster_detector {
    use super::*;

    /// Degree-space merge radius for a zoom level: `radius_base / 2^zoom`.
    /// Lower zoom gives a larger radius and more aggressive merging.
    pub fn threshold_for_zoom(radius_base: f64, zoom: u8) -> f64 {
        radius_base / 2f64.powi(zoom as i32)
    }

    /// Partitions `points` into seed-anchored groups of indices.
    pub fn find_groups(points: &[GeoPoint], threshold: f64) -> Vec<Vec<usize>> {
        let mut processed = vec![false; points.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for (seed_index, seed) in points.iter().enumerate() {
            if processed[seed_index] {
                continue;
            }
            processed[seed_index] = true;

            let mut group = vec![seed_index];
            for (candidate_index, candidate) in points.iter().enumerate() {
                if processed[candidate_index] {
                    continue;
                }
                if seed.planar_distance(candidate) <= threshold {
                    processed[candidate_index] = true;
                    group.push(candidate_index);
                }
            }

            groups.push(group);
        }

        groups
    }
}
