use clue::cluster::{Clue, ClueResult, Domain, PointSet, OUTLIER};
use proptest::prelude::*;

fn cloud() -> impl Strategy<Value = Vec<Vec<f32>>> {
    prop::collection::vec(prop::collection::vec(-5.0f32..5.0, 2), 1..150)
}

fn params() -> impl Strategy<Value = (f32, f32, f32)> {
    (0.2f32..1.5, 1.0f32..4.0, 0.2f32..2.0)
}

fn cluster(rows: &[Vec<f32>], clue: &Clue) -> ClueResult {
    let points = PointSet::from_rows_unweighted(rows).unwrap();
    clue.cluster(&points, &Domain::unbounded(2)).unwrap()
}

fn distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_labels_are_well_formed(
        data in cloud(),
        (dc, rhoc, dm) in params(),
        ppt in 1usize..40,
    ) {
        let result = cluster(&data, &Clue::new(dc, rhoc, dm).with_points_per_tile(ppt));
        let k = result.n_clusters() as i32;

        prop_assert_eq!(result.len(), data.len());
        for &id in &result.cluster_ids {
            prop_assert!(id == OUTLIER || (0..k).contains(&id));
        }

        // Exactly one seed per cluster, and seeds are never outliers.
        let mut seeds_per_cluster = vec![0usize; result.n_clusters()];
        for s in result.seeds() {
            let id = result.cluster_ids[s];
            prop_assert!(id >= 0);
            seeds_per_cluster[id as usize] += 1;
        }
        prop_assert!(seeds_per_cluster.iter().all(|&c| c == 1));
    }

    #[test]
    fn prop_same_input_same_output(data in cloud(), (dc, rhoc, dm) in params()) {
        let clue = Clue::new(dc, rhoc, dm);
        let first = cluster(&data, &clue);
        let second = cluster(&data, &clue);
        prop_assert_eq!(first.cluster_ids, second.cluster_ids);
        prop_assert_eq!(first.is_seed, second.is_seed);
    }

    #[test]
    fn prop_tiling_does_not_change_result(data in cloud(), (dc, rhoc, dm) in params()) {
        let coarse = cluster(&data, &Clue::new(dc, rhoc, dm).with_points_per_tile(1000));
        let fine = cluster(&data, &Clue::new(dc, rhoc, dm).with_points_per_tile(1));
        prop_assert_eq!(coarse.cluster_ids, fine.cluster_ids);
        prop_assert_eq!(coarse.is_seed, fine.is_seed);
    }

    #[test]
    fn prop_raising_threshold_never_removes_outliers(
        data in cloud(),
        (dc, rhoc, dm) in params(),
        raise in 0.0f32..5.0,
    ) {
        let low = cluster(&data, &Clue::new(dc, rhoc, dm));
        let high = cluster(&data, &Clue::new(dc, rhoc + raise, dm));
        prop_assert!(high.n_outliers() >= low.n_outliers());
    }

    #[test]
    fn prop_follower_links_are_local_and_uphill(data in cloud(), (dc, rhoc, dm) in params()) {
        let result = cluster(&data, &Clue::new(dc, rhoc, dm));
        for (i, nh) in result.nearest_higher.iter().enumerate() {
            let Some(j) = *nh else { continue };
            prop_assert!(distance(&data[i], &data[j]) <= dm + 1e-5);
            let (ri, rj) = (result.densities[i], result.densities[j]);
            prop_assert!(rj > ri || (rj == ri && j > i));
            // A single hop never joins points further apart than dc + dm
            // along every axis.
            let far = data[i].iter().zip(&data[j]).all(|(a, b)| (a - b).abs() > dc + dm);
            prop_assert!(!far);
        }
    }
}

#[cfg(feature = "parallel")]
mod parallel {
    use super::*;
    use clue::cluster::backend::ParallelBackend;
    use clue::cluster::ExecutionConfig;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_parallel_matches_serial(
            data in cloud(),
            (dc, rhoc, dm) in params(),
            block in 1usize..64,
        ) {
            let clue = Clue::new(dc, rhoc, dm).with_points_per_tile(8);
            let points = PointSet::from_rows_unweighted(&data).unwrap();
            let domain = Domain::unbounded(2);

            let serial = clue.cluster(&points, &domain).unwrap();
            let config = ExecutionConfig::default().with_threads(3).with_block_size(block);
            let backend = ParallelBackend::new(&config).unwrap();
            let parallel = clue.cluster_with(&points, &domain, &backend).unwrap();

            prop_assert_eq!(&serial.cluster_ids, &parallel.cluster_ids);
            prop_assert_eq!(&serial.is_seed, &parallel.is_seed);
            prop_assert_eq!(serial.n_clusters(), parallel.n_clusters());
        }
    }
}
