//! CLUE on a small 2D dataset, with one serial and one parallel run.
//!
//! Set `RUST_LOG=debug` to see the per-stage trace.

use clue::cluster::{backend, Clue, Domain, ExecutionConfig, PointSet, OUTLIER};
use tracing_subscriber::EnvFilter;

fn main() -> clue::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Three groups in 2D plus two stray points.
    let data: Vec<Vec<f32>> = vec![
        // Group A (near origin)
        vec![0.0, 0.0],
        vec![0.1, 0.2],
        vec![0.2, 0.1],
        vec![-0.1, 0.1],
        // Group B (near (5, 5))
        vec![5.0, 5.0],
        vec![5.1, 4.9],
        vec![4.9, 5.1],
        vec![5.2, 5.2],
        // Group C (near (10, 0))
        vec![10.0, 0.0],
        vec![10.1, 0.1],
        vec![9.9, -0.1],
        vec![10.2, 0.2],
        // Strays
        vec![2.5, 8.0],
        vec![7.5, -4.0],
    ];
    let points = PointSet::from_rows_unweighted(&data)?;
    let domain = Domain::unbounded(2);
    let clue = Clue::new(0.5, 2.0, 1.0);

    let result = clue.cluster(&points, &domain)?;
    println!(
        "=== CLUE serial (dc=0.5, rhoc=2.0, dm=1.0): {} clusters, {} outliers ===",
        result.n_clusters(),
        result.n_outliers()
    );
    for (i, &id) in result.cluster_ids.iter().enumerate() {
        let tag = if id == OUTLIER {
            "OUTLIER".to_string()
        } else if result.is_seed[i] == 1 {
            format!("cluster {id} (seed)")
        } else {
            format!("cluster {id}")
        };
        println!(
            "  point {:2} ({:5.1}, {:5.1}) rho={:4.1} => {}",
            i, data[i][0], data[i][1], result.densities[i], tag
        );
    }

    for (id, centroid) in result.centroids(&points, &domain)?.iter().enumerate() {
        println!("  centroid {id}: ({:5.2}, {:5.2})", centroid[0], centroid[1]);
    }
    let metric = clue.metric();
    if let Some(s) = result.silhouette(&points, &domain, metric)? {
        println!("  silhouette: {s:.3}");
    }
    if let Some(db) = result.davies_bouldin(&points, &domain, metric)? {
        println!("  davies-bouldin: {db:.3}");
    }

    println!("\navailable backends: {:?}", backend::available());
    match backend::create("cpu parallel", &ExecutionConfig::default().with_threads(2)) {
        Ok(parallel) => {
            let again = clue.cluster_with(&points, &domain, parallel.as_ref())?;
            println!(
                "parallel run agrees with serial: {}",
                again.cluster_ids == result.cluster_ids
            );
        }
        Err(e) => println!("parallel backend: {e}"),
    }

    Ok(())
}
