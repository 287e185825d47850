use kstep::ParamGuard;
use kstep_clustering::{KMeans, KMeansError, KMeansInit, KMeansSession, ManualSubmission};
use ndarray::array;
use ndarray_rand::rand::SeedableRng;
use rand_isaac::Isaac64Rng;

// Drive a k-means session the way an interactive front-end would: one step per "frame",
// printing the snapshot a plotting layer would consume after each of them.
fn main() -> Result<(), KMeansError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let init: KMeansInit = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "kmeans++".to_string())
        .parse()?;

    let params = KMeans::params_with_rng(3, Isaac64Rng::seed_from_u64(42))
        .init_method(init)
        .check()?;
    let mut session = KMeansSession::new(params);
    session.initialize()?;

    if init == KMeansInit::Manual {
        // Clicks on the scatter plot, in a real front-end
        for center in [array![-5., -5.], array![0., 5.], array![5., -5.]].iter() {
            match session.submit_manual_center(center)? {
                ManualSubmission::StillCollecting { missing } => {
                    println!("center accepted, {} to go", missing)
                }
                ManualSubmission::Ready => println!("centers committed"),
                ManualSubmission::RejectedFull => println!("center ignored"),
            }
        }
    }

    let mut frame = 0;
    while !session.export_state().converged && frame < 100 {
        session.step()?;
        frame += 1;
        let state = session.export_state();
        println!(
            "frame {}: {}",
            frame,
            serde_json::to_string(&state.centroids).expect("snapshot serializes")
        );
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&session.export_state().assignment)
            .expect("snapshot serializes")
    );
    Ok(())
}
