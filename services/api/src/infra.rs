use metrics_exporter_prometheus::PrometheusHandle;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tool_curator::curation::EngagementMetrics;
use tool_curator::publishing::{GatewayError, PostReceipt, SocialGateway};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Deterministic when a seed is given, otherwise seeded from OS entropy.
pub(crate) fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Gateway that prints posts to stdout and reports synthetic engagement.
#[derive(Debug)]
pub(crate) struct ConsoleGateway {
    next_id: AtomicU64,
    rng: Mutex<ChaCha8Rng>,
}

impl ConsoleGateway {
    pub(crate) fn new(rng: ChaCha8Rng) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            rng: Mutex::new(rng),
        }
    }
}

impl SocialGateway for ConsoleGateway {
    fn post(&self, text: &str) -> Result<PostReceipt, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let post_id = format!("console-{id}");
        println!("[{post_id}] {text}");
        Ok(PostReceipt { post_id, url: None })
    }

    fn engagement(&self, _post_id: &str) -> Result<EngagementMetrics, GatewayError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| GatewayError::Unavailable("engagement generator poisoned".to_string()))?;
        Ok(EngagementMetrics {
            likes: rng.gen_range(0..40),
            retweets: rng.gen_range(0..12),
            replies: rng.gen_range(0..6),
        })
    }
}
