use std::sync::Arc;

use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use reqwest::Url;
use tracing::{debug, warn};

use crate::domain::{Comment, LOADTEST_USERNAME, RequestKind};
use crate::error::{HttpError, RequestError};
use crate::metrics::Stats;
use crate::shutdown::{ShutdownReceiver, shutdown_requested, wait_for_shutdown};

use super::backoff::BackoffRequester;
use super::transport::Transport;

/// Length of the random query key and value added to every request.
pub const QUERY_TOKEN_LEN: usize = 10;
/// Length of the random message posted with every comment.
pub const MESSAGE_LEN: usize = 30;
/// Probability of choosing `GET` for an iteration.
const GET_PROBABILITY: f64 = 0.5;
/// Cap on latency samples reserved up front per worker.
const MAX_PREALLOCATED_SAMPLES: usize = 65_536;

/// Absolute URLs of the two guestbook endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    list_comments: Url,
    add_comment: Url,
}

impl Endpoints {
    /// Resolve both endpoints against the service base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoints cannot be joined onto `base`.
    pub fn new(base: &Url) -> Result<Self, HttpError> {
        let mut root = base.clone();
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        root.set_query(None);
        let join = |path: &str| {
            root.join(path).map_err(|err| HttpError::JoinUrlFailed {
                url: root.to_string(),
                source: err,
            })
        };
        Ok(Self {
            list_comments: join(RequestKind::Get.path())?,
            add_comment: join(RequestKind::Post.path())?,
        })
    }

    #[must_use]
    pub const fn for_kind(&self, kind: RequestKind) -> &Url {
        match kind {
            RequestKind::Get => &self.list_comments,
            RequestKind::Post => &self.add_comment,
        }
    }
}

/// One iteration's request, decided before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedRequest {
    ListComments { url: Url },
    AddComment { url: Url, comment: Comment },
}

impl PlannedRequest {
    /// Pick `GET` or `POST` with equal odds and attach a random
    /// `key=value` query pair so no two URLs are alike.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, endpoints: &Endpoints) -> Self {
        let kind = if rng.gen_bool(GET_PROBABILITY) {
            RequestKind::Get
        } else {
            RequestKind::Post
        };
        let key = random_string(rng, QUERY_TOKEN_LEN);
        let value = random_string(rng, QUERY_TOKEN_LEN);
        let mut url = endpoints.for_kind(kind).clone();
        url.query_pairs_mut().append_pair(&key, &value);

        match kind {
            RequestKind::Get => PlannedRequest::ListComments { url },
            RequestKind::Post => PlannedRequest::AddComment {
                url,
                comment: Comment::new(LOADTEST_USERNAME, random_string(rng, MESSAGE_LEN)),
            },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match self {
            PlannedRequest::ListComments { .. } => RequestKind::Get,
            PlannedRequest::AddComment { .. } => RequestKind::Post,
        }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        match self {
            PlannedRequest::ListComments { url } | PlannedRequest::AddComment { url, .. } => url,
        }
    }
}

/// Random ASCII alphanumeric string of `len` characters.
pub fn random_string<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Split `total` iterations across `workers` so the shares differ by at most
/// one and add up to `total`.
#[must_use]
pub fn split_iterations(total: u64, workers: usize) -> Vec<u64> {
    let count = u64::try_from(workers).unwrap_or(u64::MAX);
    let Some(base) = total.checked_div(count) else {
        return Vec::new();
    };
    let remainder = total.checked_rem(count).unwrap_or(0);
    (0..count)
        .map(|index| {
            if index < remainder {
                base.saturating_add(1)
            } else {
                base
            }
        })
        .collect()
}

/// Final stats of a worker, sent once over the results channel.
#[derive(Debug)]
pub struct WorkerReport {
    pub worker: usize,
    pub stats: Stats,
    pub interrupted: bool,
}

/// Runs a fixed number of sequential request iterations.
pub struct Worker<T> {
    id: usize,
    iterations: u64,
    rng: StdRng,
    requester: Arc<BackoffRequester<T>>,
    endpoints: Arc<Endpoints>,
}

impl<T: Transport> Worker<T> {
    #[must_use]
    pub const fn new(
        id: usize,
        iterations: u64,
        rng: StdRng,
        requester: Arc<BackoffRequester<T>>,
        endpoints: Arc<Endpoints>,
    ) -> Self {
        Self {
            id,
            iterations,
            rng,
            requester,
            endpoints,
        }
    }

    /// Run every iteration. Failed requests are counted, never fatal; a
    /// shutdown signal ends the run early with the stats gathered so far.
    pub async fn run(mut self, mut shutdown_rx: ShutdownReceiver) -> WorkerReport {
        let capacity = usize::try_from(self.iterations).unwrap_or(usize::MAX);
        let mut stats = Stats::with_capacity(capacity.min(MAX_PREALLOCATED_SAMPLES));
        let mut interrupted = false;

        for _ in 0..self.iterations {
            if shutdown_requested(&shutdown_rx) {
                interrupted = true;
                break;
            }

            let request = PlannedRequest::random(&mut self.rng, &self.endpoints);
            let kind = request.kind();
            let outcome = tokio::select! {
                () = wait_for_shutdown(&mut shutdown_rx) => Err(RequestError::Cancelled),
                result = self.requester.send(&request) => result,
            };

            match outcome {
                Ok(report) => stats.record_success(kind, &report),
                Err(RequestError::Cancelled) => {
                    interrupted = true;
                    break;
                }
                Err(err) => {
                    warn!(worker = self.id, "{} request error: {}", kind.as_str(), err);
                    stats.record_error();
                }
            }
        }

        debug!(
            worker = self.id,
            completed = stats.completed(),
            errors = stats.errors,
            "Worker finished."
        );
        WorkerReport {
            worker: self.id,
            stats,
            interrupted,
        }
    }
}
