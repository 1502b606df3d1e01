use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{AppError, FetchError};
use crate::models::{Course, NewCourseRequest, UpdateCourseRequest};
use crate::services::faults::FaultPolicy;
use crate::services::retry::{RetryOptions, with_retry};
use crate::store::CourseStore;

/// Per-operation simulated round-trip delay.
#[derive(Debug, Clone)]
pub struct LatencyProfile {
    pub list: Duration,
    pub get: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl LatencyProfile {
    /// No artificial delay.
    pub fn zero() -> Self {
        Self {
            list: Duration::ZERO,
            get: Duration::ZERO,
            create: Duration::ZERO,
            update: Duration::ZERO,
            delete: Duration::ZERO,
        }
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(800),
            get: Duration::from_millis(400),
            create: Duration::from_millis(1200),
            update: Duration::from_millis(900),
            delete: Duration::from_millis(600),
        }
    }
}

/// How long the health probe waits for the list call before declaring the
/// service unhealthy.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// The contract the HTTP layer consumes.
#[async_trait]
pub trait CourseService: Send + Sync {
    async fn get_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn get_course(&self, id: i64) -> Result<Course, AppError>;
    async fn create_course(&self, req: NewCourseRequest) -> Result<Course, AppError>;
    async fn update_course(&self, id: i64, req: UpdateCourseRequest) -> Result<Course, AppError>;
    async fn delete_course(&self, id: i64) -> Result<bool, AppError>;
    async fn check_health(&self) -> bool;
}

/// Store operations dressed up as remote calls: each attempt sleeps the
/// operation's simulated latency, draws a fault sample, then hits the store.
/// The whole attempt is wrapped in retry with exponential backoff, so a
/// retried call re-incurs the latency and re-draws the fault.
pub struct CourseApi {
    store: Arc<CourseStore>,
    faults: Arc<dyn FaultPolicy>,
    latency: LatencyProfile,
    retry: RetryOptions,
}

impl CourseApi {
    pub fn new(
        store: Arc<CourseStore>,
        faults: Arc<dyn FaultPolicy>,
        latency: LatencyProfile,
        retry: RetryOptions,
    ) -> Self {
        Self {
            store,
            faults,
            latency,
            retry,
        }
    }

    async fn attempt<T>(
        &self,
        delay: Duration,
        op: impl FnOnce(&CourseStore) -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        tokio::time::sleep(delay).await;
        if let Some(fault) = self.faults.sample() {
            warn!("injected fault: {}", fault);
            return Err(fault);
        }
        op(&self.store)
    }

    /// The full retrying list call as an owned future, so the health probe
    /// can run it on a detached task. `get_courses` awaits it in place.
    fn fetch_courses_task(
        &self,
    ) -> impl Future<Output = Result<Vec<Course>, FetchError>> + Send + 'static {
        let store = Arc::clone(&self.store);
        let faults = Arc::clone(&self.faults);
        let delay = self.latency.list;
        let retry = self.retry.clone();

        async move {
            with_retry(
                || {
                    let store = Arc::clone(&store);
                    let faults = Arc::clone(&faults);
                    async move {
                        tokio::time::sleep(delay).await;
                        if let Some(fault) = faults.sample() {
                            warn!("injected fault: {}", fault);
                            return Err(fault);
                        }
                        Ok(store.list())
                    }
                },
                &retry,
            )
            .await
        }
    }
}

#[async_trait]
impl CourseService for CourseApi {
    async fn get_courses(&self) -> Result<Vec<Course>, AppError> {
        let courses = self.fetch_courses_task().await?;
        debug!("fetched {} active courses", courses.len());
        Ok(courses)
    }

    async fn get_course(&self, id: i64) -> Result<Course, AppError> {
        with_retry(
            || self.attempt(self.latency.get, move |store| store.get(id)),
            &self.retry,
        )
        .await
        .map_err(AppError::from)
    }

    async fn create_course(&self, req: NewCourseRequest) -> Result<Course, AppError> {
        let course = with_retry(
            || {
                let req = req.clone();
                self.attempt(self.latency.create, move |store| store.insert(req))
            },
            &self.retry,
        )
        .await?;
        info!("created course {} ({})", course.id, course.name);
        Ok(course)
    }

    async fn update_course(&self, id: i64, req: UpdateCourseRequest) -> Result<Course, AppError> {
        let course = with_retry(
            || {
                let req = req.clone();
                self.attempt(self.latency.update, move |store| store.update(id, req))
            },
            &self.retry,
        )
        .await?;
        info!("updated course {}", course.id);
        Ok(course)
    }

    async fn delete_course(&self, id: i64) -> Result<bool, AppError> {
        let deleted = with_retry(
            || self.attempt(self.latency.delete, move |store| store.soft_delete(id)),
            &self.retry,
        )
        .await?;
        info!("deleted course {}", id);
        Ok(deleted)
    }

    /// Races the list call against an independent timer. The probe task is
    /// detached: when the timer wins, the slow list keeps running in the
    /// background and its result is discarded.
    async fn check_health(&self) -> bool {
        let probe = tokio::spawn(self.fetch_courses_task());

        match tokio::time::timeout(HEALTH_TIMEOUT, probe).await {
            Ok(Ok(Ok(courses))) => {
                debug!("health probe ok ({} active courses)", courses.len());
                true
            }
            Ok(Ok(Err(err))) => {
                warn!("health probe failed: {}", err);
                false
            }
            Ok(Err(err)) => {
                warn!("health probe task failed: {}", err);
                false
            }
            Err(_) => {
                warn!("health probe timed out after {:?}", HEALTH_TIMEOUT);
                false
            }
        }
    }
}
