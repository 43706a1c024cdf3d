//! Resilient gateway client.
//!
//! # Responsibilities
//! - Resolve the target connection (override or active pointer)
//! - Apply the local rate limiter and the configured refusal policy
//! - Perform the HTTP call with credential, JSON headers and timeouts
//! - Classify each attempt, retry transient outcomes with backoff
//! - Return exactly one typed result per call
//!
//! # Data Flow
//! ```text
//! request(options)
//!     → registry.resolve(options.connection)
//!     → limiter.attempt(connection, class)  ── refused → wait | throw | skip
//!     → loop {
//!           transport.send()
//!           → classifier.classify_with()
//!           → Success: return
//!           → Retryable + attempts left: sleep(backoff or hint), continue
//!           → Terminal / exhausted: typed error
//!       }
//! ```
//!
//! # Design Decisions
//! - Settings are read once per call from an atomic snapshot; a reload never
//!   changes a call halfway through
//! - The rate limiter is consulted once per call, not once per retry
//! - Retry sleeps are async and cancellable; they never block other calls
//! - The active connection is shared client state. Concurrent callers that
//!   switch it observe each other; use `RequestOptions::with_connection` for
//!   per-call isolation

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use arc_swap::ArcSwap;
use serde_json::Value;
use uuid::Uuid;

use crate::config::validation::validate_config;
use crate::config::{ClientConfig, OnLimitReached};
use crate::connection::{ConnectionProfile, ConnectionRegistry};
use crate::error::{GatewayError, Result, TransientCause};
use crate::http::classifier::{ClassifiedOutcome, Classifier, ClassifyContext, RetryReason};
use crate::http::request::{RequestOptions, X_REQUEST_ID};
use crate::http::response::{GatewayResponse, RequestOutcome};
use crate::http::transport::{ReqwestTransport, Transport, TransportRequest};
use crate::lifecycle::Cancellation;
use crate::observability::logging::{LogEvent, LogFields, RequestLogger, TracingLogger};
use crate::observability::metrics::{self, MetricsRecorder, MetricsSink, Tags};
use crate::rate_limit::{Clock, RateLimiter};
use crate::resilience::RetryPolicy;
use crate::routing::Operation;

/// `limit_type` reported when the gateway itself answered 429.
pub const GATEWAY_LIMIT: &str = "gateway";

/// Per-call settings that can be hot-swapped.
#[derive(Debug)]
struct ClientSettings {
    retry: RetryPolicy,
    classifier: Classifier,
    on_limit_reached: OnLimitReached,
    max_wait_seconds: u64,
    credential_header: String,
    timeout: Duration,
    default_connection: String,
    /// Connections that came from the config file, as opposed to runtime registration.
    config_connections: Vec<String>,
}

impl ClientSettings {
    fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            retry: RetryPolicy::from_config(&config.retry)?,
            classifier: Classifier::new(config.retry.retryable_status_codes.iter().copied()),
            on_limit_reached: config.rate_limiting.on_limit_reached,
            max_wait_seconds: config.rate_limiting.max_wait_seconds,
            credential_header: config.http.credential_header.clone(),
            timeout: Duration::from_secs(config.http.timeout_seconds),
            default_connection: config.default_connection.clone(),
            config_connections: config.connections.iter().map(|c| c.name.clone()).collect(),
        })
    }
}

struct ClientInner {
    registry: ConnectionRegistry,
    limiter: RateLimiter,
    settings: ArcSwap<ClientSettings>,
    transport: Arc<dyn Transport>,
    logger: Option<Arc<dyn RequestLogger>>,
    metrics: Option<Arc<dyn MetricsSink>>,
}

/// Builder for [`ResilientClient`].
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    logger: Option<Arc<dyn RequestLogger>>,
    metrics: Option<Arc<dyn MetricsSink>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ClientBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            logger: Some(Arc::new(TracingLogger)),
            metrics: Some(Arc::new(MetricsRecorder)),
            clock: None,
        }
    }

    /// Replace the default `reqwest` transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Logging sink; `None` disables request logging.
    pub fn logger(mut self, logger: Option<Arc<dyn RequestLogger>>) -> Self {
        self.logger = logger;
        self
    }

    /// Metrics sink; `None` disables metrics.
    pub fn metrics(mut self, metrics: Option<Arc<dyn MetricsSink>>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Clock used by the rate limiter.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<ResilientClient> {
        ensure_valid(&self.config)?;

        let registry = ConnectionRegistry::from_config(&self.config.connections, &self.config.default_connection)?;
        let limiter = match self.clock {
            Some(clock) => RateLimiter::with_clock(self.config.rate_limiting.clone(), clock),
            None => RateLimiter::new(self.config.rate_limiting.clone()),
        };
        let settings = ClientSettings::from_config(&self.config)?;
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config.http)?),
        };

        tracing::info!(
            connections = registry.len(),
            default_connection = %self.config.default_connection,
            max_attempts = settings.retry.max_attempts(),
            rate_limiting = self.config.rate_limiting.enabled,
            "Gateway client initialized"
        );

        Ok(ResilientClient {
            inner: Arc::new(ClientInner {
                registry,
                limiter,
                settings: ArcSwap::from_pointee(settings),
                transport,
                logger: self.logger,
                metrics: self.metrics,
            }),
        })
    }
}

/// Client for the gateway. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct ResilientClient {
    inner: Arc<ClientInner>,
}

impl ResilientClient {
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Client with the default transport and sinks.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    pub fn register_connection(&self, name: &str, base_url: &str, credential: &str) -> Result<()> {
        self.inner.registry.register(name, base_url, credential)
    }

    /// Switch the shared active connection. Affects every caller of this client.
    pub fn set_active(&self, name: &str) -> Result<()> {
        self.inner.registry.set_active(name)
    }

    pub fn active_connection(&self) -> String {
        self.inner.registry.active_name()
    }

    /// Swap retry, rate-limit and credential-header settings and sync the
    /// config's connections: new ones are registered, ones dropped from the
    /// config are removed, and a changed `default_connection` becomes active.
    /// Connections added with `register_connection` are left alone.
    /// Transport-level settings (connect timeout, TLS) need a new client.
    pub fn apply_config(&self, config: ClientConfig) -> Result<()> {
        ensure_valid(&config)?;
        let settings = ClientSettings::from_config(&config)?;
        let profiles = config
            .connections
            .iter()
            .map(ConnectionProfile::try_from)
            .collect::<Result<Vec<_>>>()?;

        let registry = &self.inner.registry;
        let previous = self.inner.settings.load_full();
        let default_changed = settings.default_connection != previous.default_connection;
        let default_known = settings.config_connections.contains(&settings.default_connection)
            || registry.contains(&settings.default_connection);
        if default_changed && !default_known {
            return Err(GatewayError::UnknownConnection(settings.default_connection.clone()));
        }

        for profile in profiles {
            registry.insert(profile);
        }
        for name in &previous.config_connections {
            if !settings.config_connections.contains(name) {
                registry.remove(name);
                tracing::info!(connection = %name, "Connection removed by config reload");
            }
        }

        let active_gone = !registry.contains(&registry.active_name());
        if default_changed || (active_gone && default_known) {
            registry.set_active(&settings.default_connection)?;
        }

        self.inner.limiter.reconfigure(config.rate_limiting);
        self.inner.settings.store(Arc::new(settings));
        Ok(())
    }

    /// Execute a table operation against `instance`.
    pub async fn call(&self, operation: Operation, instance: Option<&str>, body: Option<Value>) -> Result<RequestOutcome> {
        let mut options = RequestOptions::for_operation(operation, instance)?;
        options.body = body;
        self.request(options).await
    }

    /// Perform one logical call.
    pub async fn request(&self, options: RequestOptions) -> Result<RequestOutcome> {
        let settings = self.inner.settings.load_full();
        let profile = self.inner.registry.resolve(options.connection.as_deref())?;
        let class = options.class();

        if let Some(skipped) = self.acquire_slot(&settings, &profile, &class, options.cancellation.as_ref()).await? {
            return Ok(skipped);
        }

        let mut url = profile.endpoint_url(&options.endpoint)?;
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(options.query.iter());
        }

        let mut headers = vec![
            (settings.credential_header.clone(), profile.credential().to_string()),
            ("content-type".to_string(), "application/json".to_string()),
            ("accept".to_string(), "application/json".to_string()),
        ];
        headers.extend(options.headers.iter().cloned());

        let mut state = settings.retry.start();
        loop {
            let attempt = state.begin_attempt();
            let request_id = Uuid::new_v4();
            let mut attempt_headers = headers.clone();
            attempt_headers.push((X_REQUEST_ID.to_string(), request_id.to_string()));

            let request = TransportRequest {
                method: options.method,
                url: url.clone(),
                headers: attempt_headers,
                body: options.body.clone(),
                timeout: settings.timeout,
            };

            let mut fields = LogFields::new();
            fields.insert("request_id", request_id.to_string());
            fields.insert("connection", profile.name().to_string());
            fields.insert("method", options.method.to_string());
            fields.insert("url", url.to_string());
            fields.insert("attempt", attempt.to_string());
            self.notify(LogEvent::Request, &fields);

            let started = Instant::now();
            let sent = self.inner.transport.send(request);
            let result = match &options.cancellation {
                Some(cancel) => tokio::select! {
                    result = sent => result,
                    _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
                },
                None => sent.await,
            };
            let elapsed = started.elapsed();
            fields.insert("duration_ms", elapsed.as_millis().to_string());

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    fields.insert("error", e.to_string());
                    self.notify(LogEvent::Error, &fields);
                    self.record_attempt(&profile, &options, "error", elapsed);

                    if !e.is_retryable() {
                        return Err(GatewayError::Configuration(e.to_string()));
                    }
                    state.record_failure(TransientCause::Transport(e.to_string()));
                    if !state.can_retry() {
                        return Err(state.into_error());
                    }
                    let delay = settings.retry.delay_for(attempt, None);
                    tracing::info!(request_id = %request_id, attempt, delay = ?delay, error = %e, "Retrying after transport error");
                    self.record_retry(&profile, "transport");
                    self.sleep(delay, options.cancellation.as_ref()).await?;
                    continue;
                }
            };

            fields.insert("status", response.status.to_string());
            self.notify(LogEvent::Response, &fields);
            self.record_attempt(&profile, &options, &response.status.to_string(), elapsed);

            let ctx = ClassifyContext {
                instance: options.instance_name(),
                retry_after_header: response.header("retry-after"),
            };
            let outcome = settings.classifier.classify_with(response.status, &response.body, &ctx);

            let (reason, status, retry_after, message, body) = match outcome {
                ClassifiedOutcome::Success { status, body } => {
                    return Ok(RequestOutcome::Response(GatewayResponse::new(
                        status,
                        body,
                        profile.name().to_string(),
                        url.to_string(),
                        state.attempts(),
                        request_id,
                    )));
                }
                terminal @ ClassifiedOutcome::TerminalFailure { .. } => {
                    let error = terminal.terminal_error(options.instance_name()).unwrap_or_else(|| {
                        GatewayError::Api { status: terminal.status(), message: String::new(), body: String::new() }
                    });
                    tracing::debug!(request_id = %request_id, status = terminal.status(), error = %error, "Terminal gateway error");
                    return Err(error);
                }
                ClassifiedOutcome::RetryableFailure { reason, status, retry_after, message, body } => {
                    (reason, status, retry_after, message, body)
                }
            };

            let delay = settings.retry.delay_for(attempt, retry_after);
            if reason == RetryReason::RateLimited {
                // A hint beyond the delay ceiling is surfaced rather than slept on.
                let beyond_ceiling = retry_after.is_some() && delay > settings.retry.backoff().max_delay();
                if beyond_ceiling || !state.can_retry() {
                    return Err(GatewayError::RateLimitExceeded {
                        retry_after: retry_after.unwrap_or_else(|| ceil_secs(delay)),
                        limit_type: GATEWAY_LIMIT.to_string(),
                    });
                }
            }
            state.record_failure(TransientCause::Status { status, message, body });
            if !state.can_retry() {
                return Err(state.into_error());
            }

            tracing::info!(request_id = %request_id, attempt, delay = ?delay, status, "Retrying request");
            self.record_retry(&profile, if reason == RetryReason::RateLimited { "rate_limited" } else { "status" });
            self.sleep(delay, options.cancellation.as_ref()).await?;
        }
    }

    /// Take a rate-limit slot or apply the refusal policy.
    ///
    /// Returns `Some` when the call must be skipped.
    async fn acquire_slot(
        &self,
        settings: &ClientSettings,
        profile: &ConnectionProfile,
        class: &str,
        cancel: Option<&Cancellation>,
    ) -> Result<Option<RequestOutcome>> {
        let limiter = &self.inner.limiter;
        let scope = profile.name();
        if limiter.attempt(scope, class) {
            return Ok(None);
        }

        let policy = match settings.on_limit_reached {
            OnLimitReached::Wait => "wait",
            OnLimitReached::Throw => "throw",
            OnLimitReached::Skip => "skip",
        };
        tracing::warn!(connection = %scope, class = %class, policy, "Local rate limit reached");
        self.emit_metric(
            metrics::RATE_LIMITED_TOTAL,
            1.0,
            vec![("class", class.to_string()), ("policy", policy.to_string())],
        );

        match settings.on_limit_reached {
            OnLimitReached::Throw => Err(GatewayError::RateLimitExceeded {
                retry_after: limiter.available_in(scope, class),
                limit_type: class.to_string(),
            }),
            OnLimitReached::Skip => Ok(Some(RequestOutcome::Skipped {
                connection: scope.to_string(),
                operation_class: class.to_string(),
                retry_after: limiter.available_in(scope, class),
            })),
            OnLimitReached::Wait => {
                let acquired = match cancel {
                    Some(cancel) => limiter.wait_cancellable(scope, class, settings.max_wait_seconds, cancel).await?,
                    None => limiter.wait(scope, class, settings.max_wait_seconds).await,
                };
                if acquired {
                    Ok(None)
                } else {
                    Err(GatewayError::RateLimitExceeded {
                        retry_after: limiter.available_in(scope, class),
                        limit_type: class.to_string(),
                    })
                }
            }
        }
    }

    async fn sleep(&self, delay: Duration, cancel: Option<&Cancellation>) -> Result<()> {
        match cancel {
            Some(cancel) => tokio::select! {
                _ = tokio::time::sleep(delay) => Ok(()),
                _ = cancel.cancelled() => Err(GatewayError::Cancelled),
            },
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }

    fn notify(&self, event: LogEvent, fields: &LogFields) {
        if let Some(logger) = &self.inner.logger {
            if catch_unwind(AssertUnwindSafe(|| logger.log(event, fields))).is_err() {
                tracing::debug!(event = event.as_str(), "Request logger panicked; ignored");
            }
        }
    }

    fn emit_metric(&self, name: &'static str, value: f64, tags: Tags) {
        if let Some(sink) = &self.inner.metrics {
            if catch_unwind(AssertUnwindSafe(|| sink.record(name, value, &tags))).is_err() {
                tracing::debug!(metric = name, "Metrics sink panicked; ignored");
            }
        }
    }

    fn record_attempt(&self, profile: &ConnectionProfile, options: &RequestOptions, status: &str, elapsed: Duration) {
        let tags: Tags = vec![
            ("connection", profile.name().to_string()),
            ("method", options.method.to_string()),
            ("status", status.to_string()),
        ];
        self.emit_metric(metrics::REQUESTS_TOTAL, 1.0, tags.clone());
        self.emit_metric(metrics::REQUEST_DURATION_SECONDS, elapsed.as_secs_f64(), tags);
    }

    fn record_retry(&self, profile: &ConnectionProfile, reason: &str) {
        self.emit_metric(
            metrics::RETRIES_TOTAL,
            1.0,
            vec![("connection", profile.name().to_string()), ("reason", reason.to_string())],
        );
    }
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("registry", &self.inner.registry)
            .field("limiter", &self.inner.limiter)
            .finish()
    }
}

fn ensure_valid(config: &ClientConfig) -> Result<()> {
    validate_config(config).map_err(|errors| {
        let joined = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
        GatewayError::Configuration(joined)
    })
}

fn ceil_secs(delay: Duration) -> u64 {
    let secs = delay.as_secs();
    if delay.subsec_nanos() > 0 { secs + 1 } else { secs }
}
