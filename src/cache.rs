//! Segment cache that serves daily business identifiers from locally held number ranges.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::authority::{AuthorityError, RenewalRequest, RenewalResponse, SequenceAuthority};
use crate::clock::{day_stamp, Clock, SystemClock};
use crate::config::SegmentConfig;
use crate::encoder::encode;
use crate::error::{Error, Result};
use crate::fallback::{DefaultRng, RandSource, RandomFallback};
use crate::host_key::host_key;

/// The `(application, business type)` pair a cache serves.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CacheKey {
    pub app_name: String,
    pub biz_type: String,
}

impl CacheKey {
    pub fn new(app_name: impl Into<String>, biz_type: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            biz_type: biz_type.into(),
        }
    }

    fn matches(&self, app_name: &str, biz_type: &str) -> bool {
        self.app_name == app_name && self.biz_type == biz_type
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_name, self.biz_type)
    }
}

/// The number range a cache currently serves from.
///
/// `cursor` is the last number handed out and `bound` the inclusive end of the range. A freshly
/// constructed cache holds an empty segment without a date.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub struct Segment {
    pub cursor: i64,
    pub bound: i64,
    pub effective_date: Option<NaiveDate>,
}

impl Segment {
    fn is_current(&self, today: NaiveDate) -> bool {
        self.effective_date == Some(today)
    }

    fn has_capacity(&self) -> bool {
        self.cursor < self.bound
    }

    fn needs_renewal(&self, low_watermark: i64) -> bool {
        self.cursor.saturating_add(low_watermark) > self.bound || !self.has_capacity()
    }

    /// Hands out the next number, or `None` once the bound is reached.
    fn advance(&mut self) -> Option<i64> {
        if self.has_capacity() {
            self.cursor += 1;
            Some(self.cursor)
        } else {
            None
        }
    }
}

/// What a call does after inspecting the segment under the lock.
enum Decision {
    Serve(Option<i64>),
    Renew { proactive: bool },
}

/// A range granted by the authority, tagged with how it may be used.
enum Grant {
    /// May replace the cached segment.
    Full(RenewalResponse),

    /// Serves exactly one call; never installed.
    SingleUse(RenewalResponse),
}

/// Holds one in-flight renewal slot for as long as it lives.
struct InFlight<'a>(&'a AtomicU32);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Mints identifiers of the form `{prefix}-{YYYYMMDD}{suffix}` from number segments allocated by
/// a [`SequenceAuthority`].
///
/// Each call either takes the next number of the cached segment, renews the segment first, or,
/// when no number can be obtained, degrades to a randomized suffix beginning with
/// [`FALLBACK_MARKER`](crate::FALLBACK_MARKER). Renewal failures are never reported to the
/// caller.
///
/// The segment is guarded by a mutex held only while it is inspected or replaced, never across
/// the authority call. A separate counter of in-flight renewals decides whether a renewal asks for
/// a full segment or for a single number: the first
/// [`full_step_admissions`](SegmentConfig::full_step_admissions) concurrent renewals request the
/// full step and install the result; later ones request one number for their own call.
///
/// A cache serves exactly one `(application, business type)` pair, fixed by its first call.
///
/// # Examples
///
/// ```rust
/// use dayseq::{AuthorityError, RenewalRequest, RenewalResponse, SegmentCache};
/// use std::sync::atomic::{AtomicI64, Ordering};
///
/// let next = AtomicI64::new(1);
/// let cache = SegmentCache::new(move |req: &RenewalRequest| {
///     let start = next.fetch_add(i64::from(req.step), Ordering::Relaxed);
///     Ok::<_, AuthorityError>(RenewalResponse {
///         range_start: start,
///         range_end: start + i64::from(req.step) - 1,
///     })
/// });
///
/// let id = cache.generate_id("shop", "order", "ORD")?;
/// assert!(id.starts_with("ORD-"));
/// assert!(id.ends_with("AAAAAC")); // 000001
/// # Ok::<(), dayseq::Error>(())
/// ```
#[derive(Debug)]
pub struct SegmentCache<A, C = SystemClock, R = DefaultRng> {
    authority: A,
    clock: C,
    config: SegmentConfig,
    identity: OnceLock<CacheKey>,
    segment: Mutex<Segment>,
    renewals_in_flight: AtomicU32,
    fallback: RandomFallback<R>,
}

impl<A: SequenceAuthority> SegmentCache<A> {
    /// Creates a cache with the default configuration, the local clock, and a fallback generator
    /// salted with this host's [`host_key`](crate::host_key()).
    pub fn new(authority: A) -> Self {
        Self::assemble(
            authority,
            SegmentConfig::default(),
            SystemClock,
            RandomFallback::from_entropy(&host_key()),
        )
    }

    /// Creates a cache with the local clock and a custom configuration.
    pub fn with_config(authority: A, config: SegmentConfig) -> Result<Self> {
        Self::with_parts(
            authority,
            config,
            SystemClock,
            RandomFallback::from_entropy(&host_key()),
        )
    }
}

impl<A, C, R> SegmentCache<A, C, R>
where
    A: SequenceAuthority,
    C: Clock,
    R: RandSource,
{
    /// Creates a cache from every collaborator.
    pub fn with_parts(
        authority: A,
        config: SegmentConfig,
        clock: C,
        fallback: RandomFallback<R>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(authority, config, clock, fallback))
    }

    fn assemble(authority: A, config: SegmentConfig, clock: C, fallback: RandomFallback<R>) -> Self {
        Self {
            authority,
            clock,
            config,
            identity: OnceLock::new(),
            segment: Mutex::new(Segment::default()),
            renewals_in_flight: AtomicU32::new(0),
            fallback,
        }
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// Returns the identity fixed by the first call, if any.
    pub fn identity(&self) -> Option<&CacheKey> {
        self.identity.get()
    }

    /// Returns a copy of the current segment.
    pub fn snapshot(&self) -> Segment {
        *self.segment.lock()
    }

    /// Returns the number of renewal calls currently waiting on the authority.
    pub fn renewals_in_flight(&self) -> u32 {
        self.renewals_in_flight.load(Ordering::Acquire)
    }

    /// Generates an identifier `{prefix}-{YYYYMMDD}{suffix}`.
    ///
    /// Fails only if the cache is already bound to another `(app_name, biz_type)` pair or if the
    /// served number cannot be encoded.
    pub fn generate_id(&self, app_name: &str, biz_type: &str, prefix: &str) -> Result<String> {
        let key = self.bind_identity(app_name, biz_type)?;
        let today = self.clock.today();
        let day = day_stamp(today);

        match self.next_number(key, today, &day) {
            Some(number) if number > 0 => self.render(key, number, prefix, &day),
            _ => {
                let suffix = self.fallback.suffix();
                warn!(
                    app = %key.app_name,
                    biz = %key.biz_type,
                    %suffix,
                    "no segment number available, degrading to a random suffix"
                );
                Ok(format!("{prefix}-{day}{suffix}"))
            }
        }
    }

    /// Generates an identifier `{prefix}-{appended}-{YYYYMMDD}{suffix}`, or the same as
    /// [`generate_id`](Self::generate_id) if `appended` is empty.
    pub fn generate_id_with_appended_prefix(
        &self,
        app_name: &str,
        biz_type: &str,
        prefix: &str,
        appended: &str,
    ) -> Result<String> {
        if appended.is_empty() {
            self.generate_id(app_name, biz_type, prefix)
        } else {
            self.generate_id(app_name, biz_type, &format!("{prefix}-{appended}"))
        }
    }

    fn bind_identity(&self, app_name: &str, biz_type: &str) -> Result<&CacheKey> {
        let key = self
            .identity
            .get_or_init(|| CacheKey::new(app_name, biz_type));
        if key.matches(app_name, biz_type) {
            Ok(key)
        } else {
            let found = CacheKey::new(app_name, biz_type);
            warn!(expected = %key, %found, "cache used under a second identity");
            Err(Error::IdentityMismatch {
                expected: key.clone(),
                found,
            })
        }
    }

    /// Picks the number to serve, renewing the segment if needed. `None` means degrade.
    fn next_number(&self, key: &CacheKey, today: NaiveDate, day: &str) -> Option<i64> {
        let decision = {
            let mut segment = self.segment.lock();
            if !segment.is_current(today) {
                debug!(
                    app = %key.app_name,
                    biz = %key.biz_type,
                    date = ?segment.effective_date,
                    %day,
                    "segment not valid for today"
                );
                Decision::Renew { proactive: false }
            } else if !segment.needs_renewal(self.config.low_watermark) {
                Decision::Serve(segment.advance())
            } else if self.renewals_in_flight() > 0 && segment.has_capacity() {
                // a renewal is already under way; keep draining the current segment
                Decision::Serve(segment.advance())
            } else {
                debug!(
                    app = %key.app_name,
                    biz = %key.biz_type,
                    cursor = segment.cursor,
                    bound = segment.bound,
                    "segment running low"
                );
                Decision::Renew { proactive: true }
            }
        };

        let proactive = match decision {
            Decision::Serve(number) => return number,
            Decision::Renew { proactive } => proactive,
        };

        match self.renew(key, day) {
            Ok(Grant::Full(grant)) => self.install(grant, today),
            Ok(Grant::SingleUse(grant)) => Some(grant.range_start),
            Err(err) => {
                error!(
                    app = %key.app_name,
                    biz = %key.biz_type,
                    %day,
                    error = %err,
                    "segment renewal failed"
                );
                if proactive {
                    let mut segment = self.segment.lock();
                    if segment.is_current(today) {
                        return segment.advance();
                    }
                }
                None
            }
        }
    }

    /// Asks the authority for a range, downgrading to a single number if enough renewals are
    /// already in flight.
    fn renew(&self, key: &CacheKey, day: &str) -> std::result::Result<Grant, AuthorityError> {
        let admitted = self.renewals_in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        let _slot = InFlight(&self.renewals_in_flight);

        let single_use = admitted > self.config.full_step_admissions;
        let req = RenewalRequest {
            app_name: key.app_name.clone(),
            biz_type: key.biz_type.clone(),
            day: day.to_owned(),
            step: if single_use { 1 } else { self.config.step },
        };
        debug!(
            app = %req.app_name,
            biz = %req.biz_type,
            day = %req.day,
            step = req.step,
            in_flight = admitted,
            "requesting segment"
        );

        let grant = self.authority.renew(&req)?.validated()?;
        Ok(if single_use {
            Grant::SingleUse(grant)
        } else {
            Grant::Full(grant)
        })
    }

    /// Installs a full grant for `today` and returns the number to serve.
    ///
    /// A grant that would not extend the current segment (the loser of a renewal race) is not
    /// installed; the current segment advances instead. A grant for a day older than the cached
    /// segment serves its first number without being installed.
    fn install(&self, grant: RenewalResponse, today: NaiveDate) -> Option<i64> {
        let mut segment = self.segment.lock();

        if segment.effective_date.is_some_and(|date| date > today) {
            debug!(?today, "grant outdated by a newer segment, using it once");
            return Some(grant.range_start);
        }

        if segment.is_current(today)
            && (grant.range_end <= segment.bound || grant.range_start <= segment.cursor)
        {
            debug!(
                start = grant.range_start,
                end = grant.range_end,
                cursor = segment.cursor,
                bound = segment.bound,
                "grant does not extend the current segment, advancing instead"
            );
            return segment.advance();
        }

        let previous = *segment;
        *segment = Segment {
            cursor: grant.range_start,
            bound: grant.range_end,
            effective_date: Some(today),
        };
        info!(
            cursor = segment.cursor,
            bound = segment.bound,
            date = %today,
            previous_cursor = previous.cursor,
            previous_bound = previous.bound,
            "segment replaced"
        );
        Some(segment.cursor)
    }

    fn render(&self, key: &CacheKey, number: i64, prefix: &str, day: &str) -> Result<String> {
        let suffix = encode(number, self.config.digit_width).map_err(|err| {
            error!(app = %key.app_name, biz = %key.biz_type, error = %err, "could not encode number");
            err
        })?;
        Ok(format!("{prefix}-{day}{suffix}"))
    }
}
