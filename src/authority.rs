//! Interface to the remote sequence authority that allocates number segments.

/// A request for a fresh number segment.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RenewalRequest {
    /// Name of the requesting application.
    pub app_name: String,

    /// Business flow within the application. `app_name` and `biz_type` together must not be
    /// shared with any other requester.
    pub biz_type: String,

    /// Day the segment is requested for, as `YYYYMMDD`. The granted range is exclusive to this
    /// day within the `(app_name, biz_type)` key.
    pub day: String,

    /// Advisory size of the requested range.
    pub step: u32,
}

/// A closed range `[range_start, range_end]` granted by the authority.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RenewalResponse {
    pub range_start: i64,
    pub range_end: i64,
}

impl RenewalResponse {
    /// Checks the shape of the grant, returning it unchanged if usable.
    pub fn validated(self) -> Result<Self, AuthorityError> {
        if self.range_start < 0 || self.range_start > self.range_end {
            Err(AuthorityError::InvalidRange {
                start: self.range_start,
                end: self.range_end,
            })
        } else {
            Ok(self)
        }
    }
}

/// Failure of a renewal call.
#[derive(thiserror::Error, Debug)]
pub enum AuthorityError {
    /// The authority could not be reached or refused the request.
    #[error("sequence authority unavailable: {0}")]
    Unavailable(String),

    /// The authority answered with a range the cache cannot use.
    #[error("sequence authority granted an invalid range [{start}, {end}]")]
    InvalidRange { start: i64, end: i64 },

    /// Any other failure reported by a transport or codec.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A trait that allocates non-overlapping number segments.
///
/// Ranges granted for the same `(app_name, biz_type, day)` must never overlap across callers.
/// Timeouts and retries are the implementor's business; a returned error is treated by the cache
/// as an immediate, final failure for the current identifier.
///
/// Closures with the matching signature implement this trait.
///
/// # Examples
///
/// ```rust
/// use dayseq::{AuthorityError, RenewalRequest, RenewalResponse, SequenceAuthority};
///
/// let authority = |req: &RenewalRequest| {
///     Ok::<_, AuthorityError>(RenewalResponse {
///         range_start: 1,
///         range_end: i64::from(req.step),
///     })
/// };
/// let req = RenewalRequest {
///     app_name: "shop".into(),
///     biz_type: "order".into(),
///     day: "20240101".into(),
///     step: 1_000,
/// };
/// assert_eq!(authority.renew(&req).unwrap().range_end, 1_000);
/// ```
pub trait SequenceAuthority {
    /// Requests a fresh segment.
    fn renew(&self, req: &RenewalRequest) -> Result<RenewalResponse, AuthorityError>;
}

impl<F> SequenceAuthority for F
where
    F: Fn(&RenewalRequest) -> Result<RenewalResponse, AuthorityError>,
{
    fn renew(&self, req: &RenewalRequest) -> Result<RenewalResponse, AuthorityError> {
        self(req)
    }
}
