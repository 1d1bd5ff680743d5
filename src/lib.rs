//! Short, human-readable daily business identifiers served from cached number segments
//!
//! ```rust
//! use dayseq::{AuthorityError, RenewalRequest, RenewalResponse, SegmentCache};
//!
//! // stands in for a call to the remote sequence authority
//! let authority = |req: &RenewalRequest| {
//!     Ok::<_, AuthorityError>(RenewalResponse {
//!         range_start: 1,
//!         range_end: i64::from(req.step),
//!     })
//! };
//!
//! let cache = SegmentCache::new(authority);
//! let id = cache.generate_id("shop", "order", "ORD")?;
//! println!("{}", id); // e.g. "ORD-20240101AAAAAC"
//! # Ok::<(), dayseq::Error>(())
//! ```
//!
//! # Identifier layout
//!
//! ```text
//! ORD-20240101AAAAAC      ORD-20240101YBCAKQZPWMBA
//! \_/ \______/\____/      \_/ \______/|\_/\______/
//! prefix  day  number     prefix  day | host random
//!                                     marker
//! ```
//!
//! Where:
//!
//! - `prefix` is chosen by the caller and may itself contain `-`.
//! - `day` is the local date as `YYYYMMDD`. A number segment is never reused across days.
//! - A segment number is zero-padded to a configured width (six digits by default) and each digit
//!   is replaced by a letter from [`DIGIT_LETTERS`] (`0` → `A`, `1` → `C`, ... `9` → `U`).
//! - When no segment number is available, for example while the sequence authority is
//!   unreachable, the suffix is random instead: the reserved [`FALLBACK_MARKER`] `Y`, three letters
//!   derived from a host key, and eight random letters.
//!
//! A [`SegmentCache`] asks a [`SequenceAuthority`] for a range of numbers (10,000 by default) and
//! hands them out locally. It renews the range on the first call of each day and when fewer than
//! a configured number remain. Renewal failures never reach the caller: the cache keeps serving
//! what remains of its segment and falls back to random suffixes once it runs dry. The fallback
//! trades a small collision probability for availability.
//!
//! Only one process-local cache exists per `(application, business type)` pair. Caches in
//! different processes stay disjoint because the authority never grants overlapping ranges.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod authority;
pub use authority::{AuthorityError, RenewalRequest, RenewalResponse, SequenceAuthority};

mod cache;
pub use cache::{CacheKey, Segment, SegmentCache};

mod clock;
pub use clock::{Clock, SystemClock};

mod config;
pub use config::{ConfigError, SegmentConfig};

mod encoder;
pub use encoder::{decode, encode, encode_digits, EncodeError, DIGIT_LETTERS};

mod error;
pub use error::{Error, Result};

pub mod fallback;
#[doc(inline)]
pub use fallback::{is_fallback_suffix, RandomFallback, FALLBACK_MARKER, FALLBACK_SUFFIX_LEN};

mod host_key;
pub use host_key::{host_key, host_key_from};

mod id;
pub use id::{BusinessId, Origin, ParseError};
