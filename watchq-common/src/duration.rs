//! Video duration strings
//!
//! Durations are stored as display strings, `M:SS` or `H:MM:SS`, exactly as
//! they were formatted when the video was added. Filtering works on a coarse
//! "steps" value: whole minutes including the hours portion, seconds ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) of the short bucket, in steps
const SHORT_MAX_STEPS: u64 = 5;
/// Upper bound (inclusive) of the medium bucket, in steps
const MEDIUM_MAX_STEPS: u64 = 20;

static ISO8601_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("valid duration regex")
});

/// Length class used by the queue view filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationBucket {
    /// No duration filtering
    #[default]
    All,
    /// Under 5 minutes
    Short,
    /// 5 to 20 minutes inclusive
    Medium,
    /// Over 20 minutes
    Long,
}

impl DurationBucket {
    /// Classify a stored duration string
    ///
    /// Returns `None` when the duration is absent or not in `M:SS` /
    /// `H:MM:SS` form; such items only pass the `All` filter.
    pub fn of(duration: Option<&str>) -> Option<Self> {
        let steps = duration.and_then(duration_steps)?;
        Some(Self::from_steps(steps))
    }

    /// Bucket for a steps value (`H*60 + M`)
    pub fn from_steps(steps: u64) -> Self {
        if steps < SHORT_MAX_STEPS {
            DurationBucket::Short
        } else if steps <= MEDIUM_MAX_STEPS {
            DurationBucket::Medium
        } else {
            DurationBucket::Long
        }
    }

    /// True when an item with this duration passes the filter
    pub fn admits(self, duration: Option<&str>) -> bool {
        match self {
            DurationBucket::All => true,
            bucket => Self::of(duration) == Some(bucket),
        }
    }

}

/// Compute `H*60 + M` for `H:MM:SS`, or `M` for `M:SS`
///
/// The seconds field must be numeric but does not contribute. An hours
/// field too large to convert counts as unparseable.
///
/// # Examples
///
/// ```
/// use watchq_common::duration::duration_steps;
///
/// assert_eq!(duration_steps("4:59"), Some(4));
/// assert_eq!(duration_steps("1:15:30"), Some(75));
/// assert_eq!(duration_steps("live"), None);
/// ```
pub fn duration_steps(duration: &str) -> Option<u64> {
    let fields: Vec<u64> = duration
        .trim()
        .split(':')
        .map(|field| field.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    match fields.as_slice() {
        [minutes, _seconds] => Some(*minutes),
        [hours, minutes, _seconds] => hours.checked_mul(60)?.checked_add(*minutes),
        _ => None,
    }
}

/// Convert an ISO-8601 duration (`PT1H2M10S`) to display form
///
/// `H:MM:SS` when there is an hours component, otherwise `M:SS`.
/// Input that does not look like a duration yields `0:00`.
///
/// # Examples
///
/// ```
/// use watchq_common::duration::format_iso8601;
///
/// assert_eq!(format_iso8601("PT1H2M10S"), "1:02:10");
/// assert_eq!(format_iso8601("PT4M5S"), "4:05");
/// assert_eq!(format_iso8601("garbage"), "0:00");
/// ```
pub fn format_iso8601(iso: &str) -> String {
    let Some(caps) = ISO8601_DURATION.captures(iso) else {
        return "0:00".to_string();
    };

    let field = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let (hours, minutes, seconds) = (field(1), field(2), field(3));

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
