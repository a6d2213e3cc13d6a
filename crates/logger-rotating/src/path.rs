//! Destination naming and rotation boundaries

use crate::config::RotationPolicy;

use chrono::{DateTime, Datelike, NaiveTime, TimeDelta, TimeZone, Timelike};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where records for one time bucket are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Rotation directory beneath the base directory
    pub dir: PathBuf,
    /// File name inside `dir`
    pub file_name: String,
}

impl Destination {
    /// Compute the destination for the bucket containing `at`.
    ///
    /// `suffix` is appended verbatim and must already include any
    /// compression extension.
    pub fn for_instant<Tz: TimeZone>(
        base: &Path,
        policy: RotationPolicy,
        suffix: &str,
        at: &DateTime<Tz>,
    ) -> Self {
        let (dir_name, file_stem) = match policy {
            RotationPolicy::Daily => (
                format!("{:04}-{:02}", at.year(), at.month()),
                format!("{:02}", at.day()),
            ),
            RotationPolicy::Hourly => (
                format!("{:04}-{:02}-{:02}", at.year(), at.month(), at.day()),
                format!("{:02}", at.hour()),
            ),
        };

        Self {
            dir: base.join(dir_name),
            file_name: format!("{file_stem}{suffix}"),
        }
    }

    /// Full path of the destination file
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// The first policy boundary strictly after `now`: the next midnight for
/// [`RotationPolicy::Daily`], the next top of the hour for
/// [`RotationPolicy::Hourly`].
///
/// Boundaries are computed on the local calendar of `now`'s time zone. If the
/// boundary falls in a DST gap, one full period from `now` is used instead.
pub fn next_boundary<Tz: TimeZone>(policy: RotationPolicy, now: &DateTime<Tz>) -> DateTime<Tz> {
    let local = now.naive_local();
    let midnight = local.date().and_time(NaiveTime::MIN);
    let bucket_start = match policy {
        RotationPolicy::Daily => midnight,
        RotationPolicy::Hourly => midnight + TimeDelta::hours(i64::from(local.hour())),
    };
    let next = bucket_start + policy.period();

    now.timezone()
        .from_local_datetime(&next)
        .earliest()
        .unwrap_or_else(|| now.clone() + policy.period())
}

/// Wall-clock time remaining until [`next_boundary`]
pub fn until_next_boundary<Tz: TimeZone>(policy: RotationPolicy, now: &DateTime<Tz>) -> Duration {
    (next_boundary(policy, now) - now.clone())
        .to_std()
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_daily_destination() {
        let dest = Destination::for_instant(
            Path::new("/tmp/x"),
            RotationPolicy::Daily,
            ".log",
            &at(2024, 3, 7, 10, 0, 5),
        );

        assert_eq!(dest.dir, PathBuf::from("/tmp/x/2024-03"));
        assert_eq!(dest.file_name, "07.log");
        assert_eq!(dest.path(), PathBuf::from("/tmp/x/2024-03/07.log"));
    }

    #[test]
    fn test_hourly_destination() {
        let dest = Destination::for_instant(
            Path::new("/tmp/x"),
            RotationPolicy::Hourly,
            ".log",
            &at(2024, 3, 7, 9, 59, 59),
        );

        assert_eq!(dest.path(), PathBuf::from("/tmp/x/2024-03-07/09.log"));
    }

    #[test]
    fn test_compressed_suffix_is_appended() {
        let dest = Destination::for_instant(
            Path::new("/tmp/x"),
            RotationPolicy::Hourly,
            ".log.gz",
            &at(2024, 12, 31, 23, 0, 0),
        );

        assert_eq!(dest.path(), PathBuf::from("/tmp/x/2024-12-31/23.log.gz"));
    }

    #[test]
    fn test_destination_uses_local_calendar() {
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let instant = at(2024, 1, 31, 20, 30, 0).with_timezone(&offset);
        let dest =
            Destination::for_instant(Path::new("base"), RotationPolicy::Daily, ".log", &instant);

        assert_eq!(dest.path(), PathBuf::from("base/2024-02/01.log"));
    }

    #[test]
    fn test_next_boundary_hourly() {
        let now = at(2024, 3, 7, 10, 0, 5);
        assert_eq!(
            next_boundary(RotationPolicy::Hourly, &now),
            at(2024, 3, 7, 11, 0, 0)
        );
        assert_eq!(
            until_next_boundary(RotationPolicy::Hourly, &now),
            Duration::from_secs(3595)
        );
    }

    #[test]
    fn test_next_boundary_daily() {
        let now = at(2024, 2, 28, 23, 59, 0);
        assert_eq!(
            next_boundary(RotationPolicy::Daily, &now),
            at(2024, 2, 29, 0, 0, 0)
        );
        assert_eq!(
            until_next_boundary(RotationPolicy::Daily, &now),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_boundary_instant_schedules_full_period() {
        let now = at(2024, 3, 7, 11, 0, 0);
        assert_eq!(
            until_next_boundary(RotationPolicy::Hourly, &now),
            RotationPolicy::Hourly.period()
        );

        let midnight = at(2024, 3, 8, 0, 0, 0);
        assert_eq!(
            until_next_boundary(RotationPolicy::Daily, &midnight),
            RotationPolicy::Daily.period()
        );
    }

    #[test]
    fn test_last_hour_of_year() {
        let now = at(2024, 12, 31, 23, 30, 0);
        assert_eq!(
            next_boundary(RotationPolicy::Hourly, &now),
            at(2025, 1, 1, 0, 0, 0)
        );
    }
}
