use time::{Duration, OffsetDateTime};

/// `<prefix>-<epoch-ms>`, bumped a millisecond at a time until it is not
/// taken.
pub fn unique_id<F>(prefix: &str, now: OffsetDateTime, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut stamp = now;
    loop {
        let millis = stamp.unix_timestamp_nanos() / 1_000_000;
        let candidate = format!("{prefix}-{millis}");
        if !is_taken(&candidate) {
            return candidate;
        }
        stamp += Duration::milliseconds(1);
    }
}

#[cfg(test)]
mod tests {
    use super::unique_id;
    use time::macros::datetime;

    #[test]
    fn skips_taken_ids() {
        let now = datetime!(2025-01-01 00:00:00 UTC);
        let first = unique_id("user", now, |_| false);
        assert_eq!(first, "user-1735689600000");

        let second = unique_id("user", now, |id| id == first);
        assert_eq!(second, "user-1735689600001");
    }
}
