//! Version resolution.
//!
//! Decides which single version of a directory a query reads. "Current" is
//! date-bounded everywhere: the latest version whose start date is on or
//! before today. Versions without a start date are only reachable by label.

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::error::{RefbookError, RefbookResult};
use crate::store::RefbookStore;
use crate::types::{Directory, Version, VersionSelector};

/// Source of "today" for current-version resolution.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Calendar date in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Resolve the version of `directory` selected by `selector`.
pub fn resolve(
    store: &dyn RefbookStore,
    directory: &Directory,
    selector: &VersionSelector,
    today: NaiveDate,
) -> RefbookResult<Version> {
    let (version, as_of) = match selector {
        VersionSelector::Label(label) => (store.find_version(directory.id, label)?, None),
        VersionSelector::AsOf(date) => (
            store.latest_version_started_by(directory.id, *date)?,
            Some(*date),
        ),
        VersionSelector::Current => (
            store.latest_version_started_by(directory.id, today)?,
            Some(today),
        ),
    };

    match version {
        Some(version) => {
            debug!(
                directory_id = directory.id,
                version = %version.version,
                ?as_of,
                "Resolved version"
            );
            Ok(version)
        }
        None => Err(RefbookError::VersionNotFound {
            directory_id: directory.id,
            label: selector.label().map(str::to_string),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteRefbookStore;
    use crate::types::{NewDirectory, NewVersion};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> (SqliteRefbookStore, Directory) {
        let store = SqliteRefbookStore::in_memory().unwrap();
        let dir = store.insert_directory(&NewDirectory::new("1", "A")).unwrap();
        for (label, start) in [
            ("1.0", Some(date(2021, 1, 1))),
            ("2.0", Some(date(2022, 1, 1))),
            ("3.0", Some(date(2030, 1, 1))),
            ("draft", None),
        ] {
            store
                .insert_version(&NewVersion::new(dir.id, label, start))
                .unwrap();
        }
        (store, dir)
    }

    #[test]
    fn test_label_ignores_dates() {
        let (store, dir) = seeded();
        let today = date(2022, 6, 1);

        let v = resolve(&store, &dir, &VersionSelector::Label("3.0".into()), today).unwrap();
        assert_eq!(v.version, "3.0");

        let v = resolve(&store, &dir, &VersionSelector::Label("draft".into()), today).unwrap();
        assert_eq!(v.start_date, None);
    }

    #[test]
    fn test_unknown_label() {
        let (store, dir) = seeded();
        let err = resolve(
            &store,
            &dir,
            &VersionSelector::Label("9.9".into()),
            date(2022, 6, 1),
        )
        .unwrap_err();
        match err {
            RefbookError::VersionNotFound { directory_id, label } => {
                assert_eq!(directory_id, dir.id);
                assert_eq!(label.as_deref(), Some("9.9"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_as_of_picks_latest_started() {
        let (store, dir) = seeded();
        let today = date(2000, 1, 1);

        let cases = [
            (date(2021, 1, 1), "1.0"),
            (date(2021, 12, 31), "1.0"),
            (date(2022, 1, 1), "2.0"),
            (date(2029, 12, 31), "2.0"),
            (date(2031, 1, 1), "3.0"),
        ];
        for (as_of, expected) in cases {
            let v = resolve(&store, &dir, &VersionSelector::AsOf(as_of), today).unwrap();
            assert_eq!(v.version, expected, "as of {as_of}");
        }

        let err = resolve(&store, &dir, &VersionSelector::AsOf(date(2020, 1, 1)), today)
            .unwrap_err();
        assert!(matches!(err, RefbookError::VersionNotFound { label: None, .. }));
    }

    #[test]
    fn test_current_excludes_future_versions() {
        let (store, dir) = seeded();
        let v = resolve(&store, &dir, &VersionSelector::Current, date(2025, 3, 1)).unwrap();
        assert_eq!(v.version, "2.0");

        let v = resolve(&store, &dir, &VersionSelector::Current, date(2030, 1, 1)).unwrap();
        assert_eq!(v.version, "3.0");
    }

    #[test]
    fn test_current_without_started_versions() {
        let store = SqliteRefbookStore::in_memory().unwrap();
        let dir = store.insert_directory(&NewDirectory::new("1", "A")).unwrap();
        store
            .insert_version(&NewVersion::new(dir.id, "future", Some(date(2099, 1, 1))))
            .unwrap();

        let err = resolve(&store, &dir, &VersionSelector::Current, date(2024, 1, 1)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(date(2022, 2, 2)).today(), date(2022, 2, 2));
    }
}
