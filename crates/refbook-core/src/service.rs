//! Query service: the read operations exposed over HTTP.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{RefbookError, RefbookResult};
use crate::resolver::{resolve, Clock, SystemClock};
use crate::store::RefbookStore;
use crate::types::{
    Directory, DirectoryDetail, DirectorySummary, ElementCheck, ElementView, VersionSelector,
    VersionView,
};

/// Read-only queries over a reference-data store.
///
/// Every operation is a pure read: repeating a call with the same inputs
/// against the same data yields the same result.
#[derive(Clone)]
pub struct RefbookService {
    store: Arc<dyn RefbookStore>,
    clock: Arc<dyn Clock>,
}

impl RefbookService {
    /// Create a service that resolves "current" against the system clock.
    pub fn new(store: Arc<dyn RefbookStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn RefbookStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The underlying store.
    pub fn store(&self) -> &dyn RefbookStore {
        self.store.as_ref()
    }

    fn directory(&self, directory_id: i64) -> RefbookResult<Directory> {
        self.store
            .get_directory(directory_id)?
            .ok_or(RefbookError::DirectoryNotFound { directory_id })
    }

    /// List directories, optionally only those with a version started by `as_of`.
    pub fn list_directories(
        &self,
        as_of: Option<NaiveDate>,
    ) -> RefbookResult<Vec<DirectorySummary>> {
        let directories = match as_of {
            Some(date) => self.store.list_directories_started_by(date)?,
            None => self.store.list_directories()?,
        };
        Ok(directories.into_iter().map(Into::into).collect())
    }

    /// Elements of the labelled version, or of the current one.
    pub fn list_elements(
        &self,
        directory_id: i64,
        version: Option<String>,
    ) -> RefbookResult<Vec<ElementView>> {
        let directory = self.directory(directory_id)?;
        let selector = VersionSelector::from_label(version);
        let version = resolve(self.store(), &directory, &selector, self.clock.today())?;

        Ok(self
            .store
            .list_elements(version.id)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Check whether `code`/`value` is an element of the labelled or current version.
    pub fn check_element(
        &self,
        directory_id: i64,
        code: &str,
        value: &str,
        version: Option<String>,
    ) -> RefbookResult<ElementCheck> {
        let directory = self.directory(directory_id)?;
        let selector = VersionSelector::from_label(version);
        let version = resolve(self.store(), &directory, &selector, self.clock.today())?;

        match self.store.find_element(version.id, code, value)? {
            Some(_) => Ok(ElementCheck::Found),
            None => Ok(ElementCheck::NotFound),
        }
    }

    /// Directory with its current version, if one has started.
    pub fn get_directory(&self, directory_id: i64) -> RefbookResult<DirectoryDetail> {
        let directory = self.directory(directory_id)?;
        let current_version = match resolve(
            self.store(),
            &directory,
            &VersionSelector::Current,
            self.clock.today(),
        ) {
            Ok(version) => Some(VersionView::from(version)),
            Err(RefbookError::VersionNotFound { .. }) => None,
            Err(err) => return Err(err),
        };

        Ok(DirectoryDetail {
            id: directory.id,
            code: directory.code,
            name: directory.name,
            description: directory.description,
            current_version,
        })
    }

    /// All versions of a directory, ordered by label.
    pub fn list_versions(&self, directory_id: i64) -> RefbookResult<Vec<VersionView>> {
        let directory = self.directory(directory_id)?;
        Ok(self
            .store
            .list_versions(directory.id)?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FixedClock;
    use crate::store::SqliteRefbookStore;
    use crate::types::{NewDirectory, NewElement, NewVersion};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        service: RefbookService,
        specialties: i64,
        empty: i64,
    }

    /// Specialties: 1.0 (2021), 2.0 (2022), 3.0 (2030, future). Today is 2024-06-01.
    fn fixture() -> Fixture {
        let store = Arc::new(SqliteRefbookStore::in_memory().unwrap());

        let specialties = store
            .insert_directory(&NewDirectory::new("1", "Специальности"))
            .unwrap();
        let v1 = store
            .insert_version(&NewVersion::new(specialties.id, "1.0", Some(date(2021, 1, 1))))
            .unwrap();
        let v2 = store
            .insert_version(&NewVersion::new(specialties.id, "2.0", Some(date(2022, 1, 1))))
            .unwrap();
        let v3 = store
            .insert_version(&NewVersion::new(specialties.id, "3.0", Some(date(2030, 1, 1))))
            .unwrap();

        store.insert_element(&NewElement::new(v1.id, "E01", "Хирург")).unwrap();
        store.insert_element(&NewElement::new(v2.id, "E02", "Терапевт")).unwrap();
        store.insert_element(&NewElement::new(v2.id, "E01", "Хирург")).unwrap();
        store.insert_element(&NewElement::new(v3.id, "E03", "Педиатр")).unwrap();

        let empty = store
            .insert_directory(&NewDirectory::new("2", "Пустой"))
            .unwrap();

        let service = RefbookService::with_clock(store, Arc::new(FixedClock(date(2024, 6, 1))));
        Fixture {
            service,
            specialties: specialties.id,
            empty: empty.id,
        }
    }

    #[test]
    fn test_list_directories() {
        let f = fixture();

        let all = f.service.list_directories(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].code, "1");

        // Three qualifying versions, still one entry
        let dated = f.service.list_directories(Some(date(2040, 1, 1))).unwrap();
        assert_eq!(dated.len(), 1);
        assert_eq!(dated[0].id, f.specialties);

        assert!(f
            .service
            .list_directories(Some(date(2000, 1, 1)))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_list_elements_current_version() {
        let f = fixture();
        let elements = f.service.list_elements(f.specialties, None).unwrap();
        assert_eq!(
            elements,
            vec![
                ElementView {
                    code: "E01".into(),
                    value: "Хирург".into()
                },
                ElementView {
                    code: "E02".into(),
                    value: "Терапевт".into()
                },
            ]
        );
    }

    #[test]
    fn test_list_elements_explicit_version() {
        let f = fixture();
        let elements = f
            .service
            .list_elements(f.specialties, Some("3.0".to_string()))
            .unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].code, "E03");

        let err = f
            .service
            .list_elements(f.specialties, Some("9.9".to_string()))
            .unwrap_err();
        assert!(matches!(err, RefbookError::VersionNotFound { .. }));
    }

    #[test]
    fn test_missing_directory_wins_over_version() {
        let f = fixture();
        for version in [None, Some("1.0".to_string()), Some("9.9".to_string())] {
            let err = f.service.list_elements(999, version.clone()).unwrap_err();
            assert!(matches!(
                err,
                RefbookError::DirectoryNotFound { directory_id: 999 }
            ));

            let err = f
                .service
                .check_element(999, "E01", "Хирург", version)
                .unwrap_err();
            assert!(matches!(err, RefbookError::DirectoryNotFound { .. }));
        }
    }

    #[test]
    fn test_directory_without_versions() {
        let f = fixture();
        let err = f.service.list_elements(f.empty, None).unwrap_err();
        assert!(matches!(
            err,
            RefbookError::VersionNotFound { label: None, .. }
        ));
    }

    #[test]
    fn test_check_element() {
        let f = fixture();
        let s = &f.service;

        assert_eq!(
            s.check_element(f.specialties, "E01", "Хирург", Some("1.0".into()))
                .unwrap(),
            ElementCheck::Found
        );
        assert_eq!(
            s.check_element(f.specialties, "E01", "Wrong", Some("1.0".into()))
                .unwrap(),
            ElementCheck::NotFound
        );
        // Current is 2.0, which has E02; 3.0 has not started yet
        assert!(s
            .check_element(f.specialties, "E02", "Терапевт", None)
            .unwrap()
            .is_found());
        assert!(!s
            .check_element(f.specialties, "E03", "Педиатр", None)
            .unwrap()
            .is_found());
        assert!(s
            .check_element(f.specialties, "E03", "Педиатр", Some("3.0".into()))
            .unwrap()
            .is_found());
        // Exact, case-sensitive match
        assert!(!s
            .check_element(f.specialties, "e01", "Хирург", None)
            .unwrap()
            .is_found());
    }

    #[test]
    fn test_get_directory_detail() {
        let f = fixture();
        let detail = f.service.get_directory(f.specialties).unwrap();
        let current = detail.current_version.unwrap();
        assert_eq!(current.version, "2.0");
        assert_eq!(current.start_date, Some(date(2022, 1, 1)));

        let detail = f.service.get_directory(f.empty).unwrap();
        assert!(detail.current_version.is_none());

        assert!(f.service.get_directory(404).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_versions() {
        let f = fixture();
        let labels: Vec<_> = f
            .service
            .list_versions(f.specialties)
            .unwrap()
            .into_iter()
            .map(|v| v.version)
            .collect();
        assert_eq!(labels, vec!["1.0", "2.0", "3.0"]);
        assert!(f.service.list_versions(f.empty).unwrap().is_empty());
    }

    #[test]
    fn test_reads_are_idempotent() {
        let f = fixture();
        let first = f.service.list_elements(f.specialties, None).unwrap();
        let second = f.service.list_elements(f.specialties, None).unwrap();
        assert_eq!(first, second);

        let first = f.service.list_directories(Some(date(2022, 1, 1))).unwrap();
        let second = f.service.list_directories(Some(date(2022, 1, 1))).unwrap();
        assert_eq!(first, second);
    }
}
