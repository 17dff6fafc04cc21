//! Directory browser session
//!
//! Holds the credentials, current path and projected listing of one
//! connected container. Listing, deletion and directory creation go through
//! a [`MetadataApi`]; file bytes move through an [`ObjectStore`].

use log::{debug, error, info, warn};

use crate::auth::Credentials;
use crate::error::SessionError;
use crate::listing::{Entry, SortOrder, project, sort};
use crate::path::{self, Breadcrumb, VirtualPath, join, normalize, strip_container_prefix};
use crate::session::events::{Observers, SessionEvent, UploadProgress};
use crate::session::results::{Download, UploadFile, UploadReport};
use crate::session::state::SessionState;
use crate::storage::{DEFAULT_CONTENT_TYPE, MetadataApi, ObjectStore};

pub struct BrowserSession<M, S> {
    metadata: M,
    store: S,
    state: SessionState,
    credentials: Option<Credentials>,
    current_path: VirtualPath,
    entries: Vec<Entry>,
    sort_order: SortOrder,
    observers: Observers,
}

impl<M: MetadataApi, S: ObjectStore> BrowserSession<M, S> {
    pub fn new(metadata: M, store: S) -> Self {
        Self {
            metadata,
            store,
            state: SessionState::Disconnected,
            credentials: None,
            current_path: VirtualPath::root(),
            entries: Vec::new(),
            sort_order: SortOrder::default(),
            observers: Observers::default(),
        }
    }

    /// Registers a callback for every later [`SessionEvent`].
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(Box::new(observer));
    }

    // Getters
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn container(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.container())
    }

    pub fn current_path(&self) -> &VirtualPath {
        &self.current_path
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        path::breadcrumbs(&self.current_path)
    }

    /// `None` at the root.
    pub fn parent_path(&self) -> Option<VirtualPath> {
        if self.current_path.is_root() {
            None
        } else {
            Some(path::parent(&self.current_path))
        }
    }

    /// Finds an entry of the current listing by name.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Connects and lists `start_path` (or the root).
    ///
    /// A rejected connection leaves the session disconnected. If the initial
    /// listing fails the session stays connected at the root and the listing
    /// error is returned.
    pub async fn connect(
        &mut self,
        credentials: Credentials,
        start_path: Option<&str>,
    ) -> Result<(), SessionError> {
        if self.is_connected() {
            self.disconnect().await;
        }

        self.set_state(SessionState::Connecting);
        if let Err(e) = self.metadata.connect(&credentials).await {
            error!(
                "Connection to '{}' on '{}' rejected: {}",
                credentials.container(),
                credentials.account(),
                e
            );
            self.set_state(SessionState::Disconnected);
            return Err(e.into());
        }

        info!(
            "Connected to container '{}' on account '{}'",
            credentials.container(),
            credentials.account()
        );
        let start = self.resolve_input(start_path.unwrap_or(""), credentials.container());
        self.credentials = Some(credentials);
        self.set_state(SessionState::Connected);
        self.load(start).await
    }

    /// Lists `raw_path` and makes it the current directory.
    ///
    /// Does nothing while disconnected. On failure the previous path and
    /// listing are kept.
    pub async fn navigate(&mut self, raw_path: &str) -> Result<(), SessionError> {
        let Some(container) = self.container().map(str::to_string) else {
            debug!("Ignoring navigation to '{}' while disconnected", raw_path);
            return Ok(());
        };

        let target = self.resolve_input(raw_path, &container);
        self.load(target).await
    }

    /// Lists a directory entry from the current listing and makes it current.
    ///
    /// The entry's key prefix is used verbatim.
    pub async fn open(&mut self, entry: &Entry) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        if !entry.is_dir() {
            return Err(SessionError::InvalidInput(format!(
                "Not a directory: {}",
                entry.name()
            )));
        }
        self.load(entry.path().clone()).await
    }

    /// Re-lists the current directory.
    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        self.load(self.current_path.clone()).await
    }

    /// Uploads `files` into the current directory, one at a time.
    ///
    /// The first failure stops the queue; files already stored stay stored.
    /// The listing is refreshed afterwards either way.
    pub async fn upload(&mut self, files: Vec<UploadFile>) -> Result<UploadReport, SessionError> {
        let credentials = self.credentials.clone().ok_or(SessionError::NotConnected)?;
        if files.is_empty() {
            return Ok(UploadReport {
                uploaded: Vec::new(),
                refresh_error: None,
            });
        }

        self.set_state(SessionState::Uploading);
        let total_files = files.len();
        let mut uploaded = Vec::with_capacity(total_files);
        let mut failure = None;

        for file in files {
            match self.upload_one(&credentials, file.clone()).await {
                Ok(key) => {
                    self.observers
                        .emit(&SessionEvent::UploadCompleted { key: key.clone() });
                    uploaded.push(key);
                }
                Err(detail) => {
                    error!("Upload of '{}' failed: {}", file.name, detail);
                    failure = Some(SessionError::PartialBatchFailure {
                        file: file.name,
                        completed: uploaded.len(),
                        total: total_files,
                        detail,
                    });
                    break;
                }
            }
        }

        let refresh_error = self.refresh_after_mutation(SessionState::Uploading).await;

        match failure {
            Some(e) => Err(e),
            None => {
                info!("Uploaded {} file(s) to '{}'", uploaded.len(), self.current_path);
                Ok(UploadReport {
                    uploaded,
                    refresh_error,
                })
            }
        }
    }

    async fn upload_one(&self, credentials: &Credentials, file: UploadFile) -> Result<VirtualPath, String> {
        let joined = join(&self.current_path, &file.name).map_err(|e| e.to_string())?;
        let mut key = self.strip_with_advisory(joined.as_str(), &joined, credentials.container());
        // A file named after the container, uploaded at the root.
        if key.is_root() {
            key = joined;
        }

        let content_type = file.content_type.unwrap_or_else(|| {
            mime_guess::from_path(&file.name)
                .first()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
        });
        let total = file.data.len() as u64;
        let observers = &self.observers;
        let name = &file.name;
        let progress = move |transferred: u64| {
            observers.emit(&SessionEvent::UploadProgress(UploadProgress {
                file: name.clone(),
                transferred,
                total,
            }));
        };

        self.store
            .upload(credentials, &key, file.data, &content_type, &progress)
            .await
            .map_err(|e| e.detail().to_string())?;
        Ok(key)
    }

    /// Deletes `entry` (a directory with everything under it).
    ///
    /// Confirmation is the caller's job.
    pub async fn delete(&mut self, entry: &Entry) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }

        self.set_state(SessionState::Deleting);
        if let Err(e) = self.metadata.delete(entry.path()).await {
            error!("Failed to delete '{}': {}", entry.path(), e);
            self.set_state(SessionState::Connected);
            return Err(e.into());
        }

        info!("Deleted '{}'", entry.path());
        self.refresh_after_mutation(SessionState::Deleting).await;
        Ok(())
    }

    /// Creates the directory `name` inside the current one.
    pub async fn create_directory(&mut self, name: &str) -> Result<VirtualPath, SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        let target = join(&self.current_path, name.trim())?;

        self.set_state(SessionState::CreatingDirectory);
        if let Err(e) = self.metadata.mkdir(&target).await {
            error!("Failed to create directory '{}': {}", target, e);
            self.set_state(SessionState::Connected);
            return Err(e.into());
        }

        info!("Created directory '{}'", target);
        self.refresh_after_mutation(SessionState::CreatingDirectory).await;
        Ok(target)
    }

    /// Fetches the bytes of a file entry.
    pub async fn download(&self, entry: &Entry) -> Result<Download, SessionError> {
        let credentials = self.file_credentials(entry)?;
        let content = self.store.download(credentials, entry.path()).await?;
        debug!("Downloaded '{}' ({} bytes)", entry.path(), content.data.len());

        Ok(Download {
            name: entry.name().to_string(),
            data: content.data,
            content_type: content.content_type,
        })
    }

    /// Signed URL from which a file entry can be fetched.
    pub async fn download_url(&self, entry: &Entry) -> Result<String, SessionError> {
        let credentials = self.file_credentials(entry)?;
        Ok(self.store.download_url(credentials, entry.path())?)
    }

    /// Changes the listing order and re-sorts the current entries.
    pub fn set_sort(&mut self, order: SortOrder) {
        self.sort_order = order;
        self.entries = sort(std::mem::take(&mut self.entries), order);
    }

    /// Drops credentials, path and listing. Never fails.
    pub async fn disconnect(&mut self) {
        if let Err(e) = self.metadata.disconnect().await {
            warn!("Metadata API reported an error on disconnect: {}", e);
        }

        if self.credentials.take().is_some() {
            info!("Disconnected");
        }
        self.current_path = VirtualPath::root();
        self.entries.clear();
        self.set_state(SessionState::Disconnected);
    }

    fn file_credentials(&self, entry: &Entry) -> Result<&Credentials, SessionError> {
        let credentials = self.credentials.as_ref().ok_or(SessionError::NotConnected)?;
        if entry.is_dir() {
            return Err(SessionError::InvalidInput(format!(
                "Cannot download a directory: {}",
                entry.name()
            )));
        }
        Ok(credentials)
    }

    /// Normalizes user input and strips a repeated container name.
    fn resolve_input(&self, raw: &str, container: &str) -> VirtualPath {
        self.strip_with_advisory(raw, &normalize(raw), container)
    }

    fn strip_with_advisory(&self, original: &str, path: &VirtualPath, container: &str) -> VirtualPath {
        let stripped = strip_container_prefix(path, container);
        if stripped.stripped {
            self.observers.emit(&SessionEvent::ContainerPrefixStripped {
                original: original.to_string(),
                resolved: stripped.path.clone(),
            });
        }
        stripped.path
    }

    /// Fetches and projects `target`, swapping path and entries together.
    async fn load(&mut self, target: VirtualPath) -> Result<(), SessionError> {
        self.set_state(SessionState::Navigating);

        let records = match self.metadata.list(&target).await {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to list '{}': {}", target, e);
                self.set_state(SessionState::Connected);
                return Err(e.into());
            }
        };

        let entries = sort(project(&records, &target), self.sort_order);
        debug!("Listed '{}' - {} entries", target, entries.len());
        self.current_path = target;
        self.entries = entries;
        self.set_state(SessionState::Connected);
        Ok(())
    }

    /// Refresh after a mutation; a failure is reported as an event.
    async fn refresh_after_mutation(&mut self, from: SessionState) -> Option<String> {
        debug!("Refreshing listing after {}", from);
        match self.load(self.current_path.clone()).await {
            Ok(()) => None,
            Err(e) => {
                let detail = e.to_string();
                self.observers
                    .emit(&SessionEvent::RefreshFailed(detail.clone()));
                Some(detail)
            }
        }
    }

    fn set_state(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            warn!("Unexpected session transition {} -> {}", self.state, next);
        }
        debug!("Session {} -> {}", self.state, next);
        self.state = next;
        self.observers.emit(&SessionEvent::StateChanged(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::storage::{Broker, DirectStore, MemoryConnector, MemoryContainer};
    use std::sync::{Arc, Mutex};

    type TestSession = BrowserSession<Broker, DirectStore>;

    fn session_over(container: Arc<MemoryContainer>) -> TestSession {
        let connector = Arc::new(MemoryConnector::new(container));
        BrowserSession::new(
            Broker::new(connector.clone(), ".keep"),
            DirectStore::new(connector),
        )
    }

    fn sample() -> Arc<MemoryContainer> {
        Arc::new(MemoryContainer::with_objects(
            "box",
            [
                ("a/b.txt", "0123456789"),
                ("a/c/d.txt", "01234"),
                ("e.txt", "01234567890123456789"),
            ],
        ))
    }

    fn creds(container: &str) -> Credentials {
        Credentials::new("acct", container, "sv=2024&sig=abc").unwrap()
    }

    fn names(session: &TestSession) -> Vec<&str> {
        session.entries().iter().map(|e| e.name()).collect()
    }

    fn recorder(session: &mut TestSession) -> Arc<Mutex<Vec<SessionEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        session.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[tokio::test]
    async fn test_connect_lists_root() {
        let mut session = session_over(sample());
        session.connect(creds("box"), None).await.unwrap();

        assert_eq!(session.state(), SessionState::Connected);
        assert!(session.current_path().is_root());
        assert_eq!(names(&session), vec!["a", "e.txt"]);
        assert_eq!(session.parent_path(), None);
    }

    #[tokio::test]
    async fn test_connect_strips_container_from_start_path() {
        let mut session = session_over(sample());
        let events = recorder(&mut session);

        session.connect(creds("box"), Some("box/a/")).await.unwrap();

        assert_eq!(session.current_path().as_str(), "a");
        assert_eq!(names(&session), vec!["c", "b.txt"]);
        assert!(events.lock().unwrap().iter().any(|e| matches!(
            e,
            SessionEvent::ContainerPrefixStripped { resolved, .. } if resolved.as_str() == "a"
        )));
    }

    #[tokio::test]
    async fn test_rejected_connect_stays_disconnected() {
        let mut session = session_over(sample());
        let err = session.connect(creds("other"), None).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "ContainerNotFound: The specified container does not exist."
        );
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_rejected_connect_emits_no_prefix_advisory() {
        let mut session = session_over(sample());
        let events = recorder(&mut session);

        assert!(session.connect(creds("other"), Some("other/a")).await.is_err());
        assert!(!events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, SessionEvent::ContainerPrefixStripped { .. })));
    }

    #[tokio::test]
    async fn test_navigate_while_disconnected_is_noop() {
        let mut session = session_over(sample());
        session.navigate("a").await.unwrap();
        assert!(session.current_path().is_root());
        assert!(session.entries().is_empty());
    }

    #[tokio::test]
    async fn test_navigate_failure_keeps_listing() {
        let container = sample();
        let mut session = session_over(container.clone());
        session.connect(creds("box"), None).await.unwrap();

        container.fail_listings(true);
        assert!(session.navigate("a").await.is_err());

        assert!(session.current_path().is_root());
        assert_eq!(names(&session), vec!["a", "e.txt"]);
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_upload_reports_progress_and_refreshes() {
        let container = sample();
        let mut session = session_over(container.clone());
        let events = recorder(&mut session);
        session.connect(creds("box"), Some("a")).await.unwrap();

        let report = session
            .upload(vec![UploadFile::new("data.json", "[1]")])
            .await
            .unwrap();

        assert_eq!(report.uploaded[0].as_str(), "a/data.json");
        assert_eq!(report.refresh_error, None);
        assert_eq!(container.content_type_of("a/data.json").as_deref(), Some("application/json"));
        assert!(session.entry("data.json").is_some());

        let events = events.lock().unwrap();
        assert!(events.contains(&SessionEvent::UploadProgress(UploadProgress {
            file: "data.json".into(),
            transferred: 3,
            total: 3,
        })));
    }

    #[tokio::test]
    async fn test_upload_stops_at_first_failure() {
        let container = sample();
        container.fail_uploads_to("two.bin");
        let mut session = session_over(container.clone());
        session.connect(creds("box"), None).await.unwrap();

        let err = session
            .upload(vec![
                UploadFile::new("one.bin", "1"),
                UploadFile::new("two.bin", "2"),
                UploadFile::new("three.bin", "3"),
            ])
            .await
            .unwrap_err();

        match err {
            SessionError::PartialBatchFailure {
                file,
                completed,
                total,
                ..
            } => {
                assert_eq!(file, "two.bin");
                assert_eq!(completed, 1);
                assert_eq!(total, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(session.entry("one.bin").is_some());
        assert!(!container.contains("three.bin"));
    }

    #[tokio::test]
    async fn test_create_directory_and_delete() {
        let container = sample();
        let mut session = session_over(container.clone());
        session.connect(creds("box"), None).await.unwrap();

        let created = session.create_directory("reports").await.unwrap();
        assert_eq!(created.as_str(), "reports");
        assert!(session.entry("reports").is_some_and(|e| e.is_dir()));

        let dir = session.entry("a").cloned().unwrap();
        session.delete(&dir).await.unwrap();
        assert!(session.entry("a").is_none());
        assert!(!container.contains("a/c/d.txt"));
    }

    #[tokio::test]
    async fn test_whitespace_keys_are_addressed_verbatim() {
        let container = Arc::new(MemoryContainer::with_objects(
            "box",
            [
                (" notes.txt", "old"),
                ("notes.txt", "keep me"),
                (" drafts /plan.txt", "p"),
                ("drafts/other.txt", "o"),
            ],
        ));
        let mut session = session_over(container.clone());
        session.connect(creds("box"), None).await.unwrap();

        let spaced = session.entry(" notes.txt").cloned().unwrap();
        let download = session.download(&spaced).await.unwrap();
        assert_eq!(&download.data[..], b"old");

        session.delete(&spaced).await.unwrap();
        assert!(!container.contains(" notes.txt"));
        assert!(container.contains("notes.txt"));

        let dir = session.entry(" drafts ").cloned().unwrap();
        session.open(&dir).await.unwrap();
        assert_eq!(session.current_path().as_str(), " drafts ");
        assert_eq!(names(&session), vec!["plan.txt"]);
    }

    #[tokio::test]
    async fn test_create_directory_rejects_separator() {
        let mut session = session_over(sample());
        session.connect(creds("box"), None).await.unwrap();

        let err = session.create_directory("x/y").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput(_)));
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_download_file_and_url() {
        let mut session = session_over(sample());
        session.connect(creds("box"), None).await.unwrap();

        let file = session.entry("e.txt").cloned().unwrap();
        let download = session.download(&file).await.unwrap();
        assert_eq!(download.data.len(), 20);
        assert_eq!(session.download_url(&file).await.unwrap(), "memory://box/e.txt");

        let dir = session.entry("a").cloned().unwrap();
        assert!(matches!(
            session.download(&dir).await,
            Err(SessionError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_disconnect_clears_everything() {
        let mut session = session_over(sample());
        session.connect(creds("box"), Some("a")).await.unwrap();
        session.disconnect().await;

        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.container().is_none());
        assert!(session.current_path().is_root());
        assert!(session.entries().is_empty());
        assert_eq!(
            session.upload(vec![UploadFile::new("x", "1")]).await.unwrap_err(),
            SessionError::NotConnected
        );
    }

    #[test]
    fn test_remote_detail_passes_through() {
        let err: SessionError = RemoteError::rejected("AuthenticationFailed: bad sig").into();
        assert_eq!(err.to_string(), "AuthenticationFailed: bad sig");
    }
}
