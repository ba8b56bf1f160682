//! Durable timer store backed by a JSON file

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, info, warn};

use super::{
    hub::SnapshotHub, record::TimerRecord, table::TimerTable, StoreError, TimerStore,
    TimerSubscription,
};
use crate::state::{Timer, TimerId};

/// Store that keeps the collection in memory and rewrites a JSON file on
/// every mutation.
///
/// The file holds an array of [`TimerRecord`]s. Writes go to `<path>.tmp`
/// and are renamed over the target, so a crash mid-write leaves the previous
/// file intact. A snapshot is published only after it is durable.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: Mutex<TimerTable>,
    hub: SnapshotHub,
}

impl JsonFileStore {
    /// Open the store at `path`, creating an empty collection if the file is
    /// missing. An unreadable file is moved to `<path>.bak` and the store
    /// starts empty.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let timers = load(&path).await?;
        info!(path = %path.display(), count = timers.len(), "Opened timer store");

        let table = TimerTable::from_rows(timers);
        let hub = SnapshotHub::new(table.snapshot());
        Ok(Self {
            path,
            table: Mutex::new(table),
            hub,
        })
    }

    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut TimerTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        if self.hub.is_closed() {
            return Err(StoreError::Closed);
        }

        let mut table = self.table.lock().await;
        // close() may have finished while this write waited for the lock
        if self.hub.is_closed() {
            return Err(StoreError::Closed);
        }
        let mut next = table.clone();
        let result = f(&mut next)?;

        save(&self.path, next.rows()).await?;
        *table = next;
        self.hub.publish(table.snapshot());
        Ok(result)
    }
}

/// `<path><suffix>`, keeping the original extension
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

async fn load(path: &Path) -> Result<Vec<Timer>, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let parsed = serde_json::from_slice::<Vec<TimerRecord>>(&bytes)
        .map_err(StoreError::from)
        .and_then(|records| {
            records
                .into_iter()
                .map(Timer::try_from)
                .collect::<Result<Vec<_>, _>>()
        });

    match parsed {
        Ok(timers) => Ok(timers),
        Err(e) => {
            let bak_path = sibling_path(path, ".bak");
            warn!(
                error = %e,
                path = %path.display(),
                bak = %bak_path.display(),
                "Corrupt timer store, moving to .bak and starting fresh",
            );
            fs::rename(path, &bak_path).await?;
            Ok(Vec::new())
        }
    }
}

async fn save(path: &Path, timers: &[Timer]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let records: Vec<TimerRecord> = timers.iter().map(TimerRecord::from).collect();
    let bytes = serde_json::to_vec_pretty(&records)?;

    let tmp_path = sibling_path(path, ".tmp");
    {
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
    }
    fs::rename(&tmp_path, path).await?;

    debug!(path = %path.display(), count = timers.len(), "Saved timer store");
    Ok(())
}

#[async_trait]
impl TimerStore for JsonFileStore {
    fn subscribe(&self) -> Result<TimerSubscription, StoreError> {
        self.hub.subscribe()
    }

    async fn read_all_once(&self) -> Result<Vec<Timer>, StoreError> {
        if self.hub.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(self.table.lock().await.snapshot())
    }

    async fn insert(&self, timer: Timer) -> Result<(), StoreError> {
        self.mutate(|table| {
            table.upsert(timer);
            Ok(())
        })
        .await
    }

    async fn update(&self, timer: Timer) -> Result<(), StoreError> {
        self.mutate(|table| table.replace(timer)).await
    }

    async fn remove_by_id(&self, id: TimerId) -> Result<bool, StoreError> {
        self.mutate(|table| Ok(table.remove(id))).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        if self.hub.is_closed() {
            return Ok(());
        }

        // Holding the lock waits out any in-flight write before the final flush
        let table = self.table.lock().await;
        save(&self.path, table.rows()).await?;
        self.hub.close();
        info!(path = %self.path.display(), "Closed timer store");
        Ok(())
    }
}
