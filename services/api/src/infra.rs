use chrono::NaiveDate;
use eco_eval::evaluation::{
    EvaluationDocument, EvaluationId, EvaluationStore, EvaluationSummary, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationStore {
    documents: Arc<Mutex<Documents>>,
}

type Documents = HashMap<EvaluationId, EvaluationDocument>;

impl InMemoryEvaluationStore {
    fn documents(&self) -> Result<MutexGuard<'_, Documents>, StoreError> {
        self.documents
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

impl EvaluationStore for InMemoryEvaluationStore {
    fn insert(&self, document: EvaluationDocument) -> Result<(), StoreError> {
        let mut guard = self.documents()?;
        if guard.contains_key(&document.evaluation_id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(document.evaluation_id, document);
        Ok(())
    }

    fn update(&self, document: EvaluationDocument) -> Result<(), StoreError> {
        let mut guard = self.documents()?;
        if guard.contains_key(&document.evaluation_id) {
            guard.insert(document.evaluation_id, document);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn load(&self, id: &EvaluationId) -> Result<EvaluationDocument, StoreError> {
        let guard = self.documents()?;
        guard.get(id).cloned().ok_or(StoreError::NotFound)
    }

    fn delete(&self, id: &EvaluationId) -> Result<(), StoreError> {
        let mut guard = self.documents()?;
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn list(&self) -> Result<Vec<EvaluationSummary>, StoreError> {
        let guard = self.documents()?;
        let mut summaries: Vec<_> = guard.values().map(EvaluationSummary::from).collect();
        summaries.sort_by_key(|summary| summary.evaluation_id);
        Ok(summaries)
    }
}

/// One `<evaluation_id>.json` document per evaluation under `root`.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileEvaluationStore {
    root: PathBuf,
}

impl JsonFileEvaluationStore {
    pub(crate) fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| unavailable(&root, err))?;
        Ok(Self { root })
    }

    fn path_for(&self, id: &EvaluationId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn write(&self, document: &EvaluationDocument) -> Result<(), StoreError> {
        let path = self.path_for(&document.evaluation_id);
        let payload = serde_json::to_vec_pretty(document)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        fs::write(&path, payload).map_err(|err| unavailable(&path, err))
    }

    fn read(path: &Path) -> Result<EvaluationDocument, StoreError> {
        let raw = fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StoreError::NotFound,
            _ => unavailable(path, err),
        })?;
        serde_json::from_slice(&raw)
            .map_err(|err| StoreError::Corrupt(format!("{}: {err}", path.display())))
    }
}

impl EvaluationStore for JsonFileEvaluationStore {
    fn insert(&self, document: EvaluationDocument) -> Result<(), StoreError> {
        if self.path_for(&document.evaluation_id).exists() {
            return Err(StoreError::Conflict);
        }
        self.write(&document)
    }

    fn update(&self, document: EvaluationDocument) -> Result<(), StoreError> {
        if !self.path_for(&document.evaluation_id).exists() {
            return Err(StoreError::NotFound);
        }
        self.write(&document)
    }

    fn load(&self, id: &EvaluationId) -> Result<EvaluationDocument, StoreError> {
        Self::read(&self.path_for(id))
    }

    fn delete(&self, id: &EvaluationId) -> Result<(), StoreError> {
        let path = self.path_for(id);
        fs::remove_file(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StoreError::NotFound,
            _ => unavailable(&path, err),
        })
    }

    fn list(&self) -> Result<Vec<EvaluationSummary>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|err| unavailable(&self.root, err))?;
        let mut summaries = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| unavailable(&self.root, err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Self::read(&path) {
                Ok(document) => summaries.push(EvaluationSummary::from(&document)),
                Err(StoreError::Corrupt(reason)) => {
                    warn!(%reason, "skipping unreadable evaluation document");
                }
                Err(error) => return Err(error),
            }
        }
        summaries.sort_by_key(|summary| summary.evaluation_id);
        Ok(summaries)
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {err}", path.display()))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
