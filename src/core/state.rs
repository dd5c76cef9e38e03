use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::exam::ExamService;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    exam: ExamService,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool) -> Self {
        let exam = ExamService::postgres(db.clone());
        Self { inner: Arc::new(InnerState { settings, db, exam }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn exam(&self) -> &ExamService {
        &self.inner.exam
    }
}
