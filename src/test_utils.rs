//! Helpers shared by the route tests

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum_test::TestServer;

use crate::config::{AuthConfig, Config, ServerConfig, StorageConfig};
use crate::models::AppState;
use crate::storage::{
    FileContent, NewFile, ServiceAccountCredential, StorageError, StorageProvider, StorageResult,
    StorageSession, StoredFile,
};

pub const TEST_TOKEN: &str = "test-access-token";
pub const TEST_FOLDER_ID: &str = "test-folder-id";

pub fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        storage: StorageConfig {
            credential: ServiceAccountCredential::default(),
            folder_id: TEST_FOLDER_ID.to_string(),
        },
        auth: AuthConfig {
            access_token: TEST_TOKEN.to_string(),
        },
    }
}

pub fn create_test_server(drive: FakeDrive) -> TestServer {
    let state = AppState::new(create_test_config(), Arc::new(drive));
    TestServer::new(crate::create_router(state)).expect("Failed to create test server")
}

#[derive(Clone)]
enum Behaviour {
    Accept(String),
    FailSession(String),
    FailCreate(String),
}

/// In-memory stand-in for Google Drive that records every created file.
#[derive(Clone)]
pub struct FakeDrive {
    behaviour: Behaviour,
    sessions: Arc<AtomicUsize>,
    created: Arc<Mutex<Vec<(NewFile, FileContent)>>>,
}

impl FakeDrive {
    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            sessions: Arc::new(AtomicUsize::new(0)),
            created: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn accepting(file_id: &str) -> Self {
        Self::with(Behaviour::Accept(file_id.to_string()))
    }

    pub fn failing_session(message: &str) -> Self {
        Self::with(Behaviour::FailSession(message.to_string()))
    }

    pub fn failing_create(message: &str) -> Self {
        Self::with(Behaviour::FailCreate(message.to_string()))
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<(NewFile, FileContent)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageProvider for FakeDrive {
    async fn open_session(&self) -> StorageResult<Box<dyn StorageSession>> {
        if let Behaviour::FailSession(message) = &self.behaviour {
            return Err(StorageError::TokenExchange(message.clone()));
        }
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl StorageSession for FakeDrive {
    async fn create_file(&self, file: NewFile, content: FileContent) -> StorageResult<StoredFile> {
        match &self.behaviour {
            Behaviour::Accept(id) => {
                let stored = StoredFile {
                    id: id.clone(),
                    name: Some(file.name.clone()),
                    parents: file.parents.clone(),
                };
                self.created.lock().unwrap().push((file, content));
                Ok(stored)
            }
            Behaviour::FailCreate(message) => Err(StorageError::Request(message.clone())),
            Behaviour::FailSession(_) => unreachable!("session never opened"),
        }
    }
}
