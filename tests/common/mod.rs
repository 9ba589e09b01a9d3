//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use taskrig::runner::Executable;
use tempfile::TempDir;

/// Create a temporary directory with a taskrig.yml file
pub fn create_test_manifest(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let manifest_path = temp_dir.path().join("taskrig.yml");
    fs::write(&manifest_path, content).unwrap();
    (temp_dir, manifest_path)
}

/// Shared record of task events, in the order they happened
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Position of an event, panicking when it never happened
    pub fn position(&self, event: &str) -> usize {
        self.events()
            .iter()
            .position(|e| e == event)
            .unwrap_or_else(|| panic!("event '{}' not recorded in {:?}", event, self.events()))
    }

    /// A task recording `start:<name>` and `end:<name>`, yielding in between
    pub fn task(&self, name: &str) -> Executable {
        let log = self.clone();
        let name = name.to_string();
        Executable::new(move || {
            let log = log.clone();
            let name = name.clone();
            async move {
                log.push(format!("start:{}", name));
                tokio::task::yield_now().await;
                log.push(format!("end:{}", name));
                Ok(())
            }
        })
    }

    /// A task recording `start:<name>` and then failing
    pub fn failing_task(&self, name: &str) -> Executable {
        let log = self.clone();
        let name = name.to_string();
        Executable::new(move || {
            let log = log.clone();
            let name = name.clone();
            async move {
                log.push(format!("start:{}", name));
                tokio::task::yield_now().await;
                Err(anyhow::anyhow!("{} failed", name))
            }
        })
    }
}
