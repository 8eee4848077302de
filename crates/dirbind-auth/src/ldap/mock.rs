//! Scripted in-memory directory for unit tests

use super::filter::login_filter;
use super::transport::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub(crate) struct MockState {
    pub reachable: bool,
    pub anonymous_rc: u32,
    /// dn -> password
    pub accounts: HashMap<String, String>,
    /// login -> entry, in server order
    pub entries: Vec<(String, DirectoryEntry)>,
    /// Forced bind result per dn
    pub bind_rc: HashMap<String, u32>,
    pub bind_timeout: bool,
    pub search_rc: u32,
    pub search_timeout: bool,
    pub filters: Vec<String>,
    pub opened: usize,
    pub released: usize,
    pub unbinds: usize,
}

#[derive(Clone)]
pub(crate) struct MockDirectory {
    state: Arc<Mutex<MockState>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                reachable: true,
                ..Default::default()
            })),
        }
    }

    /// The example.com directory: root account plus `jdoe`.
    pub fn example() -> Self {
        let dir = Self::new();
        dir.add_account("cn=admin,dc=example,dc=com", "admin");
        dir.add_user("jdoe", "cn=jdoe,dc=example,dc=com", "secret123");
        dir
    }

    pub fn add_account(&self, dn: &str, password: &str) {
        self.with(|s| {
            s.accounts.insert(dn.to_string(), password.to_string());
        });
    }

    pub fn add_user(&self, login: &str, dn: &str, password: &str) {
        self.add_account(dn, password);
        self.add_entry(
            login,
            DirectoryEntry::new(dn).with_attr("distinguishedName", dn),
        );
    }

    pub fn add_entry(&self, login: &str, entry: DirectoryEntry) {
        self.with(|s| s.entries.push((login.to_string(), entry)));
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn connector(&self) -> Arc<dyn Connector> {
        Arc::new(self.clone())
    }

    /// Every opened connection has been dropped.
    pub fn all_released(&self) -> bool {
        self.with(|s| s.opened == s.released)
    }
}

#[async_trait]
impl Connector for MockDirectory {
    async fn connect(&self, url: &str) -> Result<Box<dyn Session>, TransportError> {
        let reachable = self.with(|s| {
            if s.reachable {
                s.opened += 1;
            }
            s.reachable
        });
        if !reachable {
            return Err(TransportError::Unreachable(format!(
                "{}: connection refused",
                url
            )));
        }
        Ok(Box::new(MockSession {
            state: self.state.clone(),
        }))
    }
}

struct MockSession {
    state: Arc<Mutex<MockState>>,
}

impl Drop for MockSession {
    fn drop(&mut self) {
        if let Ok(mut s) = self.state.lock() {
            s.released += 1;
        }
    }
}

#[async_trait]
impl Session for MockSession {
    async fn simple_bind(
        &mut self,
        dn: &str,
        password: &str,
    ) -> Result<OperationStatus, TransportError> {
        let s = self.state.lock().unwrap();
        if s.bind_timeout {
            return Err(TransportError::Timeout);
        }
        if let Some(rc) = s.bind_rc.get(dn) {
            return Ok(OperationStatus::with_code(*rc, "forced"));
        }
        if dn.is_empty() && password.is_empty() {
            return Ok(OperationStatus::with_code(s.anonymous_rc, ""));
        }
        match s.accounts.get(dn) {
            Some(expected) if expected == password => Ok(OperationStatus::success()),
            _ => Ok(OperationStatus::with_code(
                RC_INVALID_CREDENTIALS,
                "invalid credentials",
            )),
        }
    }

    async fn search_subtree(
        &mut self,
        _base: &str,
        filter: &str,
        _attrs: &[&str],
    ) -> Result<(Vec<DirectoryEntry>, OperationStatus), TransportError> {
        let mut s = self.state.lock().unwrap();
        s.filters.push(filter.to_string());
        if s.search_timeout {
            return Err(TransportError::Timeout);
        }
        if s.search_rc != RC_SUCCESS {
            return Ok((Vec::new(), OperationStatus::with_code(s.search_rc, "forced")));
        }
        let found = s
            .entries
            .iter()
            .filter(|(login, _)| login_filter(login) == filter)
            .map(|(_, entry)| entry.clone())
            .collect();
        Ok((found, OperationStatus::success()))
    }

    async fn unbind(&mut self) -> Result<(), TransportError> {
        self.state.lock().unwrap().unbinds += 1;
        Ok(())
    }
}
