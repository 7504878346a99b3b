//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::api::{ApiError, ApiFuture, RemoteClient, RemoteObject};

/// In-memory remote API double with scripted failures.
///
/// Stores objects per resource collection, assigns deterministic
/// identifiers (`obj-1`, `obj-2`, ...) on create, and lets tests queue
/// typed errors per operation and per-object status sequences so
/// convergence paths can be driven without a server. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Debug, Default)]
struct FakeState {
    objects: BTreeMap<String, BTreeMap<String, Value>>,
    errors: HashMap<String, VecDeque<ApiError>>,
    statuses: HashMap<String, VecDeque<String>>,
    invocations: Vec<Invocation>,
    next_id: u64,
}

/// Records a single call made through [`FakeRemote`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    /// Operation name (`get`, `create`, `update`, `delete`).
    pub op: String,
    /// Resource collection the call targeted.
    pub resource: String,
    /// Object identifier, when the operation addressed one.
    pub id: Option<String>,
}

fn op_key(op: &str, resource: &str) -> String {
    format!("{op} {resource}")
}

fn object_key(resource: &str, id: &str) -> String {
    format!("{resource}/{id}")
}

impl FakeRemote {
    /// Creates an empty fake.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an object, forcing its `id` field to match `id`.
    pub fn insert(&self, resource: &str, id: &str, mut fields: Value) {
        if let Value::Object(map) = &mut fields {
            map.insert(String::from("id"), Value::String(id.to_owned()));
        }
        let mut state = self.state_mut();
        state
            .objects
            .entry(resource.to_owned())
            .or_default()
            .insert(id.to_owned(), fields);
    }

    /// Returns a snapshot of a stored object, if present.
    #[must_use]
    pub fn object(&self, resource: &str, id: &str) -> Option<Value> {
        self.state_mut()
            .objects
            .get(resource)
            .and_then(|collection| collection.get(id))
            .cloned()
    }

    /// Queues a typed error returned by the next matching `op` call against
    /// `resource` (FIFO when several are queued).
    pub fn push_error(&self, op: &str, resource: &str, err: ApiError) {
        self.state_mut()
            .errors
            .entry(op_key(op, resource))
            .or_default()
            .push_back(err);
    }

    /// Scripts the status labels successive GETs observe for one object.
    /// Each poll consumes one label and writes it into the stored object;
    /// once the script is exhausted the stored status persists.
    pub fn script_statuses(&self, resource: &str, id: &str, labels: &[&str]) {
        self.state_mut()
            .statuses
            .entry(object_key(resource, id))
            .or_default()
            .extend(labels.iter().map(|label| (*label).to_owned()));
    }

    /// Returns all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.state_mut().invocations.clone()
    }

    /// Counts recorded invocations of `op` against `resource`.
    #[must_use]
    pub fn calls(&self, op: &str, resource: &str) -> usize {
        self.state_mut()
            .invocations
            .iter()
            .filter(|call| call.op == op && call.resource == resource)
            .count()
    }

    fn state_mut(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(state: &mut FakeState, op: &str, resource: &str, id: Option<&str>) {
        state.invocations.push(Invocation {
            op: op.to_owned(),
            resource: resource.to_owned(),
            id: id.map(str::to_owned),
        });
    }

    fn take_error(state: &mut FakeState, op: &str, resource: &str) -> Option<ApiError> {
        state
            .errors
            .get_mut(&op_key(op, resource))
            .and_then(VecDeque::pop_front)
    }
}

impl RemoteClient for FakeRemote {
    fn get<'a>(&'a self, resource: &'a str, id: &'a str) -> ApiFuture<'a, RemoteObject> {
        Box::pin(async move {
            let mut state = self.state_mut();
            Self::record(&mut state, "get", resource, Some(id));
            if let Some(err) = Self::take_error(&mut state, "get", resource) {
                return Err(err);
            }

            let scripted = state
                .statuses
                .get_mut(&object_key(resource, id))
                .and_then(VecDeque::pop_front);
            let collection = state
                .objects
                .get_mut(resource)
                .ok_or_else(|| ApiError::not_found(resource, id))?;
            let fields = collection
                .get_mut(id)
                .ok_or_else(|| ApiError::not_found(resource, id))?;
            if let (Some(label), Value::Object(map)) = (scripted, &mut *fields) {
                map.insert(String::from("status"), Value::String(label));
            }
            Ok(RemoteObject::from_fields(fields.clone()))
        })
    }

    fn create<'a>(&'a self, resource: &'a str, payload: Value) -> ApiFuture<'a, RemoteObject> {
        Box::pin(async move {
            let mut state = self.state_mut();
            Self::record(&mut state, "create", resource, None);
            if let Some(err) = Self::take_error(&mut state, "create", resource) {
                return Err(err);
            }

            state.next_id += 1;
            let id = format!("obj-{}", state.next_id);
            let mut fields = payload;
            if let Value::Object(map) = &mut fields {
                map.insert(String::from("id"), Value::String(id.clone()));
                map.entry(String::from("status"))
                    .or_insert_with(|| Value::String(String::from("ACTIVE")));
            }
            state
                .objects
                .entry(resource.to_owned())
                .or_default()
                .insert(id, fields.clone());
            Ok(RemoteObject::from_fields(fields))
        })
    }

    fn update<'a>(
        &'a self,
        resource: &'a str,
        id: &'a str,
        payload: Value,
    ) -> ApiFuture<'a, RemoteObject> {
        Box::pin(async move {
            let mut state = self.state_mut();
            Self::record(&mut state, "update", resource, Some(id));
            if let Some(err) = Self::take_error(&mut state, "update", resource) {
                return Err(err);
            }

            let collection = state
                .objects
                .get_mut(resource)
                .ok_or_else(|| ApiError::not_found(resource, id))?;
            let fields = collection
                .get_mut(id)
                .ok_or_else(|| ApiError::not_found(resource, id))?;
            if let (Value::Object(existing), Value::Object(updates)) = (&mut *fields, payload) {
                for (key, value) in updates {
                    existing.insert(key, value);
                }
            }
            Ok(RemoteObject::from_fields(fields.clone()))
        })
    }

    fn delete<'a>(&'a self, resource: &'a str, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state_mut();
            Self::record(&mut state, "delete", resource, Some(id));
            if let Some(err) = Self::take_error(&mut state, "delete", resource) {
                return Err(err);
            }

            let removed = state
                .objects
                .get_mut(resource)
                .and_then(|collection| collection.remove(id));
            if removed.is_none() {
                return Err(ApiError::not_found(resource, id));
            }
            Ok(())
        })
    }
}
