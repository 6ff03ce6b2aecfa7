//! Action context types.
//!
//! The [`ActionContext`] carries per-invocation state through the middleware
//! pipeline and into the action handler.

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each action invocation, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it suitable for log correlation.
///
/// # Example
///
/// ```
/// use palisade_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID, e.g. one propagated by
    /// the caller.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// The identity of one invocation: request ID, action name and start time.
///
/// Unlike [`ActionContext`], this is cheap to clone and can be moved into
/// futures that outlive the borrow of the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInfo {
    request_id: RequestId,
    action: String,
    started_at: Instant,
}

impl ActionInfo {
    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the action name.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns when processing started.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since processing started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

/// Per-invocation context that flows through the pipeline.
///
/// Stages can enrich the context with typed extensions; the validation stage
/// records its outcome there.
///
/// # Example
///
/// ```
/// use palisade_core::ActionContext;
///
/// #[derive(Debug, PartialEq)]
/// struct Tenant(&'static str);
///
/// let mut ctx = ActionContext::new("createOrder");
/// ctx.set_extension(Tenant("acme"));
///
/// assert_eq!(ctx.action(), "createOrder");
/// assert_eq!(ctx.get_extension::<Tenant>(), Some(&Tenant("acme")));
/// ```
#[derive(Debug)]
pub struct ActionContext {
    info: ActionInfo,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ActionContext {
    /// Creates a context for `action` with a fresh request ID.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self::with_request_id(action, RequestId::new())
    }

    /// Creates a context with a specific request ID.
    #[must_use]
    pub fn with_request_id(action: impl Into<String>, request_id: RequestId) -> Self {
        Self {
            info: ActionInfo {
                request_id,
                action: action.into(),
                started_at: Instant::now(),
            },
            extensions: HashMap::new(),
        }
    }

    /// Returns the invocation identity.
    #[must_use]
    pub const fn info(&self) -> &ActionInfo {
        &self.info
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.info.request_id
    }

    /// Returns the action name.
    #[must_use]
    pub fn action(&self) -> &str {
        self.info.action()
    }

    /// Returns when processing started.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.info.started_at
    }

    /// Returns the elapsed time since processing started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.info.elapsed()
    }

    /// Stores a typed extension value, replacing any previous value of the
    /// same type.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).expect("serialization should work");
        let parsed: RequestId = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(id, parsed);
        assert_eq!(json.len(), 38);
    }

    #[test]
    fn test_context_keeps_given_request_id() {
        let id = RequestId::from_uuid(Uuid::now_v7());
        let ctx = ActionContext::with_request_id("getUser", id);
        assert_eq!(ctx.request_id(), id);
        assert_eq!(ctx.action(), "getUser");
    }

    #[test]
    fn test_info_outlives_context() {
        let ctx = ActionContext::new("getUser");
        let info = ctx.info().clone();
        let id = ctx.request_id();
        drop(ctx);

        assert_eq!(info.action(), "getUser");
        assert_eq!(info.request_id(), id);
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, PartialEq)]
        struct Attempt(u32);

        let mut ctx = ActionContext::new("retry");
        assert!(!ctx.has_extension::<Attempt>());

        ctx.set_extension(Attempt(1));
        ctx.set_extension(Attempt(2));
        assert_eq!(ctx.get_extension::<Attempt>(), Some(&Attempt(2)));

        assert_eq!(ctx.remove_extension::<Attempt>(), Some(Attempt(2)));
        assert!(!ctx.has_extension::<Attempt>());
    }

    #[test]
    fn test_elapsed_advances() {
        let ctx = ActionContext::new("slow");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(ctx.elapsed() >= std::time::Duration::from_millis(5));
    }
}
