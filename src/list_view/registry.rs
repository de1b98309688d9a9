//! Server-side storage for the list controllers of open browser views.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use crate::{
    Error,
    list::{ListController, ListResource},
};

/// The number of list views kept per resource. Opening another view evicts
/// the oldest one.
pub const MAX_VIEWS: usize = 64;

#[derive(Debug)]
struct Views<R: ListResource> {
    next_id: u64,
    controllers: HashMap<u64, ListController<R>>,
    /// View ids from oldest to newest.
    order: VecDeque<u64>,
}

/// The open list views of one resource, keyed by view id.
///
/// The lock is only held for synchronous controller transitions, never
/// across a request to the API.
#[derive(Debug)]
pub struct ViewRegistry<R: ListResource> {
    views: Arc<Mutex<Views<R>>>,
}

impl<R: ListResource> Clone for ViewRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            views: self.views.clone(),
        }
    }
}

impl<R: ListResource> Default for ViewRegistry<R> {
    fn default() -> Self {
        Self {
            views: Arc::new(Mutex::new(Views {
                next_id: 1,
                controllers: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }
}

impl<R: ListResource> ViewRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `controller` and return its new view id.
    ///
    /// # Errors
    /// Returns [Error::ViewLockError] if the lock was poisoned.
    pub fn insert(&self, controller: ListController<R>) -> Result<u64, Error> {
        let mut views = self.lock()?;

        let view_id = views.next_id;
        views.next_id += 1;
        views.controllers.insert(view_id, controller);
        views.order.push_back(view_id);

        while views.order.len() > MAX_VIEWS {
            if let Some(oldest) = views.order.pop_front() {
                tracing::debug!("Evicting {} view {oldest}", R::KEY);
                views.controllers.remove(&oldest);
            }
        }

        Ok(view_id)
    }

    /// Run `f` on the controller of `view_id`.
    ///
    /// # Errors
    /// - [Error::ViewExpired] if there is no view with the id.
    /// - [Error::ViewLockError] if the lock was poisoned.
    pub fn with_view<T>(
        &self,
        view_id: u64,
        f: impl FnOnce(&mut ListController<R>) -> T,
    ) -> Result<T, Error> {
        let mut views = self.lock()?;

        let controller = views
            .controllers
            .get_mut(&view_id)
            .ok_or(Error::ViewExpired(view_id))?;

        Ok(f(controller))
    }

    /// Discard a view, returning whether it existed.
    ///
    /// # Errors
    /// Returns [Error::ViewLockError] if the lock was poisoned.
    pub fn remove(&self, view_id: u64) -> Result<bool, Error> {
        let mut views = self.lock()?;

        views.order.retain(|&id| id != view_id);
        Ok(views.controllers.remove(&view_id).is_some())
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.lock()?.controllers.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Views<R>>, Error> {
        self.views
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire list view lock: {error}"))
            .map_err(|_| Error::ViewLockError)
    }
}
