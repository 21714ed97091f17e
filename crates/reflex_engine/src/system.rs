//! Systems.
//!
//! A [`System`] is a unit of behaviour that registers its hooks once, in
//! [`System::init`]. Hooks and new persistent filters are staged on the
//! [`SystemContext`] and only wired into the ECS when `init` returns `Ok`, so
//! a failing `init` leaves nothing registered behind.
//!
//! After registration the system's state lives behind a shared cell: every
//! hook receives `&mut S` alongside `&mut Ecs`, and the caller keeps a
//! [`SystemHandle`] for access between ticks.

use std::any::type_name;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use reflex_foundation::{EntityId, Error, ErrorKind, Result};
use reflex_storage::HierarchyUpdate;

use crate::ecs::Ecs;
use crate::filter::ComponentFilter;
use crate::persistent::FilterView;

type SystemObserverFn<S> = Box<dyn FnMut(&mut S, &mut Ecs, &[EntityId]) -> Result<()>>;
type SystemHierarchyFn<S> = Box<dyn FnMut(&mut S, &mut Ecs, &[HierarchyUpdate]) -> Result<()>>;
type SystemTickFn<S> = Box<dyn FnMut(&mut S, &mut Ecs) -> Result<()>>;

// =============================================================================
// System trait
// =============================================================================

/// A unit of behaviour registered with an [`Ecs`].
pub trait System: Sized + 'static {
    /// Registers the system's hooks and persistent filters.
    ///
    /// # Errors
    ///
    /// An error aborts registration; staged hooks are discarded.
    fn init(&mut self, ctx: &mut SystemContext<'_, Self>) -> Result<()>;

    /// Name used in logs and error frames.
    fn name(&self) -> &'static str {
        let full = type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

// =============================================================================
// System context
// =============================================================================

/// Registration surface handed to [`System::init`].
pub struct SystemContext<'a, S> {
    ecs: &'a mut Ecs,
    filters: Vec<(ComponentFilter, FilterView)>,
    observers: Vec<(ComponentFilter, SystemObserverFn<S>)>,
    hierarchy: Vec<(String, SystemHierarchyFn<S>)>,
    ticks: Vec<SystemTickFn<S>>,
}

impl<'a, S: System> SystemContext<'a, S> {
    fn new(ecs: &'a mut Ecs) -> Self {
        Self {
            ecs,
            filters: Vec::new(),
            observers: Vec::new(),
            hierarchy: Vec::new(),
            ticks: Vec::new(),
        }
    }

    /// The ECS being registered with.
    ///
    /// Changes made through it are not undone if `init` fails.
    pub fn ecs(&mut self) -> &mut Ecs {
        self.ecs
    }

    /// Returns the persistent list for `filter`.
    ///
    /// An already registered list is shared right away. A new one is handed
    /// out empty and registered when `init` succeeds; entities tracked before
    /// then never join it.
    pub fn filter_entities(&mut self, filter: ComponentFilter) -> FilterView {
        if let Some(view) = self.ecs.filters.get(&filter) {
            return view;
        }
        if let Some((_, view)) = self.filters.iter().find(|(staged, _)| *staged == filter) {
            return view.clone();
        }
        let view = FilterView::default();
        self.filters.push((filter, view.clone()));
        view
    }

    /// Stages an observer hook for `filter`.
    pub fn observe_entities<F>(&mut self, filter: ComponentFilter, hook: F)
    where
        F: FnMut(&mut S, &mut Ecs, &[EntityId]) -> Result<()> + 'static,
    {
        self.observers.push((filter, Box::new(hook)));
    }

    /// Stages a hierarchy hook for the named relation.
    pub fn observe_hierarchy<F>(&mut self, relation: &str, hook: F)
    where
        F: FnMut(&mut S, &mut Ecs, &[HierarchyUpdate]) -> Result<()> + 'static,
    {
        self.hierarchy.push((relation.to_string(), Box::new(hook)));
    }

    /// Stages a tick hook.
    pub fn on_tick<F>(&mut self, hook: F)
    where
        F: FnMut(&mut S, &mut Ecs) -> Result<()> + 'static,
    {
        self.ticks.push(Box::new(hook));
    }
}

// =============================================================================
// System handle
// =============================================================================

/// Shared access to a registered system's state.
pub struct SystemHandle<S> {
    state: Rc<RefCell<S>>,
}

impl<S> Clone for SystemHandle<S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<S> SystemHandle<S> {
    /// Borrows the system state.
    ///
    /// # Panics
    ///
    /// Panics if the state is mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, S> {
        self.state.borrow()
    }

    /// Borrows the system state mutably.
    ///
    /// Holding the borrow across [`Ecs::tick`] makes the system's hooks fail
    /// with `SystemBusy`.
    ///
    /// # Panics
    ///
    /// Panics if the state is already borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, S> {
        self.state.borrow_mut()
    }
}

fn lock<'a, S>(state: &'a RefCell<S>, name: &str) -> Result<RefMut<'a, S>> {
    state.try_borrow_mut().map_err(|_| {
        Error::new(ErrorKind::SystemBusy {
            system: name.to_string(),
        })
    })
}

// =============================================================================
// Registration
// =============================================================================

impl Ecs {
    /// Registers a system: runs its `init` and wires the hooks it staged.
    ///
    /// # Errors
    ///
    /// Returns the error from `init`; the system is then not registered.
    pub fn register_system<S: System>(&mut self, mut system: S) -> Result<SystemHandle<S>> {
        let name = system.name();
        let mut ctx = SystemContext::new(self);
        if let Err(err) = system.init(&mut ctx) {
            log::warn!("system {name} failed to initialize: {err}");
            return Err(err.with_frame(format!("init of system {name}")));
        }
        let SystemContext {
            filters,
            observers,
            hierarchy,
            ticks,
            ..
        } = ctx;

        for (filter, view) in filters {
            log::debug!("persistent filter {filter:?} for system {name}");
            self.filters.adopt(filter, view);
        }

        let state = Rc::new(RefCell::new(system));
        let label = format!("system {name}");

        for (filter, mut hook) in observers {
            let state = Rc::clone(&state);
            self.subscribe_observer(
                label.clone(),
                filter,
                Box::new(move |ecs: &mut Ecs, entities: &[EntityId]| {
                    hook(&mut *lock(&state, name)?, ecs, entities)
                }),
            );
        }
        for (relation, mut hook) in hierarchy {
            let state = Rc::clone(&state);
            self.subscribe_hierarchy(
                label.clone(),
                &relation,
                Box::new(move |ecs: &mut Ecs, updates: &[HierarchyUpdate]| {
                    hook(&mut *lock(&state, name)?, ecs, updates)
                }),
            );
        }
        for mut hook in ticks {
            let state = Rc::clone(&state);
            self.subscribe_tick(
                label.clone(),
                Box::new(move |ecs: &mut Ecs| hook(&mut *lock(&state, name)?, ecs)),
            );
        }

        self.systems.push(name);
        log::debug!("registered system {name}");
        Ok(SystemHandle { state })
    }
}
