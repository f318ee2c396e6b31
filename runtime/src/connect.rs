//! Derived views over a store.
//!
//! A [`Connection`] maps store state, together with the connection's own
//! props, to "props" and hands them to a render callback. It renders once on
//! connect, then again only when a notification pass or an own-props update
//! produces props that differ from the last rendered ones.
//!
//! # Example
//!
//! ```ignore
//! let connection = store.connect_with(
//!     "Dr.",
//!     |state: &AppState, title: &&str| format!("{title} {}", state.user_name),
//!     |greeting: &String| println!("hello, {greeting}"),
//! );
//!
//! // Unrelated transitions never reach the render callback
//! connection.dispatch(AppAction::Tick);
//!
//! // New own props re-map against the current state right away
//! connection.set_own_props("Prof.");
//! ```

use crate::store::{DispatchFuture, Store, Subscription};
use aredux_core::action::IntoDispatch;
use aredux_core::reducer::Reducer;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type MapProps<S, O, P> = Box<dyn Fn(&S, &O) -> P + Send + Sync>;
type Render<P> = Box<dyn Fn(&P) + Send + Sync>;

/// Mapping state shared by a connection and its observer
struct Binding<S, P, O> {
    store_name: String,
    own: Mutex<O>,
    props: Mutex<P>,
    map: MapProps<S, O, P>,
    render: Render<P>,
}

impl<S, P, O> Binding<S, P, O>
where
    P: PartialEq + Clone,
{
    /// Re-map and render if the props changed
    fn update(&self, state: &S) {
        let next = (self.map)(state, &lock(&self.own));
        {
            let mut last = lock(&self.props);
            if *last == next {
                tracing::trace!(store = %self.store_name, "Props unchanged, render skipped");
                return;
            }
            *last = next.clone();
        }
        (self.render)(&next);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A live mapping from store state and own props to rendered props
///
/// Dropping the connection unsubscribes it.
pub struct Connection<S, A, R, P, O = ()>
where
    R: Reducer<State = S, Action = A>,
{
    store: Store<S, A, R>,
    binding: Arc<Binding<S, P, O>>,
    subscription: Subscription,
}

impl<S, A, R> Store<S, A, R>
where
    R: Reducer<State = S, Action = A> + Send + Sync + 'static,
    S: Send + Sync + 'static,
    A: Send + 'static,
{
    /// Connect a props mapping and render callback to this store
    ///
    /// `render` runs immediately with the props for the current state, and
    /// afterwards from notification passes whenever `map` yields props not
    /// equal to the previous ones.
    pub fn connect<P, M, F>(&self, map: M, render: F) -> Connection<S, A, R, P>
    where
        P: PartialEq + Clone + Send + 'static,
        M: Fn(&S) -> P + Send + Sync + 'static,
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.connect_with((), move |state: &S, _: &()| map(state), render)
    }

    /// Connect with own props merged into the mapping
    ///
    /// `map` sees the current state and the connection's own props. Replace
    /// the own props later with [`Connection::set_own_props`].
    pub fn connect_with<O, P, M, F>(&self, own: O, map: M, render: F) -> Connection<S, A, R, P, O>
    where
        O: Send + 'static,
        P: PartialEq + Clone + Send + 'static,
        M: Fn(&S, &O) -> P + Send + Sync + 'static,
        F: Fn(&P) + Send + Sync + 'static,
    {
        let initial = map(&self.get_state(), &own);
        render(&initial);

        let binding = Arc::new(Binding {
            store_name: self.name().to_string(),
            own: Mutex::new(own),
            props: Mutex::new(initial),
            map: Box::new(map),
            render: Box::new(render),
        });

        let observer = Arc::clone(&binding);
        let subscription = self.subscribe(move |state| observer.update(state));

        Connection {
            store: self.clone(),
            binding,
            subscription,
        }
    }
}

impl<S, A, R, P, O> Connection<S, A, R, P, O>
where
    R: Reducer<State = S, Action = A> + Send + Sync + 'static,
    S: Send + Sync + 'static,
    A: Send + 'static,
    P: PartialEq + Clone,
{
    /// Props from the most recent render
    #[must_use]
    pub fn props(&self) -> P {
        lock(&self.binding.props).clone()
    }

    /// Current own props
    #[must_use]
    pub fn own_props(&self) -> O
    where
        O: Clone,
    {
        lock(&self.binding.own).clone()
    }

    /// Replace the own props
    ///
    /// Re-maps against the current state immediately and renders if the
    /// resulting props changed.
    pub fn set_own_props(&self, own: O) {
        *lock(&self.binding.own) = own;
        tracing::trace!(store = %self.binding.store_name, "Own props replaced");
        self.binding.update(&self.store.get_state());
    }

    /// Dispatch through the connected store
    pub fn dispatch(&self, action: impl IntoDispatch<A>) -> DispatchFuture {
        self.store.dispatch(action)
    }

    /// The connected store
    #[must_use]
    pub const fn store(&self) -> &Store<S, A, R> {
        &self.store
    }
}

impl<S, A, R, P, O> Drop for Connection<S, A, R, P, O>
where
    R: Reducer<State = S, Action = A>,
{
    fn drop(&mut self) {
        // The handle never leaves the connection, so this is the first call
        let _ = self.subscription.unsubscribe();
    }
}

impl<S, A, R, P, O> std::fmt::Debug for Connection<S, A, R, P, O>
where
    R: Reducer<State = S, Action = A>,
    P: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("props", &*lock(&self.binding.props))
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}
