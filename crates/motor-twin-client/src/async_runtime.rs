//! Unified async runtime abstraction for native and WASM platforms.
//!
//! Provides a single `TaskSpawner` `SystemParam` that hides platform differences:
//! - Native: Uses `bevy_tokio_tasks` for the Tokio runtime `rumqttc` needs
//! - WASM: Uses Bevy's built-in `AsyncComputeTaskPool` on the browser event loop

use bevy::prelude::*;

/// Plugin that sets up the async runtime for the current platform.
///
/// On native, this adds the Tokio runtime plugin. On WASM, this is a no-op
/// since Bevy's task pool handles async execution.
pub struct AsyncRuntimePlugin;

impl Plugin for AsyncRuntimePlugin {
    fn build(&self, app: &mut App) {
        #[cfg(target_family = "wasm")]
        let _ = app;

        #[cfg(not(target_family = "wasm"))]
        app.add_plugins(bevy_tokio_tasks::TokioTasksPlugin::default());
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use std::future::Future;

    use bevy::{ecs::system::SystemParam, prelude::*};

    /// Spawns long-lived background tasks on the Tokio runtime.
    #[derive(SystemParam)]
    pub struct TaskSpawner<'w, 's> {
        runtime: Res<'w, bevy_tokio_tasks::TokioTasksRuntime>,
        // Keeps the signature identical to the WASM version.
        #[allow(dead_code)]
        _local: Local<'s, ()>,
    }

    impl TaskSpawner<'_, '_> {
        /// Spawn a background task that runs until it returns.
        ///
        /// Tasks report back to the main thread through `async_channel`.
        pub fn spawn<F>(&self, future: F)
        where
            F: Future<Output = ()> + Send + 'static,
        {
            self.runtime.spawn_background_task(move |_ctx| future);
        }
    }
}

#[cfg(target_family = "wasm")]
mod wasm {
    use std::future::Future;

    use bevy::{ecs::system::SystemParam, prelude::*, tasks::AsyncComputeTaskPool};

    /// Spawns long-lived background tasks on the browser event loop.
    ///
    /// No runtime resource is needed, so only placeholder params are held.
    #[derive(SystemParam)]
    pub struct TaskSpawner<'w, 's> {
        #[allow(dead_code)]
        _local: Local<'s, ()>,
        #[allow(dead_code)]
        _marker: std::marker::PhantomData<&'w ()>,
    }

    impl TaskSpawner<'_, '_> {
        /// Spawn a background task that runs until it returns.
        ///
        /// The browser is single-threaded, so the future need not be `Send`.
        pub fn spawn<F>(&self, future: F)
        where
            F: Future<Output = ()> + 'static,
        {
            AsyncComputeTaskPool::get().spawn_local(future).detach();
        }
    }
}

#[cfg(not(target_family = "wasm"))]
pub use native::TaskSpawner;
#[cfg(target_family = "wasm")]
pub use wasm::TaskSpawner;
