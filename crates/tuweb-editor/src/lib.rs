// ABOUTME: Editor session layer tying documents, remote content and keyboard input together
// ABOUTME: Controller, gateway contract, auto-save debouncer, keymap and configuration

pub mod config;
pub mod controller;
pub mod debouncer;
pub mod error;
pub mod gateway;
pub mod keyboard;
pub mod keymap;
pub mod preferences;
pub mod surface;

pub use config::EditorConfig;
pub use controller::{EditorSessionController, SaveOutcome};
pub use debouncer::{DebounceConfig, Debouncer};
pub use error::{EditorError, GatewayError};
pub use gateway::{ContentGateway, FsGateway, InMemoryGateway, RemoteContent};
pub use keyboard::{KeyboardHub, ListenerGuard};
pub use keymap::{EditorAction, Keymap};
pub use preferences::EditorPreferences;
pub use surface::EditorSurface;
