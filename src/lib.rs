pub mod candidate;
pub mod classifier;
pub mod collaborators;
pub mod config;
pub mod deck;
pub mod error;
pub mod gesture;
pub mod interpolate;
pub mod layout;
pub mod observable;
pub mod overlay;
pub mod spring;
pub mod stack;

#[cfg(target_arch = "wasm32")]
mod app;

pub use candidate::{parse_deck, Candidate, NO_DATA};
pub use classifier::{classify, Decision};
pub use collaborators::{HapticKind, Haptics, StackCallbacks};
pub use config::EngineConfig;
pub use deck::{CardFrame, RefreshOutcome, SwipeDeck};
pub use error::{ConfigError, DeckError, HapticError, StackError};
pub use gesture::{Commit, GestureDragController, GesturePhase, LiveGeometry};
pub use layout::{layout, CardSize, CardTransform, LayoutTable};
pub use overlay::OverlayOpacity;
pub use stack::{CardStackController, StackStatus};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_app() {
    yew::Renderer::<app::App>::new().render();
}
