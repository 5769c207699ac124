mod state;

pub use state::{AppState, DatasetCache, DatasetSource};
