pub mod autoplay;
pub mod messages;
pub mod position;
pub mod state;
pub mod update;
pub mod video;

pub use autoplay::AutoplayAndIdleUiController;
pub use messages::WatchMessage;
pub use position::PlaybackPositionController;
pub use state::{WatchField, WatchPatch, WatchState, WatchStore};
pub use update::WatchController;
pub use video::{MediaElement, SeekPointer};
