mod controller;
mod input;
pub mod replies;
mod transcript;

pub use controller::{Dispatch, RequestId, SubmissionController};
pub use input::{InputAction, InputBuffer};
pub use transcript::{Entry, EntryHandle, NullSurface, Role, Surface, Transcript};
