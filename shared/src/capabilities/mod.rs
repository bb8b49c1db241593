mod file;

pub use self::file::{FileError, FileIo, FileOperation, FileOutput, FileResult};

// Crux's built-in Render, Http and KeyValue capabilities cover view updates,
// the webhook call and history persistence; only file access is custom.
pub use crux_core::render::Render;
pub use crux_http::Http;
pub use crux_kv::KeyValue;

use crate::event::Event;
use crate::App;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
    pub kv: KeyValue<Event>,
    pub file_io: FileIo<Event>,
}
