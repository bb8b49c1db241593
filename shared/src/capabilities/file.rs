use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingest::FileHandle;

/// Shell-side file access: reading a selected file and saving a remote image locally.
pub struct FileIo<Ev> {
    context: CapabilityContext<FileOperation, Ev>,
}

impl<Ev> Clone for FileIo<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for FileIo<Ev> {
    type Operation = FileOperation;
    type MappedSelf<MappedEv> = FileIo<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        FileIo::new(self.context.map_event(f))
    }
}

impl<Ev> FileIo<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<FileOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn read<F>(&self, handle: FileHandle, make_event: F)
    where
        F: FnOnce(FileResult) -> Ev + Send + 'static,
    {
        self.request(FileOperation::Read { handle }, make_event);
    }

    pub fn save_url<F>(&self, url: String, file_name: String, make_event: F)
    where
        F: FnOnce(FileResult) -> Ev + Send + 'static,
    {
        self.request(FileOperation::SaveUrl { url, file_name }, make_event);
    }

    fn request<F>(&self, operation: FileOperation, make_event: F)
    where
        F: FnOnce(FileResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(operation).await;
            context.update_app(make_event(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileOperation {
    Read { handle: FileHandle },
    SaveUrl { url: String, file_name: String },
}

impl Operation for FileOperation {
    type Output = FileResult;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileOutput {
    Contents(#[serde(with = "serde_bytes")] Vec<u8>),
    Saved,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileError {
    #[error("file not found: {handle}")]
    NotFound { handle: FileHandle },

    #[error("read failed: {message}")]
    ReadFailed { message: String },

    #[error("save failed: {message}")]
    SaveFailed { message: String },

    #[error("save cancelled by user")]
    Cancelled,
}

pub type FileResult = Result<FileOutput, FileError>;
