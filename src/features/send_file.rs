//! Zero-copy file send capability.

use std::future::{self, Ready};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::features::LegacyFeatureCollection;
use crate::legacy::WHOLE_FILE;
use crate::observability::metrics;

/// Outcome of a failed [`HttpSendFileFeature::send_file`].
#[derive(Debug, Error)]
pub enum SendFileError {
    #[error("send-file cancelled before it started")]
    Cancelled,

    #[error("offset {offset} or length {length:?} exceeds the legacy file range")]
    OutOfRange { offset: u64, length: Option<u64> },

    #[error("failed to transmit {}", path.display())]
    Failed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// File transmission of the new abstraction.
pub trait HttpSendFileFeature {
    /// Send `length` bytes of `path` from `offset`, or the rest of the file
    /// when `length` is `None`.
    ///
    /// Failures come back inside the returned future; nothing is raised
    /// synchronously. Must be called on the thread processing the request.
    fn send_file(
        &self,
        path: &Path,
        offset: u64,
        length: Option<u64>,
        cancellation: &CancellationToken,
    ) -> Ready<Result<(), SendFileError>>;
}

impl LegacyFeatureCollection {
    fn transmit(&self, path: &Path, offset: u64, length: Option<u64>) -> Result<(), SendFileError> {
        let out_of_range = || SendFileError::OutOfRange { offset, length };
        let legacy_offset = i64::try_from(offset).map_err(|_| out_of_range())?;
        let legacy_length = match length {
            Some(length) => i64::try_from(length).map_err(|_| out_of_range())?,
            None => WHOLE_FILE,
        };

        self.context
            .transmit_file(path, legacy_offset, legacy_length)
            .map_err(|source| SendFileError::Failed {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl HttpSendFileFeature for LegacyFeatureCollection {
    fn send_file(
        &self,
        path: &Path,
        offset: u64,
        length: Option<u64>,
        cancellation: &CancellationToken,
    ) -> Ready<Result<(), SendFileError>> {
        if cancellation.is_cancelled() {
            tracing::debug!(path = %path.display(), "send-file skipped, already cancelled");
            metrics::record_send_file("cancelled");
            return future::ready(Err(SendFileError::Cancelled));
        }

        let result = self.transmit(path, offset, length);
        match &result {
            Ok(()) => metrics::record_send_file("sent"),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "send-file failed");
                metrics::record_send_file("failed");
            }
        }
        future::ready(result)
    }
}
