//! Durable document stores backing the scanner.
//!
//! Both stores persist one JSON document per file, gzip-compressed at rest.
//! Files are read in full and rewritten in full; every rewrite goes through
//! a sibling temp file followed by a rename, so a crash mid-write cannot
//! leave a torn document behind. A missing or undecodable file degrades to
//! an empty document instead of failing.

pub mod cache;
pub mod state;

pub use cache::UrlCache;
pub use state::{MAX_TRACKED_SUBMISSIONS, ScanState, StateStore, UserRecord};

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Error;

/// Read and decode a gzip JSON document. `Ok(None)` means the file does not
/// exist yet.
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, Error> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut json = String::new();
    GzDecoder::new(file).read_to_string(&mut json)?;
    Ok(Some(serde_json::from_str(&json)?))
}

/// Encode and write a gzip JSON document, replacing the target atomically
/// via a sibling temp file and rename.
fn write_document<T: Serialize>(path: &Path, doc: &T) -> Result<(), Error> {
    let json = serde_json::to_vec(doc)?;

    let tmp = path.with_extension("tmp");
    let mut encoder = GzEncoder::new(File::create(&tmp)?, Compression::default());
    encoder.write_all(&json)?;
    encoder.finish()?;

    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load a document, falling back to the default for a missing or
/// undecodable file.
fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_document(path) {
        Ok(Some(doc)) => doc,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "discarding undecodable store file");
            T::default()
        }
    }
}
