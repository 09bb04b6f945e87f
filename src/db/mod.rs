//! Local persistence: the record cache and the credential file.

pub mod cache;
pub mod codec;
pub mod credentials;

pub use cache::LocalCache;
pub use codec::{Codec, JsonCodec, ZstdJsonCodec};
pub use credentials::CredentialStore;

/// Record kinds, used as directory names under `data/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Activity,
    Stream,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Activity => "activity",
            RecordKind::Stream => "stream",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
