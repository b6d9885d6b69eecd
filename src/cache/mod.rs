//! Template cache for expensive-to-build databases
//!
//! Caches fully built databases as clonable templates keyed by a content
//! fingerprint of their build inputs. Template names encode both recency and
//! fingerprint (`{prefix}-{YYYYmmddHHMM}-{hash}`), so lookup, touch, and
//! eviction are all name operations against the shared store.
//!
//! Concurrent processes sharing a prefix are serialized by a store advisory
//! lock derived from the prefix; see [`lock`].

pub mod lock;
pub mod name;
pub mod template;

pub use name::{check_database_name, check_prefix, decode, DecodedName};
pub use template::TemplateCache;
