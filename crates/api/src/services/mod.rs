//! Collaborator interfaces the marketplace consumes, and their default
//! implementations. Identity, references, signature verification, and
//! notification are owned by other parts of the platform; the core talks
//! to them only through these traits.

pub mod directory;
pub mod notifier;
pub mod reference_store;
pub mod signature;

pub use directory::{PgSignerDirectory, SignerDirectory, UserIdentity};
pub use notifier::{spawn_notify, Notifier, SmtpNotifier};
pub use reference_store::{PgReferenceStore, ReferenceStore, ReferenceSummary};
pub use signature::{Ed25519Verifier, SignatureVerifier};
