//! The blind signer: owns the keysets, signs blinded messages and verifies proofs.
//!
//! [`LocalSigner`] runs in-process. [`RemoteSigner`] speaks the same operations over a [`SignerTransport`], and
//! [`SignerService`] is the matching server side that dispatches requests onto any [`Signer`].

pub mod error;
pub mod local;
pub mod messages;
pub mod remote;
mod traits;

pub use error::{SignerError, SignerErrorKind};
pub use local::LocalSigner;
pub use messages::{RemoteError, SignerRequest, SignerResponse};
pub use remote::{RemoteSigner, SignerService, SignerTransport};
pub use traits::{RotateArgs, Signer, SpendContext};
