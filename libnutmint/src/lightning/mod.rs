//! The Lightning payment backend the mint pays and receives through.

pub mod error;
#[cfg(feature = "fake_lightning")]
pub mod fake;
mod traits;

pub use error::LightningError;
pub use traits::{FeesResponse, InvoiceResponse, LightningBackend, PaymentResponse, PaymentStatus};
