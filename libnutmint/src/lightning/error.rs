use crate::amount::Unit;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LightningError {
    #[error("The backend does not support the {0} unit")]
    UnitNotSupported(Unit),
    #[error("Invalid payment request: {0}")]
    InvalidInvoice(String),
    #[error("The backend does not know payment {0}")]
    UnknownPayment(String),
    #[error("Lightning backend error: {0}")]
    Backend(String),
}
