//! Contracts shared by encrypted store implementations.

mod cipher;
mod codec;
mod error;

pub use cipher::{AuthenticatedCipher, CipherError};
pub use codec::{CodecError, StructuredCodec, TextFormat};
pub use error::StoreError;
