//! Random certificate serial numbers.

use rand::RngCore;
use x509_cert::serial_number::SerialNumber;

use crate::error::{PkiError, PkiResult};

/// Serial numbers are uniform on `[0, 2^SERIAL_BITS)`.
pub const SERIAL_BITS: usize = 159;

const SERIAL_LEN: usize = (SERIAL_BITS + 7) / 8;

/// Serial number of the self-signed root certificate.
pub const ROOT_SERIAL: u8 = 1;

/// Draw a serial number from the OS randomness source.
pub fn random_serial() -> PkiResult<SerialNumber> {
    random_serial_from(&mut rand::rngs::OsRng)
}

/// Draw a serial number from `rng`, failing if the source fails.
pub fn random_serial_from<R: RngCore + ?Sized>(rng: &mut R) -> PkiResult<SerialNumber> {
    let mut bytes = [0u8; SERIAL_LEN];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| PkiError::SerialGeneration(e.to_string()))?;

    // 20 bytes hold 160 bits; clear the top one
    bytes[0] &= 0x7f;

    SerialNumber::new(&bytes).map_err(|e| PkiError::SerialGeneration(e.to_string()))
}

pub fn root_serial() -> PkiResult<SerialNumber> {
    SerialNumber::new(&[ROOT_SERIAL]).map_err(|e| PkiError::Signing(e.to_string()))
}
