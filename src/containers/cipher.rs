//! AES-128-CBC layer shared by the encrypted container formats.
//!
//! Key and IV are fixed protocol constants. The cipher hides the payload from casual
//! inspection; it is not a secret.

use aes::Aes128;
use cbc::cipher::{block_padding::NoPadding, BlockDecryptMut, KeyIvInit};
use log::trace;

use crate::error::DecodeError;

type Aes128CbcDec = cbc::Decryptor<Aes128>;

pub const AES_BLOCK_SIZE: usize = 16;
pub const AES_SECRET_KEY: [u8; 16] = *b"78hrey23y28ogs89";
pub const AES_IV: [u8; 16] = *b"1234567890123456";

/// Decrypt a block-aligned buffer. No padding is stripped: the plaintext has the
/// same length as the ciphertext.
pub fn decrypt(ciphertext: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if ciphertext.len() % AES_BLOCK_SIZE != 0 {
        return Err(DecodeError::CipherLengthMismatch(format!(
            "ciphertext of {} bytes is not a multiple of the {}-byte block size",
            ciphertext.len(),
            AES_BLOCK_SIZE
        )));
    }

    let mut buffer = ciphertext.to_vec();
    let plaintext_len = Aes128CbcDec::new(&AES_SECRET_KEY.into(), &AES_IV.into())
        .decrypt_padded_mut::<NoPadding>(&mut buffer)
        .map_err(|_| {
            DecodeError::CipherLengthMismatch("AES-CBC rejected the ciphertext".to_string())
        })?
        .len();
    buffer.truncate(plaintext_len);

    trace!("Decrypted {} bytes", plaintext_len);
    Ok(buffer)
}

/// Decrypt and require the plaintext to be a non-zero multiple of `unit` bytes.
pub fn decrypt_units(ciphertext: &[u8], unit: usize) -> Result<Vec<u8>, DecodeError> {
    let plaintext = decrypt(ciphertext)?;

    if plaintext.is_empty() || plaintext.len() % unit != 0 {
        return Err(DecodeError::CipherLengthMismatch(format!(
            "plaintext of {} bytes is not a whole number of {}-byte frames",
            plaintext.len(),
            unit
        )));
    }

    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc::cipher::BlockEncryptMut;

    type Aes128CbcEnc = cbc::Encryptor<Aes128>;

    fn encrypt(plaintext: &[u8]) -> Vec<u8> {
        let mut buffer = plaintext.to_vec();
        let len = buffer.len();
        Aes128CbcEnc::new(&AES_SECRET_KEY.into(), &AES_IV.into())
            .encrypt_padded_mut::<NoPadding>(&mut buffer, len)
            .expect("aligned plaintext");
        buffer
    }

    #[test]
    fn decrypt_inverts_protocol_encryption() -> anyhow::Result<()> {
        let plaintext: Vec<u8> = (0..64u8).collect();
        let ciphertext = encrypt(&plaintext);
        assert_ne!(ciphertext, plaintext);

        assert_eq!(decrypt(&ciphertext)?, plaintext);
        Ok(())
    }

    #[test]
    fn unaligned_ciphertext_is_rejected() {
        let err = decrypt(&[0u8; 17]).unwrap_err();
        assert!(matches!(err, DecodeError::CipherLengthMismatch(_)));
    }

    #[test]
    fn plaintext_must_cover_whole_frames() {
        let ciphertext = encrypt(&[0u8; 32]);
        let err = decrypt_units(&ciphertext, 768).unwrap_err();
        assert!(matches!(err, DecodeError::CipherLengthMismatch(_)));

        let err = decrypt_units(&[], 768).unwrap_err();
        assert!(matches!(err, DecodeError::CipherLengthMismatch(_)));
    }
}
