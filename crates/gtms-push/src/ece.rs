//! `aes128gcm` message encryption for Web Push (RFC 8291 over RFC 8188).

use aes_gcm::aead::Aead;
use aes_gcm::{Aes128Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hkdf::Hkdf;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

use crate::error::PushError;

/// Record size advertised in the content-coding header.
pub const RECORD_SIZE: u32 = 4096;
/// Salt, record size, key id length and an uncompressed P-256 key id.
const HEADER_LEN: usize = 16 + 4 + 1 + 65;
const TAG_LEN: usize = 16;
/// Largest plaintext whose encrypted body stays within 4096 bytes, the
/// most push services accept.
pub const MAX_PLAINTEXT: usize = RECORD_SIZE as usize - HEADER_LEN - TAG_LEN - 1;

const KEY_INFO: &[u8] = b"WebPush: info\0";
const CEK_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";
const LAST_RECORD_DELIMITER: u8 = 0x02;

/// Decode base64url, tolerating padding and the standard alphabet.
pub fn decode_b64url(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = value
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD.decode(normalized)
}

/// Encrypt `plaintext` for a subscription with a fresh ephemeral key and
/// salt.
pub fn encrypt(plaintext: &[u8], p256dh: &str, auth: &str) -> Result<Vec<u8>, PushError> {
    let ephemeral = SecretKey::random(&mut OsRng);
    let mut salt = [0u8; 16];
    OsRng.fill_bytes(&mut salt);
    encrypt_with(plaintext, p256dh, auth, &ephemeral, salt)
}

/// Encrypt with a caller-chosen ephemeral key and salt.
pub fn encrypt_with(
    plaintext: &[u8],
    p256dh: &str,
    auth: &str,
    ephemeral: &SecretKey,
    salt: [u8; 16],
) -> Result<Vec<u8>, PushError> {
    if plaintext.len() > MAX_PLAINTEXT {
        return Err(PushError::Encryption(format!(
            "payload of {} bytes exceeds {MAX_PLAINTEXT}",
            plaintext.len()
        )));
    }

    let ua_public_bytes = decode_b64url(p256dh)
        .map_err(|e| PushError::Encryption(format!("invalid p256dh key: {e}")))?;
    let auth_secret = decode_b64url(auth)
        .map_err(|e| PushError::Encryption(format!("invalid auth secret: {e}")))?;
    let ua_public = PublicKey::from_sec1_bytes(&ua_public_bytes)
        .map_err(|_| PushError::Encryption("p256dh is not a P-256 point".into()))?;

    let ua_point = ua_public.to_encoded_point(false);
    let as_public = ephemeral.public_key().to_encoded_point(false);
    let shared = p256::ecdh::diffie_hellman(ephemeral.to_nonzero_scalar(), ua_public.as_affine());

    let (cek, nonce) = derive_keys(
        shared.raw_secret_bytes().as_slice(),
        &auth_secret,
        ua_point.as_bytes(),
        as_public.as_bytes(),
        &salt,
    )?;

    let mut record = Vec::with_capacity(plaintext.len() + 1);
    record.extend_from_slice(plaintext);
    record.push(LAST_RECORD_DELIMITER);

    let cipher = Aes128Gcm::new_from_slice(&cek)
        .map_err(|e| PushError::Encryption(format!("content key: {e}")))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), record.as_slice())
        .map_err(|_| PushError::Encryption("AES-GCM encryption failed".into()))?;

    let key_id = as_public.as_bytes();
    let mut body = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    body.extend_from_slice(&salt);
    body.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    body.push(key_id.len() as u8);
    body.extend_from_slice(key_id);
    body.extend_from_slice(&ciphertext);
    Ok(body)
}

/// Derive the content encryption key and nonce from the ECDH secret.
fn derive_keys(
    ecdh_secret: &[u8],
    auth_secret: &[u8],
    ua_public: &[u8],
    as_public: &[u8],
    salt: &[u8; 16],
) -> Result<([u8; 16], [u8; 12]), PushError> {
    let expand_err = |e: hkdf::InvalidLength| PushError::Encryption(format!("HKDF: {e}"));

    let mut ikm = [0u8; 32];
    Hkdf::<Sha256>::new(Some(auth_secret), ecdh_secret)
        .expand_multi_info(&[KEY_INFO, ua_public, as_public], &mut ikm)
        .map_err(expand_err)?;

    let prk = Hkdf::<Sha256>::new(Some(salt), &ikm);
    let mut cek = [0u8; 16];
    prk.expand(CEK_INFO, &mut cek).map_err(expand_err)?;
    let mut nonce = [0u8; 12];
    prk.expand(NONCE_INFO, &mut nonce).map_err(expand_err)?;
    Ok((cek, nonce))
}
