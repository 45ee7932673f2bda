/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! RSA signing utilities for Merkle roots and authentication challenges.
//!
//! Provides functions for:
//! - Generating RSA signing keypairs
//! - Computing SHA256 public key fingerprints
//! - Signing messages with RSA PKCS#1 v1.5 over SHA-384
//! - Verifying signatures

use super::digest::sha256_hex;
use openssl::hash::MessageDigest;
use openssl::pkey::{HasPublic, PKey, PKeyRef, Private};
use openssl::rsa::Rsa;
use openssl::sign::{Signer, Verifier};
use thiserror::Error;

/// Modulus size used when generating new signing keys.
pub const DEFAULT_KEY_BITS: u32 = 4096;

/// Errors that can occur during signing operations.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Key is not an RSA key")]
    NotRsa,

    #[error("Failed to create signing key: {0}")]
    KeyCreationFailed(String),

    #[error("Failed to create signature: {0}")]
    SignatureFailed(String),

    #[error("Signature verification failed")]
    VerificationFailed,
}

/// A generated RSA keypair in PEM form.
pub struct GeneratedKeypair {
    /// Unencrypted PKCS#8 private key (should be encrypted before storage)
    pub private_key: PKey<Private>,
    /// SubjectPublicKeyInfo PEM
    pub public_key_pem: Vec<u8>,
    /// SHA256 hex fingerprint of the DER public key
    pub fingerprint: String,
}

/// Generates a new RSA signing keypair.
pub fn generate_signing_keypair(bits: u32) -> Result<GeneratedKeypair, SigningError> {
    let rsa = Rsa::generate(bits).map_err(|e| SigningError::KeyCreationFailed(e.to_string()))?;
    let private_key =
        PKey::from_rsa(rsa).map_err(|e| SigningError::KeyCreationFailed(e.to_string()))?;
    let public_key_pem = private_key
        .public_key_to_pem()
        .map_err(|e| SigningError::KeyCreationFailed(e.to_string()))?;
    let fingerprint = compute_key_fingerprint(&private_key)?;

    Ok(GeneratedKeypair {
        private_key,
        public_key_pem,
        fingerprint,
    })
}

/// Computes the SHA256 hex fingerprint of a public key's DER encoding.
pub fn compute_key_fingerprint<T: HasPublic>(key: &PKeyRef<T>) -> Result<String, SigningError> {
    let der = key
        .public_key_to_der()
        .map_err(|e| SigningError::KeyCreationFailed(e.to_string()))?;
    Ok(sha256_hex(&der))
}

/// Signs a message with RSA PKCS#1 v1.5 over SHA-384.
///
/// # Errors
///
/// Returns `SigningError::NotRsa` for non-RSA keys, `SignatureFailed` if
/// OpenSSL rejects the operation.
pub fn sign_message(message: &[u8], private_key: &PKeyRef<Private>) -> Result<Vec<u8>, SigningError> {
    if private_key.rsa().is_err() {
        return Err(SigningError::NotRsa);
    }

    let mut signer = Signer::new(MessageDigest::sha384(), private_key)
        .map_err(|e| SigningError::SignatureFailed(e.to_string()))?;
    signer
        .update(message)
        .map_err(|e| SigningError::SignatureFailed(e.to_string()))?;
    signer
        .sign_to_vec()
        .map_err(|e| SigningError::SignatureFailed(e.to_string()))
}

/// Verifies an RSA-SHA384 signature.
///
/// # Returns
///
/// `Ok(())` if the signature is valid, `SigningError::VerificationFailed`
/// otherwise. Malformed signatures are reported as verification failures.
pub fn verify_signature<T: HasPublic>(
    message: &[u8],
    signature: &[u8],
    public_key: &PKeyRef<T>,
) -> Result<(), SigningError> {
    let mut verifier = Verifier::new(MessageDigest::sha384(), public_key)
        .map_err(|e| SigningError::KeyCreationFailed(e.to_string()))?;
    verifier
        .update(message)
        .map_err(|_| SigningError::VerificationFailed)?;

    match verifier.verify(signature) {
        Ok(true) => Ok(()),
        _ => Err(SigningError::VerificationFailed),
    }
}
