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

//! Cryptographic utilities for package signing.
//!
//! This module provides:
//! - RSA key generation and RSA-SHA384 signing/verification
//! - Passphrase-encrypted PKCS#8 private keys
//! - X.509 certificate parsing, issuer checks and fingerprints
//! - The digests used for leaves, tree nodes and fingerprints

mod certificate;
mod digest;
mod key_encryption;
mod rsa_key;
mod signing;

pub use certificate::{Certificate, CertificateError};
pub use digest::{sha1_file, sha1_hex, sha256_hex, sha384_hex};
pub use key_encryption::{
    decrypt_private_key, encrypt_private_key, is_encrypted_pem, KeyEncryptionError,
};
pub use rsa_key::RsaKey;
pub use signing::{
    compute_key_fingerprint, generate_signing_keypair, sign_message, verify_signature,
    GeneratedKeypair, SigningError, DEFAULT_KEY_BITS,
};
