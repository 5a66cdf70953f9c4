//! Password scrambling for the handshake response.

use sha1::{Digest, Sha1};

/// Turns a plaintext password and the server's scramble into the auth
/// response bytes. Implementations must be pure functions of their inputs.
pub trait PasswordHasher {
    fn hash(&self, password: &[u8], scramble: &[u8]) -> Vec<u8>;
}

impl<F> PasswordHasher for F
where
    F: Fn(&[u8], &[u8]) -> Vec<u8>,
{
    fn hash(&self, password: &[u8], scramble: &[u8]) -> Vec<u8> {
        self(password, scramble)
    }
}

/// `mysql_native_password`:
/// `SHA1(password) XOR SHA1(scramble + SHA1(SHA1(password)))`.
///
/// An empty password yields an empty response, as the server expects.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePassword;

impl PasswordHasher for NativePassword {
    fn hash(&self, password: &[u8], scramble: &[u8]) -> Vec<u8> {
        if password.is_empty() {
            return Vec::new();
        }
        let stage1 = Sha1::digest(password);
        let stage2 = Sha1::digest(stage1);

        let mut hasher = Sha1::new();
        hasher.update(scramble);
        hasher.update(stage2);
        let mask = hasher.finalize();

        stage1.iter().zip(mask.iter()).map(|(a, b)| a ^ b).collect()
    }
}
