use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

/// Email-OTP challenges live 5 minutes.
pub const OTP_TTL: Duration = Duration::minutes(5);
/// Password-reset challenges live 10 minutes.
pub const RESET_TTL: Duration = Duration::minutes(10);

/// Six-digit numeric one-time password.
pub fn generate_otp() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    n.to_string()
}

/// High-entropy reset token: 32 random bytes, hex-encoded.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hex digest. Challenge secrets are persisted only in this form.
pub fn sha256_hex(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// True when a stored challenge is absent or past its expiry.
pub fn challenge_expired(expires_at: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
    match expires_at {
        Some(t) => t <= now,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..200 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            assert!(!otp.starts_with('0'));
        }
    }

    #[test]
    fn reset_token_is_64_hex_chars() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_reset_token());
    }

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_never_equals_secret() {
        let otp = generate_otp();
        assert_ne!(sha256_hex(&otp), otp);
    }

    #[test]
    fn expiry_check() {
        let now = OffsetDateTime::now_utc();
        assert!(challenge_expired(None, now));
        assert!(challenge_expired(Some(now - Duration::seconds(1)), now));
        assert!(!challenge_expired(Some(now + OTP_TTL), now));
    }
}
