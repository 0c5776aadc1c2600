//! Password hashing and verification using Argon2id.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

/// Argon2id hasher with OWASP-recommended parameters
/// (memory: 19 MiB, iterations: 2, parallelism: 1).
fn hasher() -> Result<Argon2<'static>, AuthError> {
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params: {e}")))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Apply the optional pepper. Returns the bytes fed to Argon2.
fn peppered(password: &str, pepper: Option<&str>) -> Vec<u8> {
    match pepper {
        Some(p) => format!("{p}{password}").into_bytes(),
        None => password.as_bytes().to_vec(),
    }
}

/// Hash a plaintext password into a self-describing PHC string.
///
/// The algorithm, cost parameters and a fresh random salt are embedded
/// in the output, so two calls with the same input never return the
/// same string. Empty passwords are rejected.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, AuthError> {
    if password.is_empty() {
        return Err(AuthError::WeakPassword { min: 1 });
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(&peppered(password, pepper), &salt)
        .map_err(|e| AuthError::Crypto(format!("password hash: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a PHC-format hash.
///
/// Returns `Ok(true)` on match and `Ok(false)` on mismatch. A hash that
/// cannot be parsed, or names an algorithm other than Argon2, yields
/// `Err(AuthError::MalformedHash)`. The cost parameters are read from
/// the stored hash, not from the current defaults.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::MalformedHash(format!("invalid hash format: {e}")))?;
    if parsed_hash.salt.is_none() {
        return Err(AuthError::MalformedHash("missing salt".into()));
    }
    // Every hash we issue carries a full-length tag; a shorter one is a
    // truncated record, not a wrong password.
    match parsed_hash.hash {
        Some(output) if output.len() == argon2::Params::DEFAULT_OUTPUT_LEN => {}
        Some(output) => {
            return Err(AuthError::MalformedHash(format!(
                "hash output is {} bytes, expected {}",
                output.len(),
                argon2::Params::DEFAULT_OUTPUT_LEN
            )));
        }
        None => return Err(AuthError::MalformedHash("missing hash output".into())),
    }

    match Argon2::default().verify_password(&peppered(password, pepper), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::MalformedHash(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter2", None).unwrap();
        assert!(verify_password("hunter2", &hash, None).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("hunter2", None).unwrap();
        assert!(!verify_password("hunter3", &hash, None).unwrap());
    }

    #[test]
    fn hash_is_argon2id_phc_string() {
        let hash = hash_password("s3cret!", None).unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(!hash.contains("s3cret!"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let h1 = hash_password("s3cret!", None).unwrap();
        let h2 = hash_password("s3cret!", None).unwrap();
        assert_ne!(h1, h2);
        assert!(verify_password("s3cret!", &h1, None).unwrap());
        assert!(verify_password("s3cret!", &h2, None).unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_password("hunter2", Some("pepper!")).unwrap();
        assert!(verify_password("hunter2", &hash, Some("pepper!")).unwrap());
        assert!(!verify_password("hunter2", &hash, None).unwrap());
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(
            hash_password("", None),
            Err(AuthError::WeakPassword { .. })
        ));
    }

    #[test]
    fn malformed_hash_returns_error() {
        let result = verify_password("pw", "not-a-hash", None);
        assert!(matches!(result, Err(AuthError::MalformedHash(_))));
    }

    #[test]
    fn truncated_hash_returns_error() {
        let hash = hash_password("hunter2", None).unwrap();
        // Cut inside the salt segment so the hash output is gone.
        let truncated = &hash[..hash.len() / 2];
        assert!(matches!(
            verify_password("hunter2", truncated, None),
            Err(AuthError::MalformedHash(_))
        ));
    }

    #[test]
    fn hash_cut_inside_output_returns_error() {
        let hash = hash_password("hunter2", None).unwrap();
        for cut in 1..=30 {
            let truncated = &hash[..hash.len() - cut];
            assert!(
                matches!(
                    verify_password("hunter2", truncated, None),
                    Err(AuthError::MalformedHash(_))
                ),
                "cut={cut} accepted {truncated}"
            );
        }
    }

    #[test]
    fn unknown_algorithm_returns_error() {
        let hash = hash_password("hunter2", None).unwrap();
        let foreign = hash.replacen("argon2id", "scrypt", 1);
        assert!(matches!(
            verify_password("hunter2", &foreign, None),
            Err(AuthError::MalformedHash(_))
        ));
    }
}
