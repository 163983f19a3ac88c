//! Card Token Generation
//!
//! Tokens are the public identifier printed on a loyalty card: 8
//! characters from a 33-symbol alphabet with the visually ambiguous
//! I / O / 0 removed. ~33^8 ≈ 1.4e12 combinations, so collisions are
//! rare; the retry loop is still bounded so a degraded store cannot
//! spin it forever.

use crate::db::repository::{RepoError, RepoResult, client};
use sqlx::SqlitePool;

/// Uppercase letters and digits minus I, O and 0
pub const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ123456789";

/// Token length in characters
pub const TOKEN_LEN: usize = 8;

/// Collision retries before giving up
const MAX_ATTEMPTS: u32 = 20;

/// Draw one candidate token uniformly at random
pub fn generate_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Generate a token not present in the store.
///
/// Re-draws on collision, at most [`MAX_ATTEMPTS`] times.
pub async fn issue_token(pool: &SqlitePool) -> RepoResult<String> {
    for _ in 0..MAX_ATTEMPTS {
        let token = generate_token();
        if !client::token_exists(pool, &token).await? {
            return Ok(token);
        }
        tracing::warn!(token = %token, "Token collision, re-drawing");
    }
    Err(RepoError::Database(format!(
        "Failed to generate a unique token after {MAX_ATTEMPTS} attempts"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn test_alphabet_has_33_unambiguous_symbols() {
        assert_eq!(TOKEN_ALPHABET.len(), 33);
        for banned in [b'I', b'O', b'0'] {
            assert!(!TOKEN_ALPHABET.contains(&banned));
        }
    }

    #[test]
    fn test_generated_token_shape() {
        for _ in 0..100 {
            let token = generate_token();
            assert_eq!(token.len(), TOKEN_LEN);
            assert!(token.bytes().all(|b| TOKEN_ALPHABET.contains(&b)));
        }
    }

    #[tokio::test]
    async fn test_issue_token_avoids_existing() {
        let pool = test_pool().await;
        let token = issue_token(&pool).await.unwrap();
        sqlx::query("INSERT INTO client (id, business_id, name, token, status, source) VALUES (1, 1, 'Alice', ?, 'approved', 'staff')")
            .bind(&token)
            .execute(&pool)
            .await
            .unwrap();

        let second = issue_token(&pool).await.unwrap();
        assert_ne!(token, second);
    }
}
