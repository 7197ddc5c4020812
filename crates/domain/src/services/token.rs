//! Invite token generation.

use rand::Rng;

/// URL-safe characters without the confusable ones (0, O, 1, l, I).
const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";

/// Significant characters in a token.
pub const TOKEN_LENGTH: usize = 16;

/// Characters between hyphens.
const GROUP_SIZE: usize = 4;

/// Generates an invite token such as `Hq7c-Mz2K-dP9x-Tr4B`.
///
/// 16 characters over a 54-symbol alphabet give roughly 92 bits of entropy.
/// Uniqueness is enforced by the store; callers retry on conflict.
pub fn generate_invite_token() -> String {
    let mut rng = rand::thread_rng();
    let mut token = String::with_capacity(TOKEN_LENGTH + TOKEN_LENGTH / GROUP_SIZE);

    for i in 0..TOKEN_LENGTH {
        if i > 0 && i % GROUP_SIZE == 0 {
            token.push('-');
        }
        token.push(CHARSET[rng.gen_range(0..CHARSET.len())] as char);
    }

    token
}
