//! Site hash derivation.
//!
//! Several sites may share one backend core. Every document carries a short hash of its
//! site, and every query filters on it.

use std::hash::Hasher;

use siphasher::sip::SipHasher13;

/// Length of a derived site hash.
pub const SITE_HASH_LEN: usize = 6;

/// Digits of the base-36 alphabet.
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Derives the site hash from a site name.
///
/// The hash is stable across runs and platforms: six lowercase base-36 characters of a
/// SipHash-1-3 digest with fixed keys.
pub fn site_hash(site_name: &str) -> String {
    let mut hasher = SipHasher13::new();
    hasher.write(site_name.as_bytes());
    let mut value = hasher.finish();

    let mut out = Vec::with_capacity(SITE_HASH_LEN);
    for _ in 0..SITE_HASH_LEN {
        let digit = usize::try_from(value % 36).unwrap_or_default();
        out.push(BASE36[digit]);
        value /= 36;
    }
    out.into_iter().rev().map(char::from).collect()
}
