use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

const RADIX: u32 = 36;
const TIME_CHARS: usize = 4;
const RANDOM_CHARS: usize = 2;

/// Short correlation token shared by the on-screen result and the notification.
///
/// Four base-36 characters from the millisecond clock followed by two random
/// ones. Unique enough for interactive use; not a security credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceId(pub String);

impl ReferenceId {
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let random = rand::thread_rng().gen_range(0..RADIX.pow(RANDOM_CHARS as u32)) as u64;
        Self::from_parts(millis, random)
    }

    /// Deterministic constructor behind [`ReferenceId::generate`].
    pub fn from_parts(millis: u64, random: u64) -> Self {
        let time = base36(millis);
        let time = &time[time.len().saturating_sub(TIME_CHARS)..];

        let random = base36(random);
        let random = &random[random.len().saturating_sub(RANDOM_CHARS)..];

        Self(format!(
            "{time:0>width_t$}{random:0>width_r$}",
            width_t = TIME_CHARS,
            width_r = RANDOM_CHARS
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        let digit = (value % RADIX as u64) as u32;
        digits.push(
            char::from_digit(digit, RADIX)
                .unwrap_or('0')
                .to_ascii_uppercase(),
        );
        value /= RADIX as u64;
    }
    digits.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_tail_of_clock_and_random_part() {
        // 36^4 + 10 -> "1000A", random 35 -> "Z"
        let id = ReferenceId::from_parts(36u64.pow(4) + 10, 35);
        assert_eq!(id.as_str(), "000A0Z");
    }

    #[test]
    fn generated_ids_are_six_uppercase_alphanumerics() {
        for _ in 0..50 {
            let id = ReferenceId::generate();
            assert_eq!(id.as_str().len(), 6);
            assert!(id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn rapid_submissions_rarely_collide() {
        let ids: std::collections::HashSet<String> =
            (0..20).map(|_| ReferenceId::generate().0).collect();
        assert!(ids.len() > 1);
    }
}
