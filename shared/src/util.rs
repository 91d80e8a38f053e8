/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms, collision-free at marketplace scale)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Snowflake ID rendered as the string form used for record keys
/// (`purchase_id`, `commission_id`, ...).
pub fn new_id() -> String {
    snowflake_id().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_ids_are_positive_and_mostly_distinct() {
        let ids: Vec<i64> = (0..64).map(|_| snowflake_id()).collect();
        assert!(ids.iter().all(|id| *id > 0));
        // 12 random bits per millisecond; a full 64-way collision cannot
        // happen, individual pairs occasionally can
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert!(unique.len() > 1);
        assert!(new_id().parse::<i64>().is_ok());
    }
}
