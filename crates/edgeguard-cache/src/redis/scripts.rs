//! Server-side Lua scripts.
//!
//! A script runs atomically inside Redis, so concurrent edge instances
//! never interleave between the read and the write.

/// Fixed-window admission.
///
/// KEYS[1] = counter key
/// ARGV[1] = window length in milliseconds
/// ARGV[2] = limit
///
/// Returns:
///   1 = admitted (counter created or incremented)
///   0 = denied (counter left untouched)
pub const FIXED_WINDOW_SCRIPT: &str = r#"
    local current = redis.call('GET', KEYS[1])
    if not current then
        redis.call('SET', KEYS[1], 1, 'PX', ARGV[1])
        return 1
    end

    if tonumber(current) < tonumber(ARGV[2]) then
        redis.call('INCR', KEYS[1])
        return 1
    end

    return 0
"#;
