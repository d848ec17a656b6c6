// Linux-specific helpers: /proc private-memory counters.

/// Anonymous resident + swapped-out memory of `pid` from /proc/<pid>/status, in bytes.
/// This is the closest Linux counterpart to per-process private bytes.
pub(super) fn read_private_bytes_linux(pid: u32) -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
        let rss_anon = status_kb(&content, "RssAnon:")?;
        let swap = status_kb(&content, "VmSwap:").unwrap_or(0);
        Some((rss_anon + swap) * 1024)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = pid;
        None
    }
}

/// Value of a "Key:   1234 kB" line.
#[cfg(target_os = "linux")]
fn status_kb(content: &str, key: &str) -> Option<u64> {
    content
        .lines()
        .find_map(|line| line.strip_prefix(key))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|v| v.parse().ok())
}
