//! Pure parsers for the command and sysfs output the board monitor consumes.

use super::{MemoryData, RamData, SwapData};
use regex::Regex;
use std::collections::HashMap;

/// Parse `nvpmodel -q` output into (mode name, mode id).
///
/// The tool prints something like:
/// ```text
/// NV Fan Mode:quiet
/// NV Power Mode: MAXN
/// 0
/// ```
pub fn parse_nvpmodel_query(output: &str) -> Option<(String, i64)> {
    let mut name = None;
    let mut id = None;
    for line in output.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("NV Power Mode:") {
            name = Some(rest.trim().to_string());
        } else if let Ok(n) = line.parse::<i64>() {
            id = Some(n);
        }
    }
    Some((name?, id?))
}

/// Extract the assignable power models from `/etc/nvpmodel.conf`.
///
/// Mode headers look like `< POWER_MODEL ID=0 NAME=MAXN >`.
pub fn parse_nvpmodel_conf(conf: &str) -> Vec<(i64, String)> {
    let re = Regex::new(r"<\s*POWER_MODEL\s+ID=(\d+)\s+NAME=(\S+)\s*>").unwrap();
    re.captures_iter(conf)
        .filter_map(|caps| {
            let id = caps[1].parse::<i64>().ok()?;
            Some((id, caps[2].to_string()))
        })
        .collect()
}

/// Parse `/etc/nv_tegra_release` into a dotted L4T version.
///
/// The file starts with a line such as
/// `# R32 (release), REVISION: 7.1, GCID: 33958178, BOARD: t186ref, ...`
/// which maps to `32.7.1`.
pub fn parse_l4t_release(content: &str) -> Option<String> {
    let re = Regex::new(r"R(\d+)\s*\(\w+\),\s*REVISION:\s*([\d.]+)").unwrap();
    let caps = re.captures(content)?;
    Some(format!("{}.{}", &caps[1], &caps[2]))
}

/// Known L4T to Jetpack mappings. Unmapped releases stay unknown.
pub fn jetpack_from_l4t(l4t: &str) -> Option<&'static str> {
    let jetpack = match l4t {
        "32.6.1" => "4.6",
        "32.7.1" => "4.6.1",
        "32.7.2" => "4.6.2",
        "32.7.3" => "4.6.3",
        "32.7.4" => "4.6.4",
        "35.1.0" => "5.0.2",
        "35.2.1" => "5.1",
        "35.3.1" => "5.1.1",
        "35.4.1" => "5.1.2",
        "35.5.0" => "5.1.3",
        "36.2.0" => "6.0 DP",
        "36.3.0" => "6.0",
        "36.4.0" => "6.1",
        "36.4.3" => "6.2",
        _ => return None,
    };
    Some(jetpack)
}

/// Parse `/proc/meminfo`. All figures stay in the kB the kernel reports.
pub fn parse_meminfo(content: &str) -> MemoryData {
    let mut fields = HashMap::new();
    for line in content.lines() {
        if let Some((key, rest)) = line.split_once(':') {
            if let Some(value) = rest.split_whitespace().next() {
                if let Ok(value) = value.parse::<u64>() {
                    fields.insert(key.trim().to_string(), value);
                }
            }
        }
    }

    let get = |key: &str| fields.get(key).copied();
    let ram_total = get("MemTotal");
    let ram_free = get("MemFree");
    let ram_used = match (ram_total, get("MemAvailable").or(ram_free)) {
        (Some(total), Some(avail)) => Some(total.saturating_sub(avail)),
        _ => None,
    };
    let swap_total = get("SwapTotal");
    let swap_used = match (swap_total, get("SwapFree")) {
        (Some(total), Some(free)) => Some(total.saturating_sub(free)),
        _ => None,
    };

    MemoryData {
        ram: RamData {
            total: ram_total,
            used: ram_used,
            free: ram_free,
        },
        swap: SwapData {
            total: swap_total,
            used: swap_used,
        },
    }
}

/// Derive the clocks state from `jetson_clocks --show` output.
///
/// The tool pins frequencies by raising MinFreq to MaxFreq, so "active" means
/// every online CPU (and the GPU, when listed) reports MinFreq == MaxFreq.
/// Returns `None` when no CPU lines are present at all.
pub fn parse_clocks_show(output: &str) -> Option<(bool, String)> {
    let cpu_re =
        Regex::new(r"^cpu\d+:\s+Online=(\d)\s+.*MinFreq=(\d+)\s+MaxFreq=(\d+)").unwrap();
    let gpu_re = Regex::new(r"^GPU\s+MinFreq=(\d+)\s+MaxFreq=(\d+)").unwrap();

    let mut seen_cpu = false;
    let mut active = true;
    for line in output.lines() {
        let line = line.trim();
        if let Some(caps) = cpu_re.captures(line) {
            seen_cpu = true;
            if &caps[1] == "1" && caps[2] != caps[3] {
                active = false;
            }
        } else if let Some(caps) = gpu_re.captures(line) {
            if caps[1] != caps[2] {
                active = false;
            }
        }
    }

    if !seen_cpu {
        return None;
    }
    let status = if active { "running" } else { "inactive" };
    Some((active, status.to_string()))
}

/// One accelerator-memory client from the nvmap debugfs table.
#[derive(Debug, Clone, PartialEq)]
pub struct NvmapClient {
    pub process: String,
    pub pid: i64,
    pub size_kb: u64,
}

/// Parse `/sys/kernel/debug/nvmap/iovmm/clients`:
/// ```text
/// CLIENT                        PROCESS      PID        SIZE
/// user                          nvargus-daemon 4312   10052K
/// total                                              10052K
/// ```
pub fn parse_nvmap_clients(content: &str) -> Vec<NvmapClient> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 4 || cols[0] == "total" {
                return None;
            }
            let pid = cols[2].parse::<i64>().ok()?;
            Some(NvmapClient {
                process: cols[1].to_string(),
                pid,
                size_kb: parse_size_kb(cols[3])?,
            })
        })
        .collect()
}

fn parse_size_kb(size: &str) -> Option<u64> {
    let size = size.trim();
    if let Some(kb) = size.strip_suffix(['K', 'k']) {
        return kb.parse().ok();
    }
    if let Some(mb) = size.strip_suffix(['M', 'm']) {
        return mb.parse::<u64>().ok().map(|v| v * 1024);
    }
    if let Some(gb) = size.strip_suffix(['G', 'g']) {
        return gb.parse::<u64>().ok().map(|v| v * 1024 * 1024);
    }
    // No suffix: assume the kernel already printed kB.
    size.parse().ok()
}

/// One row of `ps -eo pid,user,pri,stat,pcpu,rss,comm --no-headers`.
#[derive(Debug, Clone)]
pub struct PsEntry {
    pub user: String,
    pub priority: i64,
    pub state: String,
    pub cpu_percent: f64,
    pub rss_kb: u64,
    pub command: String,
}

/// Parse the `ps` table into a pid-keyed map. Malformed rows are skipped.
pub fn parse_ps_table(output: &str) -> HashMap<i64, PsEntry> {
    let mut entries = HashMap::new();
    for line in output.lines() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 7 {
            continue;
        }
        let Ok(pid) = cols[0].parse::<i64>() else {
            continue;
        };
        let entry = PsEntry {
            user: cols[1].to_string(),
            priority: cols[2].parse().unwrap_or(0),
            state: cols[3].to_string(),
            cpu_percent: cols[4].parse().unwrap_or(0.0),
            rss_kb: cols[5].parse().unwrap_or(0),
            command: cols[6..].join(" "),
        };
        entries.insert(pid, entry);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nvpmodel_query() {
        let output = "NV Fan Mode:quiet\nNV Power Mode: MODE_15W\n2\n";
        assert_eq!(
            parse_nvpmodel_query(output),
            Some(("MODE_15W".to_string(), 2))
        );
        assert_eq!(parse_nvpmodel_query("garbage\n"), None);
    }

    #[test]
    fn test_parse_nvpmodel_conf() {
        let conf = "\
# comment
< POWER_MODEL ID=0 NAME=MAXN >
CPU_ONLINE CORE_1 1

< POWER_MODEL ID=1 NAME=MODE_10W >
< POWER_MODEL ID=2 NAME=MODE_15W >
< PM_CONFIG DEFAULT=2 >
";
        let models = parse_nvpmodel_conf(conf);
        assert_eq!(
            models,
            vec![
                (0, "MAXN".to_string()),
                (1, "MODE_10W".to_string()),
                (2, "MODE_15W".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_l4t_release() {
        let content =
            "# R32 (release), REVISION: 7.1, GCID: 29818004, BOARD: t186ref, EABI: aarch64\n";
        assert_eq!(parse_l4t_release(content), Some("32.7.1".to_string()));
        assert_eq!(parse_l4t_release("not a release file"), None);
    }

    #[test]
    fn test_jetpack_lookup() {
        assert_eq!(jetpack_from_l4t("32.7.1"), Some("4.6.1"));
        assert_eq!(jetpack_from_l4t("36.3.0"), Some("6.0"));
        assert_eq!(jetpack_from_l4t("99.0.0"), None);
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:        7650368 kB
MemFree:         1234560 kB
MemAvailable:    4650368 kB
SwapTotal:       3825180 kB
SwapFree:        3825180 kB
";
        let mem = parse_meminfo(content);
        assert_eq!(mem.ram.total, Some(7650368));
        assert_eq!(mem.ram.free, Some(1234560));
        assert_eq!(mem.ram.used, Some(3000000));
        assert_eq!(mem.swap.total, Some(3825180));
        assert_eq!(mem.swap.used, Some(0));
    }

    #[test]
    fn test_parse_meminfo_missing_fields() {
        let mem = parse_meminfo("");
        assert_eq!(mem.ram.total, None);
        assert_eq!(mem.ram.used, None);
        assert_eq!(mem.swap.total, None);
    }

    #[test]
    fn test_parse_clocks_show_active() {
        let output = "\
SOC family:tegra194  Machine:Jetson Xavier NX
Online CPUs: 0-5
cpu0: Online=1 Governor=schedutil MinFreq=1907200 MaxFreq=1907200 CurrentFreq=1907200
cpu1: Online=1 Governor=schedutil MinFreq=1907200 MaxFreq=1907200 CurrentFreq=1907200
cpu2: Online=0 Governor=schedutil MinFreq=115200 MaxFreq=1907200 CurrentFreq=1907200
GPU MinFreq=1109250000 MaxFreq=1109250000 CurrentFreq=1109250000
";
        // Offline cpu2 does not count against active.
        assert_eq!(
            parse_clocks_show(output),
            Some((true, "running".to_string()))
        );
    }

    #[test]
    fn test_parse_clocks_show_inactive() {
        let output = "\
cpu0: Online=1 Governor=schedutil MinFreq=115200 MaxFreq=1907200 CurrentFreq=1190400
GPU MinFreq=114750000 MaxFreq=1109250000 CurrentFreq=114750000
";
        assert_eq!(
            parse_clocks_show(output),
            Some((false, "inactive".to_string()))
        );
        assert_eq!(parse_clocks_show("no cpu lines here"), None);
    }

    #[test]
    fn test_parse_nvmap_clients() {
        let content = "\
CLIENT                        PROCESS      PID        SIZE
user                          nvargus-daemon 4312   10052K
user                          gst-launch-1.0 5120      36M
total                                              46916K
";
        let clients = parse_nvmap_clients(content);
        assert_eq!(
            clients,
            vec![
                NvmapClient {
                    process: "nvargus-daemon".to_string(),
                    pid: 4312,
                    size_kb: 10052,
                },
                NvmapClient {
                    process: "gst-launch-1.0".to_string(),
                    pid: 5120,
                    size_kb: 36 * 1024,
                },
            ]
        );
    }

    #[test]
    fn test_parse_ps_table() {
        let output = "\
 4312 root      19 Ssl  1.5 42816 nvargus-daemon
 5120 jetson    19 Rl  25.0 183120 gst-launch-1.0
bogus line
";
        let table = parse_ps_table(output);
        assert_eq!(table.len(), 2);
        let entry = &table[&5120];
        assert_eq!(entry.user, "jetson");
        assert_eq!(entry.priority, 19);
        assert_eq!(entry.state, "Rl");
        assert_eq!(entry.cpu_percent, 25.0);
        assert_eq!(entry.rss_kb, 183120);
        assert_eq!(entry.command, "gst-launch-1.0");
    }
}
