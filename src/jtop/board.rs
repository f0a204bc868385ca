//! `Monitor` implementation that reads a Jetson board through sysfs, procfs
//! and the stock L4T management tools (`nvpmodel`, `jetson_clocks`).

use super::parse;
use super::{
    BoardData, ClocksState, CpuCore, CpuData, CpuTotal, DiskData, EngineData, EngineMap, FanData,
    FanSpeed, GpuData, JtopError, MemoryData, Monitor, PowerModelState, PowerModelTarget,
    ProcessRow, Result, SensorData,
};
use crate::config::MonitorConfig;
use crate::utils::sysfs;
use async_trait::async_trait;
use indexmap::IndexMap;
use log::{debug, error};
use regex::Regex;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use sysinfo::Disks;
use systemstat::{Platform, System as SystemStat};
use tokio::process::Command;

const DEVICETREE_MODEL: &str = "sys/firmware/devicetree/base/model";
const DEVICETREE_SERIAL: &str = "sys/firmware/devicetree/base/serial-number";
const DEVICETREE_COMPATIBLE: &str = "sys/firmware/devicetree/base/compatible";
const L4T_RELEASE: &str = "etc/nv_tegra_release";
const NVPMODEL_CONF: &str = "etc/nvpmodel.conf";
const NVFANCONTROL_CONF: &str = "etc/nvfancontrol.conf";
const DEVFREQ_DIR: &str = "sys/class/devfreq";
const THERMAL_DIR: &str = "sys/class/thermal";
const HWMON_DIR: &str = "sys/class/hwmon";
const CPU_DIR: &str = "sys/devices/system/cpu";
const MEMINFO: &str = "proc/meminfo";
const NVMAP_CLIENTS: &str = "sys/kernel/debug/nvmap/iovmm/clients";

const KNOWN_GPU_NAMES: &[&str] = &["gv11b", "gp10b", "ga10b", "gb10b", "gpu"];

/// Engine families surfaced per group, longest names first so `NVDEC` is not
/// claimed by `SE`.
const ENGINE_FAMILIES: &[&str] = &[
    "NVDEC", "NVENC", "NVJPG", "APE", "DLA", "PVA", "VIC", "SE",
];

/// Live handle to the local board. Holds no OS resources beyond the path
/// root, so dropping it on any exit path releases everything.
pub struct BoardMonitor {
    root: PathBuf,
}

impl BoardMonitor {
    /// Acquire a handle for one snapshot. Fails when the configured
    /// filesystem root is not accessible at all.
    pub async fn acquire(config: &MonitorConfig) -> Result<Self> {
        fs::metadata(&config.root)?;
        debug!("Acquired board monitor at root {}", config.root.display());
        Ok(Self {
            root: config.root.clone(),
        })
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn read_line(&self, relative: &str) -> Option<String> {
        sysfs::read_line(&self.path(relative), 64)
    }

    /// Devfreq entries as (of_node name, devfreq path) pairs.
    fn devfreq_devices(&self) -> Vec<(String, PathBuf)> {
        let mut devices = Vec::new();
        let Ok(entries) = fs::read_dir(self.path(DEVFREQ_DIR)) else {
            return devices;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let name_path = path.join("device/of_node/name");
            if let Some(name) = sysfs::read_line(&name_path, 32) {
                devices.push((name, path));
            }
        }
        devices.sort_by(|a, b| a.0.cmp(&b.0));
        devices
    }

    async fn cuda_version(&self) -> Option<String> {
        let output = run_checked("nvcc", &["--version"]).await.ok()?;
        let re = Regex::new(r"V(\d+\.\d+\.\d+)").unwrap();
        re.captures(&output).map(|caps| caps[1].to_string())
    }

    async fn library_versions(&self) -> IndexMap<String, String> {
        let mut libraries = IndexMap::new();
        if let Some(cuda) = self.cuda_version().await {
            libraries.insert("CUDA".to_string(), cuda);
        }
        for (label, package) in [
            ("cuDNN", "libcudnn8"),
            ("TensorRT", "tensorrt"),
            ("VPI", "vpi2"),
            ("OpenCV", "libopencv"),
        ] {
            if let Some(version) = dpkg_version(package).await {
                libraries.insert(label.to_string(), version);
            }
        }
        libraries
    }
}

async fn run_command(program: &str, args: &[&str]) -> Result<std::process::Output> {
    let output = Command::new(program).args(args).output().await?;
    Ok(output)
}

/// Run a management tool and return stdout, turning a non-zero exit into a
/// `CommandFailed` carrying the tool's stderr.
async fn run_checked(program: &str, args: &[&str]) -> Result<String> {
    let output = run_command(program, args).await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            format!("{} exited with {}", program, output.status)
        } else {
            format!("{}: {}", program, stderr)
        };
        return Err(JtopError::CommandFailed(detail));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

async fn dpkg_version(package: &str) -> Option<String> {
    let output = run_checked("dpkg-query", &["-W", "-f=${Version}", package])
        .await
        .ok()?;
    let version = output.trim().to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

#[async_trait]
impl Monitor for BoardMonitor {
    async fn ok(&self) -> bool {
        self.path(DEVICETREE_MODEL).is_file()
    }

    async fn board(&self) -> Result<BoardData> {
        let mut hardware = IndexMap::new();
        if let Some(model) = self.read_line(DEVICETREE_MODEL) {
            hardware.insert("Model".to_string(), model);
        }
        if let Some(serial) = self.read_line(DEVICETREE_SERIAL) {
            hardware.insert("Serial Number".to_string(), serial);
        }
        // The compatible string is a NUL-separated list; its head names the
        // carrier module.
        if let Some(compatible) = self.read_line(DEVICETREE_COMPATIBLE) {
            if let Some(module) = compatible.split('\0').next().filter(|s| !s.is_empty()) {
                hardware.insert("Module".to_string(), module.to_string());
            }
        }
        if let Ok(release) = fs::read_to_string(self.path(L4T_RELEASE)) {
            if let Some(l4t) = parse::parse_l4t_release(&release) {
                if let Some(jetpack) = parse::jetpack_from_l4t(&l4t) {
                    hardware.insert("Jetpack".to_string(), jetpack.to_string());
                }
                hardware.insert("L4T".to_string(), l4t);
            }
        }

        Ok(BoardData {
            hardware,
            libraries: self.library_versions().await,
        })
    }

    async fn nvpmodel(&self) -> Result<Option<PowerModelState>> {
        let output = match run_checked("nvpmodel", &["-q"]).await {
            Ok(output) => output,
            Err(e) => {
                debug!("nvpmodel query unavailable: {}", e);
                return Ok(None);
            }
        };
        let Some((name, id)) = parse::parse_nvpmodel_query(&output) else {
            return Ok(None);
        };

        let models = fs::read_to_string(self.path(NVPMODEL_CONF))
            .map(|conf| {
                parse::parse_nvpmodel_conf(&conf)
                    .into_iter()
                    .map(|(_, name)| name)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Some(PowerModelState { name, id, models }))
    }

    async fn jetson_clocks(&self) -> Result<Option<ClocksState>> {
        let output = match run_checked("jetson_clocks", &["--show"]).await {
            Ok(output) => output,
            Err(e) => {
                debug!("jetson_clocks unavailable: {}", e);
                return Ok(None);
            }
        };
        let Some((active, status)) = parse::parse_clocks_show(&output) else {
            return Ok(None);
        };

        let boot = match run_command("systemctl", &["is-enabled", "jetson_clocks.service"]).await {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "enabled",
            Err(_) => false,
        };

        Ok(Some(ClocksState {
            active,
            status,
            boot,
        }))
    }

    async fn cpu(&self) -> Result<CpuData> {
        let start = Instant::now();
        let stat = SystemStat::new();
        let total = match stat.cpu_load_aggregate() {
            Ok(measurement) => {
                tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
                match measurement.done() {
                    Ok(load) => Some(CpuTotal {
                        user: f64::from(load.user) * 100.0,
                        system: f64::from(load.system) * 100.0,
                        idle: f64::from(load.idle) * 100.0,
                    }),
                    Err(e) => {
                        error!("CPU load measurement error: {}", e);
                        None
                    }
                }
            }
            Err(e) => {
                error!("CPU load: error: {}", e);
                None
            }
        };

        let mut indexed = Vec::new();
        if let Ok(entries) = fs::read_dir(self.path(CPU_DIR)) {
            for entry in entries.flatten() {
                let file_name = entry.file_name();
                let name = file_name.to_string_lossy();
                let Some(index) = name
                    .strip_prefix("cpu")
                    .and_then(|n| n.parse::<u32>().ok())
                else {
                    continue;
                };
                // cpu0 usually has no online knob; a core without one cannot
                // be offlined and counts as online.
                let online = match sysfs::read_number::<u32>(&entry.path().join("online")) {
                    Some(value) => value == 1,
                    None => true,
                };
                indexed.push((index, CpuCore { online }));
            }
        }
        indexed.sort_by_key(|(index, _)| *index);
        let cores = indexed.into_iter().map(|(_, core)| core).collect();

        debug!("cpu read took: {} ms", start.elapsed().as_millis());
        Ok(CpuData { total, cores })
    }

    async fn gpu(&self) -> Result<GpuData> {
        for (name, path) in self.devfreq_devices() {
            let normalized = name.to_lowercase();
            if !KNOWN_GPU_NAMES.contains(&normalized.as_str()) && !normalized.contains("gpu") {
                continue;
            }
            // The tegra governor exports load in milli-percent.
            let load = sysfs::read_number::<u64>(&path.join("device/load"))
                .map(|milli| milli as f64 / 10.0);
            return Ok(GpuData {
                load,
                cur_freq: sysfs::read_number(&path.join("cur_freq")),
                max_freq: sysfs::read_number(&path.join("max_freq")),
            });
        }
        Ok(GpuData::default())
    }

    async fn engines(&self) -> Result<EngineMap> {
        let mut engines: EngineMap = IndexMap::new();
        for (name, path) in self.devfreq_devices() {
            let upper: String = name
                .to_uppercase()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();
            let Some(family) = ENGINE_FAMILIES.iter().find(|f| upper.contains(*f)) else {
                continue;
            };
            let cur = sysfs::read_number::<u64>(&path.join("cur_freq"));
            let entry = EngineData {
                online: cur.map(|freq| freq > 0),
                cur,
            };
            engines
                .entry(family.to_string())
                .or_default()
                .insert(upper, entry);
        }
        Ok(engines)
    }

    async fn memory(&self) -> Result<MemoryData> {
        match fs::read_to_string(self.path(MEMINFO)) {
            Ok(content) => Ok(parse::parse_meminfo(&content)),
            Err(e) => {
                error!("Memory statistics error getting stats: {}", e);
                Ok(MemoryData::default())
            }
        }
    }

    async fn temperature(&self) -> Result<IndexMap<String, SensorData>> {
        let mut zones = Vec::new();
        if let Ok(entries) = fs::read_dir(self.path(THERMAL_DIR)) {
            for entry in entries.flatten() {
                let file_name = entry.file_name();
                let dir_name = file_name.to_string_lossy();
                let Some(index) = dir_name
                    .strip_prefix("thermal_zone")
                    .and_then(|n| n.parse::<u32>().ok())
                else {
                    continue;
                };
                let path = entry.path();
                let Some(zone_type) = sysfs::read_line(&path.join("type"), 32) else {
                    continue;
                };
                let name = zone_type
                    .trim_end_matches("-thermal")
                    .trim_end_matches("_thermal")
                    .to_string();
                let raw = sysfs::read_number::<i64>(&path.join("temp"));
                let temp = raw.map(|milli| milli as f64 / 1000.0).unwrap_or(0.0);
                // Disconnected tegra sensors report -256 degrees.
                let online = raw.is_some() && temp > -256.0;
                zones.push((index, name, SensorData { temp, online }));
            }
        }
        zones.sort_by_key(|(index, _, _)| *index);

        let mut sensors = IndexMap::new();
        for (_, name, data) in zones {
            sensors.insert(name, data);
        }
        Ok(sensors)
    }

    async fn fan(&self) -> Result<FanData> {
        let Some(hwmon) = find_fan_hwmon(&self.path(HWMON_DIR)) else {
            return Ok(FanData::default());
        };

        let mut speeds = Vec::new();
        for channel in 1..=8 {
            let Some(pwm) = sysfs::read_number::<u64>(&hwmon.join(format!("pwm{}", channel)))
            else {
                break;
            };
            speeds.push(pwm as f64 * 100.0 / 255.0);
        }
        let speed = match speeds.len() {
            0 => None,
            1 => Some(FanSpeed::Scalar(speeds[0])),
            _ => Some(FanSpeed::PerFan(speeds)),
        };

        let profile = fs::read_to_string(self.path(NVFANCONTROL_CONF))
            .ok()
            .and_then(|conf| {
                let re = Regex::new(r"FAN_DEFAULT_PROFILE\s+(\S+)").unwrap();
                re.captures(&conf).map(|caps| caps[1].to_string())
            });

        let governor =
            sysfs::read_number::<u32>(&hwmon.join("pwm1_enable")).map(|mode| match mode {
                0 => "off".to_string(),
                1 => "manual".to_string(),
                2 => "auto".to_string(),
                _ => "unknown".to_string(),
            });

        let control =
            sysfs::read_number::<u32>(&hwmon.join("device/temp_control")).map(|value| {
                if value == 1 {
                    "temp_control".to_string()
                } else {
                    "open_loop".to_string()
                }
            });

        Ok(FanData {
            speed,
            profile,
            governor,
            control,
        })
    }

    async fn processes(&self) -> Result<Vec<ProcessRow>> {
        let start = Instant::now();
        let clients = match fs::read_to_string(self.path(NVMAP_CLIENTS)) {
            Ok(content) => parse::parse_nvmap_clients(&content),
            // debugfs is root-only and absent on some kernels.
            Err(_) => return Ok(Vec::new()),
        };
        if clients.is_empty() {
            return Ok(Vec::new());
        }

        let ps_table = match run_checked(
            "ps",
            &["-eo", "pid,user,pri,stat,pcpu,rss,comm", "--no-headers"],
        )
        .await
        {
            Ok(output) => parse::parse_ps_table(&output),
            Err(e) => {
                error!("Error getting process table: {}", e);
                Default::default()
            }
        };

        let rows = clients
            .into_iter()
            .map(|client| {
                let ps = ps_table.get(&client.pid);
                vec![
                    json!(client.pid),
                    json!(ps.map(|p| p.user.clone()).unwrap_or_else(|| "Unknown".to_string())),
                    json!("GPU"),
                    json!("Graphic"),
                    json!(ps.map(|p| p.priority).unwrap_or(0)),
                    json!(ps.map(|p| p.state.clone()).unwrap_or_else(|| "?".to_string())),
                    json!(ps.map(|p| p.cpu_percent).unwrap_or(0.0)),
                    json!(ps.map(|p| p.rss_kb).unwrap_or(0)),
                    json!(client.size_kb),
                    json!(ps.map(|p| p.command.clone()).unwrap_or(client.process)),
                ]
            })
            .collect();
        debug!("processes read took: {} ms", start.elapsed().as_millis());
        Ok(rows)
    }

    async fn disk(&self) -> Result<DiskData> {
        const GB: f64 = (1024u64 * 1024 * 1024) as f64;
        let disks = Disks::new_with_refreshed_list();
        for disk in disks.list() {
            if disk.mount_point() != Path::new("/") || disk.is_removable() {
                continue;
            }
            let total = disk.total_space() as f64 / GB;
            let available = disk.available_space() as f64 / GB;
            return Ok(DiskData {
                total: Some(total),
                used: Some(total - available),
                available: Some(available),
            });
        }
        Ok(DiskData::default())
    }

    async fn set_nvpmodel(&mut self, target: &PowerModelTarget) -> Result<()> {
        let id = match target {
            PowerModelTarget::Id(id) => *id,
            PowerModelTarget::Name(name) => {
                let conf = fs::read_to_string(self.path(NVPMODEL_CONF))
                    .map_err(|_| JtopError::UnknownPowerModel(name.clone()))?;
                parse::parse_nvpmodel_conf(&conf)
                    .into_iter()
                    .find(|(_, model)| model == name)
                    .map(|(id, _)| id)
                    .ok_or_else(|| JtopError::UnknownPowerModel(name.clone()))?
            }
        };
        run_checked("nvpmodel", &["-m", &id.to_string()]).await?;
        Ok(())
    }

    async fn set_jetson_clocks(&mut self, enabled: bool) -> Result<()> {
        if enabled {
            run_checked("jetson_clocks", &[]).await?;
        } else {
            run_checked("jetson_clocks", &["--restore"]).await?;
        }
        Ok(())
    }

    async fn set_jetson_clocks_boot(&mut self, persist: bool) -> Result<()> {
        let action = if persist { "enable" } else { "disable" };
        run_checked("systemctl", &[action, "jetson_clocks.service"]).await?;
        Ok(())
    }
}

fn find_fan_hwmon(hwmon_dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(hwmon_dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if let Some(name) = sysfs::read_line(&path.join("name"), 16) {
            if name == "pwm-fan" || name.contains("fan") {
                return Some(path);
            }
        }
    }
    None
}
