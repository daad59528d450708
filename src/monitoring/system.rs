//! System Probe Module
//!
//! Point-in-time process memory, CPU and uptime readings via `sysinfo`,
//! with process CPU time from `getrusage` on unix.

use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;
use sysinfo::{Pid, System};
use tracing::debug;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Memory readings in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MemoryUsage {
    /// Resident set size of this process
    pub resident: u64,
    /// Virtual memory reserved by this process
    pub virtual_size: u64,
    /// Memory in use across the host
    pub system_used: u64,
    /// Total host memory
    pub system_total: u64,
}

impl MemoryUsage {
    /// Same readings rounded to whole megabytes.
    pub fn in_mb(&self) -> MemoryUsage {
        let mb = |bytes: u64| (bytes + BYTES_PER_MB / 2) / BYTES_PER_MB;
        MemoryUsage {
            resident: mb(self.resident),
            virtual_size: mb(self.virtual_size),
            system_used: mb(self.system_used),
            system_total: mb(self.system_total),
        }
    }
}

/// CPU readings for this process and the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CpuUsage {
    /// CPU time spent in user mode since process start, in microseconds
    pub user_micros: u64,
    /// CPU time spent in kernel mode since process start, in microseconds
    pub system_micros: u64,
    /// Process load in percent since the previous reading
    pub process_percent: f32,
    /// Host load in percent since the previous reading
    pub system_percent: f32,
}

// == CPU Time ==
/// User and system CPU time consumed by this process, in microseconds.
#[cfg(unix)]
pub fn process_cpu_time() -> (u64, u64) {
    use nix::sys::resource::{getrusage, UsageWho};
    use nix::sys::time::{TimeVal, TimeValLike};

    let micros = |tv: TimeVal| u64::try_from(tv.num_microseconds()).unwrap_or(0);
    match getrusage(UsageWho::RUSAGE_SELF) {
        Ok(usage) => (micros(usage.user_time()), micros(usage.system_time())),
        Err(e) => {
            debug!(error = %e, "getrusage failed");
            (0, 0)
        }
    }
}

/// User and system CPU time consumed by this process, in microseconds.
#[cfg(not(unix))]
pub fn process_cpu_time() -> (u64, u64) {
    (0, 0)
}

/// Health snapshot returned by the system report.
#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    /// Memory readings in megabytes
    pub memory_mb: MemoryUsage,
    pub cpu: CpuUsage,
    pub uptime_secs: u64,
    pub version: String,
    pub platform: String,
    pub arch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
}

// == System Probe ==
/// Keeps one `System` across readings so CPU percentages are deltas.
pub struct SystemProbe {
    system: Mutex<System>,
    pid: Option<Pid>,
    started: Instant,
}

impl SystemProbe {
    // == Constructor ==
    /// Creates a probe for the current process.
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            pid: sysinfo::get_current_pid().ok(),
            started: Instant::now(),
        }
    }

    // == Readings ==
    /// Process and host memory, in bytes.
    pub fn memory_usage(&self) -> MemoryUsage {
        let mut sys = self.system.lock();
        sys.refresh_memory();

        let (resident, virtual_size) = self
            .pid
            .and_then(|pid| {
                sys.refresh_process(pid);
                sys.process(pid)
                    .map(|process| (process.memory(), process.virtual_memory()))
            })
            .unwrap_or((0, 0));

        MemoryUsage {
            resident,
            virtual_size,
            system_used: sys.used_memory(),
            system_total: sys.total_memory(),
        }
    }

    /// Memory in MB, CPU time and load, uptime and platform identifiers.
    pub fn health(&self) -> SystemHealth {
        let memory = self.memory_usage();
        let (user_micros, system_micros) = process_cpu_time();

        let mut sys = self.system.lock();
        sys.refresh_cpu();
        let system_percent = sys.global_cpu_info().cpu_usage();

        let (process_percent, run_time) = self
            .pid
            .and_then(|pid| sys.process(pid))
            .map(|process| (process.cpu_usage(), process.run_time()))
            .unwrap_or((0.0, 0));

        // Fall back to probe age when the process table is unavailable
        let uptime_secs = if run_time > 0 {
            run_time
        } else {
            self.started.elapsed().as_secs()
        };

        SystemHealth {
            memory_mb: memory.in_mb(),
            cpu: CpuUsage {
                user_micros,
                system_micros,
                process_percent,
                system_percent,
            },
            uptime_secs,
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            os_version: System::long_os_version(),
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_mb_rounds() {
        let usage = MemoryUsage {
            resident: 3 * BYTES_PER_MB / 2,
            virtual_size: BYTES_PER_MB - 1,
            system_used: 0,
            system_total: 10 * BYTES_PER_MB,
        };

        let mb = usage.in_mb();
        assert_eq!(mb.resident, 2);
        assert_eq!(mb.virtual_size, 1);
        assert_eq!(mb.system_used, 0);
        assert_eq!(mb.system_total, 10);
    }

    #[test]
    fn test_health_reports_platform() {
        let probe = SystemProbe::new();
        let health = probe.health();

        assert_eq!(health.platform, std::env::consts::OS);
        assert_eq!(health.arch, std::env::consts::ARCH);
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_memory_usage_reads_host_memory() {
        let probe = SystemProbe::new();
        let usage = probe.memory_usage();
        assert!(usage.system_total >= usage.system_used);
    }

    #[cfg(unix)]
    #[test]
    fn test_cpu_time_grows_with_work() {
        let (user_before, system_before) = process_cpu_time();

        let mut acc = 0u64;
        for i in 0..20_000_000u64 {
            acc = std::hint::black_box(acc.wrapping_mul(31).wrapping_add(i));
        }
        std::hint::black_box(acc);

        let (user_after, system_after) = process_cpu_time();
        assert!(user_after >= user_before);
        assert!(system_after >= system_before);
        assert!(user_after + system_after > 0);
    }

    #[test]
    fn test_health_reports_cpu_time() {
        let health = SystemProbe::new().health();
        let json = serde_json::to_value(&health).unwrap();

        assert!(json["cpu"]["user_micros"].is_u64());
        assert!(json["cpu"]["system_micros"].is_u64());
    }
}
