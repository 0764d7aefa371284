// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// `auto` uses the wgpu backend on its default device; burn picks
// a discrete GPU first, then integrated, virtual and finally a
// CPU adapter. `cpu` uses the pure-Rust ndarray backend.
// Either way the model and the maths are identical.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type GpuBackend = burn::backend::Wgpu;
pub type CpuBackend = burn::backend::NdArray;

pub type GpuTrainBackend = burn::backend::Autodiff<GpuBackend>;
pub type CpuTrainBackend = burn::backend::Autodiff<CpuBackend>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceChoice {
    #[default]
    Auto,
    Cpu,
}

impl fmt::Display for DeviceChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceChoice::Auto => f.write_str("auto"),
            DeviceChoice::Cpu  => f.write_str("cpu"),
        }
    }
}

impl FromStr for DeviceChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" | "gpu" => Ok(DeviceChoice::Auto),
            "cpu"          => Ok(DeviceChoice::Cpu),
            other          => Err(format!("unknown device '{other}' (expected auto or cpu)")),
        }
    }
}

pub fn gpu_device() -> burn::backend::wgpu::WgpuDevice {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    device
}

pub fn cpu_device() -> burn::backend::ndarray::NdArrayDevice {
    tracing::info!("Using ndarray CPU backend");
    burn::backend::ndarray::NdArrayDevice::Cpu
}
