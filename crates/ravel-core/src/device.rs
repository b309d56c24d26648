use crate::Ordering;

/// Execution backend a tensor's buffer lives on. Only the CPU backend
/// exists today; the seam is here so an accelerator backend can be added
/// without touching the shape/stride algebra.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    #[default]
    Cpu,
}

impl Device {
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }
}

/// Construction-time configuration, threaded explicitly through every
/// tensor factory instead of living in process-wide state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TensorOptions {
    pub ordering: Ordering,
    pub device: Device,
}

impl TensorOptions {
    pub fn row_major() -> Self {
        Self {
            ordering: Ordering::RowMajor,
            device: Device::Cpu,
        }
    }

    pub fn column_major() -> Self {
        Self {
            ordering: Ordering::ColumnMajor,
            device: Device::Cpu,
        }
    }

    pub fn with_ordering(ordering: Ordering) -> Self {
        Self {
            ordering,
            device: Device::Cpu,
        }
    }
}
