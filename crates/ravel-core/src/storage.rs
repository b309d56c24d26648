use std::sync::Arc;

use parking_lot::RwLock;

use crate::{Device, TensorDType};

/// Managed CPU buffer.
///
/// `Clone` shares the allocation; that is how views alias their source,
/// and
/// the buffer lives as long as the longest-lived referencing view.
/// Concurrent mutation of overlapping views is the caller's problem,
/// the lock only serializes individual element accesses.
#[derive(Debug, Clone)]
pub struct CpuBuffer<T> {
    data: Arc<RwLock<Vec<T>>>,
}

impl<T: TensorDType> CpuBuffer<T> {
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub fn filled(len: usize, value: T) -> Self {
        Self::from_vec(vec![value; len])
    }

    pub fn zeros(len: usize) -> Self {
        Self::filled(len, T::zero())
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read(&self, offset: usize) -> T {
        self.data.read()[offset]
    }

    pub fn write(&self, offset: usize, value: T) {
        self.data.write()[offset] = value;
    }

    /// Raw buffer contents, in storage order.
    pub fn to_vec(&self) -> Vec<T> {
        self.data.read().clone()
    }

    pub fn deep_clone(&self) -> Self {
        Self::from_vec(self.to_vec())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

#[derive(Debug, Clone)]
pub enum Storage<T> {
    Cpu(CpuBuffer<T>),
}

impl<T: TensorDType> Storage<T> {
    pub fn from_vec(data: Vec<T>, device: &Device) -> Self {
        match device {
            Device::Cpu => Storage::Cpu(CpuBuffer::from_vec(data)),
        }
    }

    pub fn filled(len: usize, value: T, device: &Device) -> Self {
        match device {
            Device::Cpu => Storage::Cpu(CpuBuffer::filled(len, value)),
        }
    }

    pub fn zeros(len: usize, device: &Device) -> Self {
        Self::filled(len, T::zero(), device)
    }

    pub fn device(&self) -> Device {
        match self {
            Storage::Cpu(_) => Device::Cpu,
        }
    }

    pub fn cpu(&self) -> &CpuBuffer<T> {
        match self {
            Storage::Cpu(c) => c,
        }
    }

    pub fn len(&self) -> usize {
        self.cpu().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read(&self, offset: usize) -> T {
        self.cpu().read(offset)
    }

    pub fn write(&self, offset: usize, value: T) {
        self.cpu().write(offset, value)
    }

    pub fn deep_clone(&self) -> Self {
        match self {
            Storage::Cpu(c) => Storage::Cpu(c.deep_clone()),
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Storage::Cpu(a), Storage::Cpu(b)) => a.ptr_eq(b),
        }
    }
}
