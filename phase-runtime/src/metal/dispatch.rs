//! Buffer allocation, dispatch, and readback helpers.

use std::ffi::c_void;
use std::ptr::NonNull;

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_metal::{
    MTLBuffer, MTLComputeCommandEncoder, MTLComputePipelineState, MTLDevice, MTLResourceOptions,
    MTLSize,
};

use crate::error::BackendError;
use crate::metal::pso_cache::THREADS_PER_TG;

/// Allocate a `StorageModeShared` buffer of `size` bytes.
///
/// Metal rejects zero-length buffers, so at least one word is allocated.
pub fn alloc_buffer(
    device: &ProtocolObject<dyn MTLDevice>,
    size: usize,
) -> Result<Retained<ProtocolObject<dyn MTLBuffer>>, BackendError> {
    let bytes = size.max(4);
    device
        .newBufferWithLength_options(bytes, MTLResourceOptions::StorageModeShared)
        .ok_or(BackendError::Allocation { bytes })
}

/// Allocate a `StorageModeShared` buffer initialized with `data`.
pub fn alloc_buffer_with_data<T: Copy>(
    device: &ProtocolObject<dyn MTLDevice>,
    data: &[T],
) -> Result<Retained<ProtocolObject<dyn MTLBuffer>>, BackendError> {
    if data.is_empty() {
        return alloc_buffer(device, 0);
    }
    let bytes = std::mem::size_of_val(data);
    let ptr = NonNull::new(data.as_ptr() as *mut c_void).ok_or(BackendError::Allocation { bytes })?;
    // SAFETY: `ptr` points at `bytes` readable bytes for the duration of the call.
    unsafe {
        device.newBufferWithBytes_length_options(ptr, bytes, MTLResourceOptions::StorageModeShared)
    }
    .ok_or(BackendError::Allocation { bytes })
}

/// Read back `count` values of T from a shared buffer.
///
/// # Safety
/// The buffer must hold at least `count * size_of::<T>()` bytes of valid T,
/// and no GPU work writing it may be in flight.
pub unsafe fn read_buffer_slice<T: Copy>(
    buffer: &ProtocolObject<dyn MTLBuffer>,
    count: usize,
) -> Vec<T> {
    let ptr = buffer.contents().as_ptr() as *const T;
    std::slice::from_raw_parts(ptr, count).to_vec()
}

/// Encode one 1D pass: bind `buffers` at indices 0.., `params` right after
/// them, and dispatch exactly `total_threads` threads.
pub fn dispatch_pass<P: Copy>(
    encoder: &ProtocolObject<dyn MTLComputeCommandEncoder>,
    pipeline: &ProtocolObject<dyn MTLComputePipelineState>,
    buffers: &[&ProtocolObject<dyn MTLBuffer>],
    params: &P,
    total_threads: usize,
) {
    encoder.setComputePipelineState(pipeline);

    // SAFETY: buffers and params outlive the encoder's use of them; setBytes
    // copies the params into the command stream.
    unsafe {
        for (index, buffer) in buffers.iter().enumerate() {
            encoder.setBuffer_offset_atIndex(Some(*buffer), 0, index);
        }
        encoder.setBytes_length_atIndex(
            NonNull::from(params).cast(),
            std::mem::size_of::<P>(),
            buffers.len(),
        );
    }

    let threads_per_tg = pipeline.maxTotalThreadsPerThreadgroup().min(THREADS_PER_TG);
    let grid_size = MTLSize {
        width: total_threads,
        height: 1,
        depth: 1,
    };
    let tg_size = MTLSize {
        width: threads_per_tg,
        height: 1,
        depth: 1,
    };

    encoder.dispatchThreads_threadsPerThreadgroup(grid_size, tg_size);
}
