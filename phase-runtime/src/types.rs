//! Shared types matching Metal shader structs.
//!
//! All param structs are #[repr(C)] and 16 bytes so they can be passed with
//! `setBytes` and read as `constant` structs in `shaders/passes.metal`.

/// Element type every pass kernel operates on.
pub type Key = i32;

/// Parameters for the `scan_combine` kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanParams {
    pub element_count: u32,
    pub chunk_size: u32,
    pub _pad: [u32; 2],
}

/// Parameters for the `bitonic_step` kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitonicParams {
    pub element_count: u32,
    pub stage: u32,
    pub step: u32,
    pub _pad: u32,
}

/// Parameters for the `merge_runs` kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeParams {
    pub element_count: u32,
    pub run_length: u32,
    pub pair_count: u32,
    pub _pad: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_of<T, F>(base: &T, field: &F) -> usize {
        field as *const F as usize - base as *const T as usize
    }

    #[test]
    fn test_key_is_four_bytes() {
        assert_eq!(std::mem::size_of::<Key>(), 4);
    }

    #[test]
    fn test_scan_params_layout() {
        assert_eq!(
            std::mem::size_of::<ScanParams>(),
            16,
            "ScanParams must be 16 bytes"
        );
        assert_eq!(std::mem::align_of::<ScanParams>(), 4);

        let p = ScanParams {
            element_count: 0,
            chunk_size: 0,
            _pad: [0; 2],
        };
        assert_eq!(offset_of(&p, &p.element_count), 0);
        assert_eq!(offset_of(&p, &p.chunk_size), 4);
    }

    #[test]
    fn test_bitonic_params_layout() {
        assert_eq!(
            std::mem::size_of::<BitonicParams>(),
            16,
            "BitonicParams must be 16 bytes"
        );

        let p = BitonicParams {
            element_count: 0,
            stage: 0,
            step: 0,
            _pad: 0,
        };
        assert_eq!(offset_of(&p, &p.element_count), 0);
        assert_eq!(offset_of(&p, &p.stage), 4);
        assert_eq!(offset_of(&p, &p.step), 8);
    }

    #[test]
    fn test_merge_params_layout() {
        assert_eq!(
            std::mem::size_of::<MergeParams>(),
            16,
            "MergeParams must be 16 bytes"
        );

        let p = MergeParams {
            element_count: 0,
            run_length: 0,
            pair_count: 0,
            _pad: 0,
        };
        assert_eq!(offset_of(&p, &p.run_length), 4);
        assert_eq!(offset_of(&p, &p.pair_count), 8);
    }
}
