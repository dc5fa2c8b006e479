//! # In-place Permutation
//!
//! Reorders a slice by following the cycles of a permutation, swapping each
//! element straight into its destination. No auxiliary buffer is allocated.

/// Moves the element at position `i` of `data` to position `perm[i]`.
///
/// `perm` maps old position to new position and must be a permutation of
/// `0..data.len()`. It is consumed: on return it holds the identity.
///
/// Runs in a single pass with at most `data.len() - 1` swaps.
///
/// # Example
///
/// ```rust
/// use tessera_core::memory::apply_permutation;
///
/// let mut data = ['a', 'b', 'c'];
/// let mut perm = [2, 0, 1];
/// apply_permutation(&mut data, &mut perm);
/// assert_eq!(data, ['b', 'c', 'a']);
/// assert_eq!(perm, [0, 1, 2]);
/// ```
pub fn apply_permutation<T>(data: &mut [T], perm: &mut [usize]) {
    debug_assert_eq!(data.len(), perm.len(), "permutation length mismatch");

    for i in 0..perm.len() {
        // Rotate the cycle through `i` until `i` holds its final element
        while perm[i] != i {
            let target = perm[i];
            data.swap(i, target);
            perm.swap(i, target);
        }
    }
}
