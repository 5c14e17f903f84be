//! Stride-based byte engine backing every varray.
//!
//! [`RawVarray`] manages a single contiguous allocation holding `capacity`
//! slots of `stride` bytes each, of which the first `len` are live. The C
//! ancestor of this design recovered its `(count, capacity, stride)` header
//! through pointer arithmetic behind the data pointer; here the metadata
//! lives in ordinary struct fields and the element storage is an aligned
//! region inside a plain `Vec<u8>`, so every capacity change still moves
//! metadata and data as one unit without any unsafe reconstruction.

use crate::error::{Result, VarrayError};
use crate::policy::GrowthPolicy;

/// A growable buffer of uniformly sized, untyped elements.
///
/// The element size (*stride*) and the [`GrowthPolicy`] are fixed at
/// construction. Storage starts unallocated; the first mutating operation
/// allocates `policy.initial_capacity` slots. Growth on push/insert
/// multiplies capacity by the growth factor, explicit [`reserve`] sizes the
/// allocation exactly, and removals shrink capacity once occupancy falls
/// below the shrink threshold.
///
/// Element storage is aligned to [`RawVarray::ALIGNMENT`] bytes so that the
/// typed façade can reinterpret it as a slice of any plain-old-data type.
///
/// Any operation that changes capacity replaces the backing allocation;
/// byte slices obtained earlier are invalidated, which the borrow checker
/// enforces.
///
/// [`reserve`]: RawVarray::reserve
pub struct RawVarray {
    /// Backing storage; element data starts at `start` and spans exactly
    /// `capacity * stride` bytes, zero-filled beyond the live region.
    inner: Vec<u8>,
    /// Offset of the aligned element region within `inner`.
    start: usize,
    /// Number of live elements.
    len: usize,
    /// Number of element slots in the current allocation.
    capacity: usize,
    /// Bytes per element.
    stride: usize,
    /// Capacity management policy.
    policy: GrowthPolicy,
}

impl RawVarray {
    /// Alignment of the element region, in bytes. Large enough for every
    /// primitive plain-old-data type, including 16-byte SIMD and `u128`.
    pub const ALIGNMENT: usize = 64;

    /// Creates an unallocated varray for elements of `stride` bytes, with
    /// the default [`GrowthPolicy`].
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero.
    pub fn new(stride: usize) -> RawVarray {
        Self::with_policy(stride, GrowthPolicy::DEFAULT)
    }

    /// Creates an unallocated varray with an explicit policy.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero or the policy fails validation.
    pub fn with_policy(stride: usize, policy: GrowthPolicy) -> RawVarray {
        assert!(stride != 0, "varray stride must be non-zero");
        policy.validate();
        RawVarray {
            inner: Vec::new(),
            start: 0,
            len: 0,
            capacity: 0,
            stride,
            policy,
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the varray holds no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of element slots the current allocation can hold. Zero while
    /// unallocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes per element.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns `true` once the first allocation has been made.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.capacity != 0
    }

    /// The capacity management policy in effect.
    #[inline]
    pub fn policy(&self) -> &GrowthPolicy {
        &self.policy
    }

    /// Ensures `capacity >= newcap`, reallocating to *exactly* `newcap`
    /// slots when growth is needed. Never shrinks. Allocates the initial
    /// capacity first if the varray is unallocated.
    ///
    /// Unlike organic growth through [`push`](RawVarray::push), a reserve
    /// is an exact sizing hint and applies no growth-factor rounding.
    pub fn try_reserve(&mut self, newcap: usize) -> Result<()> {
        self.ensure_allocated()?;
        if self.capacity > newcap {
            return Ok(());
        }
        self.set_capacity(newcap)
    }

    /// Panicking form of [`try_reserve`](RawVarray::try_reserve).
    pub fn reserve(&mut self, newcap: usize) {
        self.try_reserve(newcap).expect("reserve");
    }

    /// Appends one stride-sized element, growing capacity by the growth
    /// factor first when full.
    pub fn try_push(&mut self, value: &[u8]) -> Result<()> {
        debug_assert_eq!(value.len(), self.stride, "element size must match stride");
        self.ensure_allocated()?;
        if self.len == self.capacity {
            let grown = self.capacity.saturating_mul(self.policy.growth_factor);
            self.set_capacity(grown)?;
        }
        let start = self.len * self.stride;
        let end = start + self.stride;
        self.data_mut()[start..end].copy_from_slice(value);
        self.len += 1;
        Ok(())
    }

    /// Panicking form of [`try_push`](RawVarray::try_push).
    pub fn push(&mut self, value: &[u8]) {
        self.try_push(value).expect("push");
    }

    /// Appends a contiguous run of elements in one pass.
    ///
    /// Capacity is reserved for exactly `len + n` elements (no
    /// growth-factor rounding), then all source bytes are copied at once.
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` is not a multiple of the stride.
    pub fn try_push_many(&mut self, values: &[u8]) -> Result<()> {
        assert!(
            values.len() % self.stride == 0,
            "source length {} is not a multiple of stride {}",
            values.len(),
            self.stride
        );
        let n = values.len() / self.stride;
        self.ensure_allocated()?;
        self.try_reserve(self.len + n)?;
        let start = self.len * self.stride;
        let end = start + values.len();
        self.data_mut()[start..end].copy_from_slice(values);
        self.len += n;
        Ok(())
    }

    /// Panicking form of [`try_push_many`](RawVarray::try_push_many).
    pub fn push_many(&mut self, values: &[u8]) {
        self.try_push_many(values).expect("push_many");
    }

    /// Inserts one element at `index`, shifting `[index, len)` one slot to
    /// the right. Inserting at `len` appends. Grows by the growth factor
    /// first when full.
    pub fn try_insert(&mut self, index: usize, value: &[u8]) -> Result<()> {
        debug_assert_eq!(value.len(), self.stride, "element size must match stride");
        if index > self.len {
            return Err(VarrayError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        self.ensure_allocated()?;
        if self.len == self.capacity {
            let grown = self.capacity.saturating_mul(self.policy.growth_factor);
            self.set_capacity(grown)?;
        }
        let s = self.stride;
        let start = index * s;
        let end = self.len * s;
        let data = self.data_mut();
        data.copy_within(start..end, start + s);
        data[start..start + s].copy_from_slice(value);
        self.len += 1;
        Ok(())
    }

    /// Panicking form of [`try_insert`](RawVarray::try_insert).
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: &[u8]) {
        assert!(
            index <= self.len,
            "insert index {index} beyond varray length {}",
            self.len
        );
        self.try_insert(index, value).expect("insert");
    }

    /// Removes the last element and returns its bytes.
    ///
    /// The shrink check runs against the pre-removal length, *before* the
    /// element is removed: when `len < capacity / shrink_threshold`,
    /// capacity is divided by the shrink factor first, so the returned
    /// bytes are read from the post-shrink allocation. The returned slice
    /// is valid until the next mutating call.
    pub fn try_pop(&mut self) -> Result<&[u8]> {
        if self.len == 0 {
            return Err(VarrayError::Empty);
        }
        if self.len < self.capacity / self.policy.shrink_threshold {
            self.set_capacity(self.capacity / self.policy.shrink_factor)?;
        }
        self.len -= 1;
        let start = self.len * self.stride;
        Ok(&self.data()[start..start + self.stride])
    }

    /// Panicking form of [`try_pop`](RawVarray::try_pop).
    ///
    /// # Panics
    ///
    /// Panics if the varray is empty.
    pub fn pop(&mut self) -> &[u8] {
        assert!(self.len > 0, "pop on an empty varray");
        self.try_pop().expect("pop")
    }

    /// Removes the element at `index`, shifting `[index + 1, len)` one
    /// slot to the left. Applies the same pre-removal shrink check as
    /// [`try_pop`](RawVarray::try_pop). Removing the last index needs no
    /// shift.
    pub fn try_erase(&mut self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(VarrayError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        if self.len < self.capacity / self.policy.shrink_threshold {
            self.set_capacity(self.capacity / self.policy.shrink_factor)?;
        }
        if index == self.len - 1 {
            self.len -= 1;
            return Ok(());
        }
        let s = self.stride;
        let from = (index + 1) * s;
        let end = self.len * s;
        let to = index * s;
        self.data_mut().copy_within(from..end, to);
        self.len -= 1;
        Ok(())
    }

    /// Panicking form of [`try_erase`](RawVarray::try_erase).
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) {
        assert!(
            index < self.len,
            "erase index {index} out of bounds for varray of length {}",
            self.len
        );
        self.try_erase(index).expect("erase");
    }

    /// Returns the bytes of the slot at `index`.
    ///
    /// This is the trust-the-caller accessor: `index` is checked against
    /// `capacity`, not `len`. Reading a slot at or beyond `len` is allowed
    /// and yields unspecified (zero-initialized reserve) contents.
    ///
    /// # Panics
    ///
    /// Panics if the varray is unallocated or `index >= capacity`.
    pub fn at(&self, index: usize) -> &[u8] {
        assert!(self.is_allocated(), "varray storage is not allocated");
        assert!(
            index < self.capacity,
            "slot index {index} out of bounds for capacity {}",
            self.capacity
        );
        let start = index * self.stride;
        &self.data()[start..start + self.stride]
    }

    /// Mutable form of [`at`](RawVarray::at).
    pub fn at_mut(&mut self, index: usize) -> &mut [u8] {
        assert!(self.is_allocated(), "varray storage is not allocated");
        assert!(
            index < self.capacity,
            "slot index {index} out of bounds for capacity {}",
            self.capacity
        );
        let start = index * self.stride;
        let end = start + self.stride;
        &mut self.data_mut()[start..end]
    }

    /// Bytes of the first slot.
    ///
    /// # Panics
    ///
    /// Panics if the varray is unallocated. The length is deliberately not
    /// checked: reading slot 0 of an allocated but empty varray yields
    /// unspecified contents.
    pub fn front(&self) -> &[u8] {
        self.at(0)
    }

    /// Bytes of the last live element.
    ///
    /// # Panics
    ///
    /// Panics if the varray is empty.
    pub fn back(&self) -> &[u8] {
        assert!(self.len > 0, "back on an empty varray");
        self.at(self.len - 1)
    }

    /// The live element region as raw bytes (`len * stride` bytes).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data()[..self.len * self.stride]
    }

    /// Mutable form of [`as_bytes`](RawVarray::as_bytes).
    #[inline]
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        let end = self.len * self.stride;
        &mut self.data_mut()[..end]
    }

    /// Sets the length to zero without releasing or shrinking the
    /// allocation.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Releases the allocation and returns the varray to the unallocated
    /// state. The next mutating operation re-allocates.
    pub fn release(&mut self) {
        self.inner = Vec::new();
        self.start = 0;
        self.len = 0;
        self.capacity = 0;
    }
}

impl RawVarray {
    /// The full element region, `capacity * stride` bytes, aligned to
    /// [`RawVarray::ALIGNMENT`].
    #[inline]
    fn data(&self) -> &[u8] {
        &self.inner[self.start..self.start + self.capacity * self.stride]
    }

    #[inline]
    fn data_mut(&mut self) -> &mut [u8] {
        let start = self.start;
        let end = start + self.capacity * self.stride;
        &mut self.inner[start..end]
    }

    /// Makes the first allocation when the varray is still unallocated.
    fn ensure_allocated(&mut self) -> Result<()> {
        if self.capacity == 0 {
            self.set_capacity(self.policy.initial_capacity)
        } else {
            Ok(())
        }
    }

    /// Replaces the backing allocation with one of exactly `newcap` slots,
    /// carrying the live elements over. Requires `newcap >= len`.
    #[cold]
    fn set_capacity(&mut self, newcap: usize) -> Result<()> {
        let overflow = || VarrayError::CapacityOverflow {
            elements: newcap,
            stride: self.stride,
        };
        let bytes = newcap.checked_mul(self.stride).ok_or_else(overflow)?;
        let total = bytes.checked_add(Self::ALIGNMENT).ok_or_else(overflow)?;

        let mut inner: Vec<u8> = Vec::new();
        inner
            .try_reserve_exact(total)
            .map_err(|_| VarrayError::AllocationFailed { bytes: total })?;

        // Pad the front so the element region lands on the alignment
        // boundary. The padding fits within the reserved capacity, so the
        // resize below cannot move the allocation.
        let p = inner.as_ptr() as usize;
        let start = p.next_multiple_of(Self::ALIGNMENT) - p;
        inner.resize(start + bytes, 0);

        debug_assert!(self.len <= newcap);
        let live = self.len * self.stride;
        inner[start..start + live]
            .copy_from_slice(&self.inner[self.start..self.start + live]);

        self.inner = inner;
        self.start = start;
        self.capacity = newcap;
        Ok(())
    }
}

impl Clone for RawVarray {
    fn clone(&self) -> RawVarray {
        let mut v = RawVarray::with_policy(self.stride, self.policy);
        if self.is_allocated() {
            v.set_capacity(self.capacity).expect("alloc");
            let live = self.len * self.stride;
            v.data_mut()[..live].copy_from_slice(self.as_bytes());
            v.len = self.len;
        }
        v
    }
}

impl std::fmt::Debug for RawVarray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawVarray")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("stride", &self.stride)
            .finish_non_exhaustive()
    }
}
