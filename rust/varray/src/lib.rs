//! Contiguous growable array container with an explicit, deterministic
//! growth and shrink policy.
//!
//! [`Varray<T>`] is the typed container: amortized O(1) append through
//! geometric growth (capacity doubles when an append finds no free slot)
//! and automatic memory reclamation (capacity halves when a removal
//! observes occupancy below one third). Explicit [`reserve`](Varray::reserve)
//! calls size the allocation exactly, with no growth-factor rounding.
//!
//! [`raw::RawVarray`] is the underlying stride-based byte engine, usable
//! directly when the element size is only known at run time.
//!
//! Every operation exists in two forms: a panicking form with `Vec`-like
//! ergonomics, and a fallible `try_` form that reports precondition
//! violations and allocation failure as [`VarrayError`] values.
//!
//! ```
//! use varray::Varray;
//!
//! let mut v: Varray<u32> = Varray::new();
//! v.push(1);
//! v.push(2);
//! v.push(3);
//! v.insert(1, 42);
//! assert_eq!(v.as_slice(), &[1, 42, 2, 3]);
//! assert_eq!(v.pop(), 3);
//! assert_eq!(v.len(), 3);
//! ```

use std::marker::PhantomData;
use std::mem;
use std::ops::{Index, IndexMut};

pub mod error;
pub mod policy;
pub mod raw;

pub use error::{Result, VarrayError};
pub use policy::GrowthPolicy;
pub use raw::RawVarray;

/// A contiguous growable array of plain-old-data elements.
///
/// `Varray<T>` is a typed façade over [`RawVarray`]: the element stride is
/// `size_of::<T>()`, fixed by the type parameter, and all element bytes
/// move through `bytemuck` casts, so the container holds no unsafe code.
///
/// Elements must be plain old data (`bytemuck::NoUninit +
/// bytemuck::AnyBitPattern`): they are stored and moved as raw bytes, and
/// reserve slots are observable as zeroed values through the
/// trust-the-caller [`at`](Varray::at) accessor. Zero-sized types are
/// rejected at construction.
pub struct Varray<T> {
    raw: RawVarray,
    _marker: PhantomData<T>,
}

impl<T> Varray<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    /// Creates a new unallocated varray with the default [`GrowthPolicy`].
    ///
    /// No allocation happens until the first mutating operation.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or over-aligned (alignment beyond
    /// [`RawVarray::ALIGNMENT`]).
    pub fn new() -> Varray<T> {
        Self::with_policy(GrowthPolicy::DEFAULT)
    }

    /// Creates a new unallocated varray with an explicit policy.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or over-aligned, or if the policy fails
    /// validation.
    pub fn with_policy(policy: GrowthPolicy) -> Varray<T> {
        assert!(
            mem::size_of::<T>() != 0,
            "zero-sized element types are not supported"
        );
        assert!(
            mem::align_of::<T>() <= RawVarray::ALIGNMENT,
            "element alignment exceeds varray storage alignment"
        );
        Varray {
            raw: RawVarray::with_policy(mem::size_of::<T>(), policy),
            _marker: PhantomData,
        }
    }

    /// Creates a varray pre-sized to hold `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Varray<T> {
        let mut v = Self::new();
        if capacity > 0 {
            v.raw.reserve(capacity);
        }
        v
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the varray holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Number of elements the current allocation can hold. Zero while
    /// unallocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Bytes per element (`size_of::<T>()`).
    #[inline]
    pub fn stride(&self) -> usize {
        self.raw.stride()
    }

    /// The capacity management policy in effect.
    #[inline]
    pub fn policy(&self) -> &GrowthPolicy {
        self.raw.policy()
    }

    /// Ensures `capacity >= newcap`, reallocating to exactly `newcap`
    /// elements when growth is needed. Never shrinks.
    pub fn reserve(&mut self, newcap: usize) {
        self.raw.reserve(newcap);
    }

    /// Fallible form of [`reserve`](Varray::reserve).
    pub fn try_reserve(&mut self, newcap: usize) -> Result<()> {
        self.raw.try_reserve(newcap)
    }

    /// Appends an element, doubling capacity first when full.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.raw.push(bytemuck::bytes_of(&value));
    }

    /// Fallible form of [`push`](Varray::push).
    pub fn try_push(&mut self, value: T) -> Result<()> {
        self.raw.try_push(bytemuck::bytes_of(&value))
    }

    /// Appends all elements of a slice in one pass.
    ///
    /// Reserves capacity for exactly `len + values.len()` elements, then
    /// bulk-copies; the growth factor does not apply.
    pub fn extend_from_slice(&mut self, values: &[T]) {
        self.raw.push_many(bytemuck::cast_slice(values));
    }

    /// Fallible form of [`extend_from_slice`](Varray::extend_from_slice).
    pub fn try_extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        self.raw.try_push_many(bytemuck::cast_slice(values))
    }

    /// Inserts `value` at `index`, shifting `[index, len)` one slot to the
    /// right. Inserting at `len` appends.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        self.raw.insert(index, bytemuck::bytes_of(&value));
    }

    /// Fallible form of [`insert`](Varray::insert).
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<()> {
        self.raw.try_insert(index, bytemuck::bytes_of(&value))
    }

    /// Removes and returns the last element.
    ///
    /// If the pre-removal length is below `capacity / shrink_threshold`,
    /// capacity is halved before the element is read out.
    ///
    /// # Panics
    ///
    /// Panics if the varray is empty.
    pub fn pop(&mut self) -> T {
        *bytemuck::from_bytes(self.raw.pop())
    }

    /// Fallible form of [`pop`](Varray::pop).
    pub fn try_pop(&mut self) -> Result<T> {
        self.raw.try_pop().map(|bytes| *bytemuck::from_bytes(bytes))
    }

    /// Removes the element at `index`, shifting `[index + 1, len)` one
    /// slot to the left. Applies the same shrink check as
    /// [`pop`](Varray::pop).
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) {
        self.raw.erase(index);
    }

    /// Fallible form of [`erase`](Varray::erase).
    pub fn try_erase(&mut self, index: usize) -> Result<()> {
        self.raw.try_erase(index)
    }

    /// Returns the element at `index` without checking it against the
    /// length.
    ///
    /// This is the trust-the-caller accessor: any slot below `capacity` is
    /// reachable, and slots at or beyond `len` read as zeroed values. Use
    /// [`get`](Varray::get) or indexing for length-checked access.
    ///
    /// # Panics
    ///
    /// Panics if the varray is unallocated or `index >= capacity`.
    pub fn at(&self, index: usize) -> &T {
        bytemuck::from_bytes(self.raw.at(index))
    }

    /// Mutable form of [`at`](Varray::at).
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        bytemuck::from_bytes_mut(self.raw.at_mut(index))
    }

    /// Returns a reference to the element at `index`, or `None` if
    /// `index >= len`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Mutable form of [`get`](Varray::get).
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// The first slot of the allocation.
    ///
    /// Like [`at`](Varray::at), the length is not checked: on an allocated
    /// but empty varray this reads slot 0 as a zeroed value.
    ///
    /// # Panics
    ///
    /// Panics if the varray is unallocated.
    pub fn front(&self) -> &T {
        bytemuck::from_bytes(self.raw.front())
    }

    /// The last live element.
    ///
    /// # Panics
    ///
    /// Panics if the varray is empty.
    pub fn back(&self) -> &T {
        bytemuck::from_bytes(self.raw.back())
    }

    /// The live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        bytemuck::cast_slice(self.raw.as_bytes())
    }

    /// The live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        bytemuck::cast_slice_mut(self.raw.as_mut_bytes())
    }

    /// Returns an iterator over the live elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Sets the length to zero without releasing or shrinking the
    /// allocation. Subsequent pushes reuse the existing capacity.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Releases the allocation entirely, returning the varray to the
    /// unallocated state. The next mutating operation re-allocates.
    pub fn release(&mut self) {
        self.raw.release();
    }

    /// Borrows the underlying byte engine.
    pub fn as_raw(&self) -> &RawVarray {
        &self.raw
    }
}

impl<T> Default for Varray<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    fn default() -> Varray<T> {
        Varray::new()
    }
}

impl<T> Clone for Varray<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    fn clone(&self) -> Varray<T> {
        Varray {
            raw: self.raw.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Index<usize> for Varray<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for Varray<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T> Extend<T> for Varray<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (low, _) = iter.size_hint();
        if low > 0 {
            self.reserve(self.len() + low);
        }
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for Varray<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Varray<T> {
        let mut v = Varray::new();
        v.extend(iter);
        v
    }
}

impl<'a, T> IntoIterator for &'a Varray<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern,
{
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> std::fmt::Debug for Varray<T>
where
    T: bytemuck::NoUninit + bytemuck::AnyBitPattern + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Varray")
            .field("values", &self.as_slice())
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_index_round_trip() {
        let mut v: Varray<u64> = Varray::new();
        for i in 0..50u64 {
            v.push(i * i);
            assert_eq!(v.len() as u64, i + 1);
            assert!(v.capacity() >= v.len());
        }
        for i in 0..50usize {
            assert_eq!(v[i], (i * i) as u64);
        }
    }

    #[test]
    fn seventy_ints_insert_and_erase_scenario() {
        let mut v: Varray<i32> = Varray::new();
        for i in 0..70 {
            v.push(i);
        }
        assert_eq!(v.len(), 70);

        v.insert(10, 420);
        assert_eq!(v.len(), 71);
        assert_eq!(v[10], 420);
        assert_eq!(v[11], 10);

        v.erase(10);
        assert_eq!(v.len(), 70);
        assert_eq!(v[10], 10);
        for i in 0..70usize {
            assert_eq!(v[i], i as i32);
        }
    }

    #[test]
    fn c_string_usage_contract() {
        let raw_string = b"Hello, World!";
        let mut string: Varray<u8> = Varray::new();
        string.reserve(raw_string.len() + 1);
        for &b in raw_string {
            string.push(b);
        }
        string.push(b'\0');
        assert_eq!(string.len(), raw_string.len() + 1);
        assert_eq!(string.capacity(), raw_string.len() + 1);
        assert_eq!(&string.as_slice()[..raw_string.len()], raw_string);
        assert_eq!(*string.back(), b'\0');
    }

    #[test]
    fn typed_and_raw_capacity_trajectories_agree() {
        let mut typed: Varray<u32> = Varray::new();
        let mut raw = RawVarray::new(4);
        for i in 0..33u32 {
            typed.push(i);
            raw.push(&i.to_ne_bytes());
            assert_eq!(typed.len(), raw.len());
            assert_eq!(typed.capacity(), raw.capacity());
        }
        typed.pop();
        raw.pop();
        assert_eq!(typed.capacity(), raw.capacity());
    }

    #[test]
    fn extend_from_slice_is_exact_and_order_preserving() {
        let mut v: Varray<u16> = Varray::new();
        v.extend_from_slice(&[1, 2, 3, 4, 5]);
        assert_eq!(v.capacity(), 5);
        v.extend_from_slice(&[6, 7]);
        assert_eq!(v.capacity(), 7);
        assert_eq!(v.as_slice(), &[1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn pop_returns_values_in_reverse_push_order() {
        let mut v: Varray<i64> = Varray::new();
        v.extend_from_slice(&[10, 20, 30]);
        assert_eq!(v.pop(), 30);
        assert_eq!(v.pop(), 20);
        assert_eq!(v.pop(), 10);
        assert!(v.is_empty());
        assert_eq!(v.try_pop(), Err(VarrayError::Empty));
    }

    #[test]
    fn pop_shrink_happens_before_the_value_is_read() {
        let mut v: Varray<u32> = Varray::with_capacity(12);
        v.extend_from_slice(&[7, 8, 9]);
        assert_eq!(v.capacity(), 12);
        // Pre-removal len 3 < 12 / 3 == 4: shrink to 6 first. The popped
        // value must still read correctly from the new allocation.
        assert_eq!(v.pop(), 9);
        assert_eq!(v.capacity(), 6);
        assert_eq!(v.as_slice(), &[7, 8]);
    }

    #[test]
    fn get_is_length_checked_while_at_is_not() {
        let mut v: Varray<u32> = Varray::with_capacity(8);
        v.push(5);
        assert_eq!(v.get(0), Some(&5));
        assert_eq!(v.get(1), None);
        // `at` reaches reserve slots; they read as zero.
        assert_eq!(*v.at(1), 0);
        assert_eq!(*v.at(7), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn indexing_beyond_len_panics() {
        let mut v: Varray<u32> = Varray::with_capacity(8);
        v.push(5);
        let _ = v[1];
    }

    #[test]
    fn front_back_and_mutation_through_index() {
        let mut v: Varray<i16> = Varray::new();
        v.extend_from_slice(&[3, 1, 4, 1, 5]);
        assert_eq!(*v.front(), 3);
        assert_eq!(*v.back(), 5);
        v[0] = -3;
        *v.at_mut(4) = -5;
        assert_eq!(v.as_slice(), &[-3, 1, 4, 1, -5]);
    }

    #[test]
    fn clear_then_push_reuses_capacity() {
        let mut v: Varray<u8> = Varray::new();
        v.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        let cap = v.capacity();
        v.clear();
        assert!(v.is_empty());
        assert_eq!(v.capacity(), cap);
        v.push(9);
        assert_eq!(v.capacity(), cap);
        assert_eq!(v.as_slice(), &[9]);
    }

    #[test]
    fn release_then_reuse() {
        let mut v: Varray<u32> = Varray::new();
        v.extend_from_slice(&[1, 2, 3]);
        v.release();
        assert_eq!(v.capacity(), 0);
        assert_eq!(v.len(), 0);
        v.push(4);
        assert_eq!(v.as_slice(), &[4]);
    }

    #[test]
    fn from_iterator_and_extend() {
        let v: Varray<u32> = (0..10).collect();
        assert_eq!(v.len(), 10);
        assert_eq!(v[9], 9);

        let mut w: Varray<u32> = Varray::new();
        w.extend(0..4u32);
        assert_eq!(w.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn iteration_over_references() {
        let v: Varray<u32> = (1..=5).collect();
        let sum: u32 = v.iter().sum();
        assert_eq!(sum, 15);
        let doubled: Vec<u32> = (&v).into_iter().map(|x| x * 2).collect();
        assert_eq!(doubled, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn clone_is_deep() {
        let mut v: Varray<u32> = (0..8).collect();
        let c = v.clone();
        v[0] = 99;
        assert_eq!(c[0], 0);
        assert_eq!(c.len(), 8);
        assert_eq!(c.capacity(), v.capacity());
    }

    #[test]
    fn works_with_derived_pod_structs() {
        #[repr(C)]
        #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
        struct Point {
            x: f32,
            y: f32,
        }

        let mut v: Varray<Point> = Varray::new();
        v.push(Point { x: 1.0, y: 2.0 });
        v.push(Point { x: 3.0, y: 4.0 });
        v.insert(1, Point { x: 0.5, y: 0.5 });
        assert_eq!(v.len(), 3);
        assert_eq!(v[1], Point { x: 0.5, y: 0.5 });
        assert_eq!(v.stride(), std::mem::size_of::<Point>());
        let last = v.pop();
        assert_eq!(last, Point { x: 3.0, y: 4.0 });
    }

    #[test]
    fn custom_policy_is_honored() {
        let policy = GrowthPolicy {
            growth_factor: 4,
            shrink_factor: 2,
            shrink_threshold: 5,
            initial_capacity: 2,
        };
        let mut v: Varray<u32> = Varray::with_policy(policy);
        v.push(1);
        assert_eq!(v.capacity(), 2);
        v.push(2);
        v.push(3);
        assert_eq!(v.capacity(), 8);
        assert_eq!(*v.policy(), policy);
    }

    #[test]
    fn try_tier_matches_panicking_tier_semantics() {
        let mut v: Varray<u32> = Varray::new();
        assert_eq!(
            v.try_insert(3, 1),
            Err(VarrayError::IndexOutOfBounds { index: 3, len: 0 })
        );
        v.try_push(1).unwrap();
        v.try_extend_from_slice(&[2, 3]).unwrap();
        v.try_insert(0, 0).unwrap();
        assert_eq!(v.as_slice(), &[0, 1, 2, 3]);
        v.try_erase(1).unwrap();
        assert_eq!(v.as_slice(), &[0, 2, 3]);
        assert_eq!(
            v.try_erase(3),
            Err(VarrayError::IndexOutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn debug_output_shows_contents() {
        let v: Varray<u8> = (1..=3).collect();
        let s = format!("{v:?}");
        assert!(s.contains("values"));
        assert!(s.contains("len"));
        assert!(s.contains("capacity"));
    }
}
