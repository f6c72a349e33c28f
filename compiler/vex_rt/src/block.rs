//! Reference-counted heap blocks.
//!
//! All three block kinds start with an `i64` reference count:
//!
//! ```text
//! array:  [ref_count | len     | Value; len  ]
//! object: [ref_count | symbols | Value; n    ]
//! string: [ref_count | len     | data ------]--> bytes..., NUL
//! ```
//!
//! Array and object blocks store their values inline and are allocated
//! with an exact layout; string blocks own a separate NUL-terminated
//! buffer so `data` can be handed to C unchanged.

use std::alloc::{self, Layout};
use std::ffi::{c_char, CStr, CString};
use std::ptr;

use tracing::error;
use vex_stack::ensure_sufficient_stack;

use crate::alloc_track::{self, BlockKind};
use crate::Value;

/// Increment a block's reference count.
///
/// # Safety
///
/// `count` must point at the count of a live block.
pub(crate) unsafe fn retain(count: *mut i64) {
    *count += 1;
}

/// Decrement a block's reference count. Returns `true` when the block
/// must be freed.
///
/// A count that is already zero or negative is an invariant violation: it
/// is logged and the block is left alone.
///
/// # Safety
///
/// `count` must point at the count of a block that has not been freed.
pub(crate) unsafe fn release(count: *mut i64, kind: BlockKind) -> bool {
    let current = *count;
    if current <= 0 {
        error!(?kind, count = current, "release of block with non-positive ref count");
        return false;
    }
    *count = current - 1;
    current == 1
}

/// Array block header. `len` values follow inline.
#[repr(C)]
pub struct ArrayBlock {
    pub ref_count: i64,
    pub len: u64,
    pub(crate) items: [Value; 0],
}

impl ArrayBlock {
    fn layout(len: usize) -> Option<Layout> {
        let (layout, _) = Layout::new::<ArrayBlock>()
            .extend(Layout::array::<Value>(len).ok()?)
            .ok()?;
        Some(layout.pad_to_align())
    }

    /// Allocate a header for `len` items with the item slots uninitialized.
    /// `None` if `len` values do not fit in a layout or the allocator
    /// refused.
    fn alloc_header(len: usize) -> Option<*mut ArrayBlock> {
        let layout = Self::layout(len)?;
        // SAFETY: the layout has non-zero size (the header).
        let block = unsafe { alloc::alloc(layout) }.cast::<ArrayBlock>();
        if block.is_null() {
            return None;
        }
        // SAFETY: `block` is freshly allocated.
        unsafe {
            ptr::addr_of_mut!((*block).ref_count).write(1);
            ptr::addr_of_mut!((*block).len).write(len as u64);
        }
        Some(block)
    }

    /// Allocate a block taking ownership of `items`. `None` if the
    /// allocation failed, in which case `items` are still owned by the caller.
    pub(crate) fn alloc(items: &[Value]) -> Option<*mut ArrayBlock> {
        let block = Self::alloc_header(items.len())?;
        // SAFETY: `block` has room for the items.
        unsafe {
            ptr::copy_nonoverlapping(items.as_ptr(), Self::items_ptr(block), items.len());
        }
        alloc_track::track_alloc(BlockKind::Array);
        Some(block)
    }

    /// Allocate a block of `len` void items, filled in place.
    pub(crate) fn alloc_void(len: usize) -> Option<*mut ArrayBlock> {
        let block = Self::alloc_header(len)?;
        // SAFETY: `block` has room for `len` items.
        unsafe {
            let items = Self::items_ptr(block);
            for i in 0..len {
                items.add(i).write(Value::void());
            }
        }
        alloc_track::track_alloc(BlockKind::Array);
        Some(block)
    }

    /// Pointer to the first inline value.
    ///
    /// # Safety
    ///
    /// `block` must point at a live array block.
    pub(crate) unsafe fn items_ptr(block: *mut ArrayBlock) -> *mut Value {
        ptr::addr_of_mut!((*block).items).cast::<Value>()
    }

    /// Pointer to slot `index`, `None` when out of range.
    ///
    /// # Safety
    ///
    /// `block` must point at a live array block.
    pub(crate) unsafe fn slot(block: *mut ArrayBlock, index: usize) -> Option<*mut Value> {
        (index < (*block).len as usize).then(|| Self::items_ptr(block).add(index))
    }

    /// Drop every element, then free the block.
    ///
    /// # Safety
    ///
    /// `block` must be live with a count that just reached zero.
    pub(crate) unsafe fn destroy(block: *mut ArrayBlock) {
        let len = (*block).len as usize;
        let items = Self::items_ptr(block);
        // Elements may be arrays themselves; nesting depth is unbounded.
        ensure_sufficient_stack(|| {
            for i in 0..len {
                let slot = items.add(i);
                ((*slot).ops().drop)(slot);
            }
        });
        if let Some(layout) = Self::layout(len) {
            alloc::dealloc(block.cast::<u8>(), layout);
            alloc_track::track_dealloc(BlockKind::Array);
        }
    }
}

/// Object block header. One value per symbol follows inline.
#[repr(C)]
pub struct ObjectBlock {
    pub ref_count: i64,
    pub symbols: *const Symbols,
    pub(crate) slots: [Value; 0],
}

impl ObjectBlock {
    fn layout(len: usize) -> Option<Layout> {
        let (layout, _) = Layout::new::<ObjectBlock>()
            .extend(Layout::array::<Value>(len).ok()?)
            .ok()?;
        Some(layout.pad_to_align())
    }

    pub(crate) fn alloc(symbols: &'static Symbols, values: &[Value]) -> Option<*mut ObjectBlock> {
        let layout = Self::layout(values.len())?;
        // SAFETY: the layout has non-zero size (the header).
        let block = unsafe { alloc::alloc(layout) }.cast::<ObjectBlock>();
        if block.is_null() {
            return None;
        }
        // SAFETY: `block` is freshly allocated with room for the values.
        unsafe {
            ptr::addr_of_mut!((*block).ref_count).write(1);
            ptr::addr_of_mut!((*block).symbols).write(symbols);
            ptr::copy_nonoverlapping(values.as_ptr(), Self::slots_ptr(block), values.len());
        }
        alloc_track::track_alloc(BlockKind::Object);
        Some(block)
    }

    /// # Safety
    ///
    /// `block` must point at a live object block.
    pub(crate) unsafe fn slots_ptr(block: *mut ObjectBlock) -> *mut Value {
        ptr::addr_of_mut!((*block).slots).cast::<Value>()
    }

    /// Class descriptor of a live block.
    ///
    /// # Safety
    ///
    /// `block` must point at a live object block.
    pub(crate) unsafe fn symbols<'a>(block: *const ObjectBlock) -> Option<&'a Symbols> {
        (*block).symbols.as_ref()
    }

    /// # Safety
    ///
    /// `block` must be live with a count that just reached zero.
    pub(crate) unsafe fn destroy(block: *mut ObjectBlock) {
        let Some(symbols) = Self::symbols(block).filter(|s| s.is_well_formed()) else {
            error!("object block with malformed symbols, leaking it");
            return;
        };
        let len = symbols.slot_count();
        let slots = Self::slots_ptr(block);
        ensure_sufficient_stack(|| {
            for i in 0..len {
                let slot = slots.add(i);
                ((*slot).ops().drop)(slot);
            }
        });
        if let Some(layout) = Self::layout(len) {
            alloc::dealloc(block.cast::<u8>(), layout);
            alloc_track::track_dealloc(BlockKind::Object);
        }
    }
}

/// String block. `data` is an owned buffer of `len` bytes plus a NUL.
#[repr(C)]
pub struct StringBlock {
    pub ref_count: i64,
    pub len: u64,
    pub data: *mut u8,
}

impl StringBlock {
    pub(crate) fn alloc(bytes: &[u8]) -> *mut StringBlock {
        let mut buffer = Vec::with_capacity(bytes.len() + 1);
        buffer.extend_from_slice(bytes);
        buffer.push(0);
        let data = Box::into_raw(buffer.into_boxed_slice()).cast::<u8>();
        alloc_track::track_alloc(BlockKind::String);
        Box::into_raw(Box::new(StringBlock {
            ref_count: 1,
            len: bytes.len() as u64,
            data,
        }))
    }

    /// Contents without the trailing NUL.
    ///
    /// # Safety
    ///
    /// `block` must be null or point at a live string block.
    pub(crate) unsafe fn bytes<'a>(block: *const StringBlock) -> Option<&'a [u8]> {
        let block = block.as_ref()?;
        if block.data.is_null() {
            return None;
        }
        Some(std::slice::from_raw_parts(block.data, block.len as usize))
    }

    /// Pointer to byte `index`, `None` when out of range.
    ///
    /// # Safety
    ///
    /// `block` must point at a live string block.
    pub(crate) unsafe fn byte_ptr(block: *mut StringBlock, index: usize) -> Option<*mut u8> {
        (index < (*block).len as usize).then(|| (*block).data.add(index))
    }

    /// # Safety
    ///
    /// `block` must have come from [`StringBlock::alloc`] and its count
    /// must have just reached zero.
    pub(crate) unsafe fn destroy(block: *mut StringBlock) {
        let block = Box::from_raw(block);
        if !block.data.is_null() {
            let buffer = ptr::slice_from_raw_parts_mut(block.data, block.len as usize + 1);
            drop(Box::from_raw(buffer));
        }
        alloc_track::track_dealloc(BlockKind::String);
    }
}

/// Class descriptor shared by every instance of a class.
///
/// `names` holds `len` C strings: the `field_count` fields first, then the
/// methods, in declaration order. Generated code emits these into its data
/// section; Rust callers can build one with [`Symbols::leak`].
#[repr(C)]
#[derive(Debug)]
pub struct Symbols {
    pub class_name: *const c_char,
    pub field_count: u64,
    pub len: u64,
    pub names: *const *const c_char,
}

// SAFETY: descriptors are immutable after construction.
unsafe impl Sync for Symbols {}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SymbolsError {
    #[error("symbol name {0:?} contains a NUL byte")]
    InteriorNul(String),
}

impl Symbols {
    /// Build a descriptor that lives for the rest of the process.
    pub fn leak(
        class_name: &str,
        fields: &[&str],
        methods: &[&str],
    ) -> Result<&'static Symbols, SymbolsError> {
        let c_string = |s: &str| {
            CString::new(s).map_err(|_| SymbolsError::InteriorNul(s.to_owned()))
        };
        let class_name = c_string(class_name)?.into_raw().cast_const();
        let names = fields
            .iter()
            .chain(methods)
            .map(|s| c_string(s).map(|c| c.into_raw().cast_const()))
            .collect::<Result<Vec<_>, _>>()?;
        let len = names.len() as u64;
        let names = Box::leak(names.into_boxed_slice()).as_ptr();
        Ok(Box::leak(Box::new(Symbols {
            class_name,
            field_count: fields.len() as u64,
            len,
            names,
        })))
    }

    /// `field_count <= len`, and every pointer it promises is non-null.
    pub fn is_well_formed(&self) -> bool {
        if self.field_count > self.len {
            return false;
        }
        if self.len > 0 && self.names.is_null() {
            return false;
        }
        (0..self.slot_count()).all(|i| self.name(i).is_some())
    }

    pub fn slot_count(&self) -> usize {
        self.len as usize
    }

    pub fn field_count(&self) -> usize {
        self.field_count as usize
    }

    pub fn class_name(&self) -> &str {
        // SAFETY: a non-null class name is a NUL-terminated static string.
        unsafe { self.class_name.as_ref() }
            .and_then(|_| unsafe { CStr::from_ptr(self.class_name) }.to_str().ok())
            .unwrap_or("<anonymous>")
    }

    /// Name of member `index`.
    pub fn name(&self, index: usize) -> Option<&CStr> {
        if index >= self.slot_count() || self.names.is_null() {
            return None;
        }
        // SAFETY: `names` has `len` entries.
        let name = unsafe { *self.names.add(index) };
        // SAFETY: a non-null entry is a NUL-terminated static string.
        (!name.is_null()).then(|| unsafe { CStr::from_ptr(name) })
    }

    /// Slot index of member `name`.
    pub fn find(&self, name: &CStr) -> Option<usize> {
        (0..self.slot_count()).find(|&i| self.name(i) == Some(name))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
