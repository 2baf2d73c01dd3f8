//! Variable-name interning.
//!
//! The analyzer compares names constantly: every def/use/in/out membership
//! test is a name comparison. Interning canonicalizes each distinct string
//! once and reduces all later comparisons to [`Sym`] identity checks.
//!
//! The table is open-addressed with linear probing and doubles at 75%
//! load. Entries are never removed; a function's names live exactly as
//! long as its analysis.

/// Identity of an interned name.
///
/// Two `Sym`s compare equal iff they were interned from the same string
/// in the same [`Interner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sym(u32);

/// Mixing constants for the name hash, indexed by byte position mod 7.
const MIX_TABLE: [u32; 8] = [
    0x6745_2301,
    0xEFCD_AB89,
    0x547B_7452,
    0x98BA_DCFE,
    0x1032_5476,
    0xC3D2_E1F0,
    0xA6C3_D452,
    0xDAEF_CDB7,
];

#[derive(Debug, Clone, Copy)]
struct Slot {
    /// Hash of the interned string, kept so rehashing never re-reads it.
    hash: u32,
    sym: Sym,
}

/// An append-only string interner.
#[derive(Debug, Clone)]
pub struct Interner {
    slots: Vec<Option<Slot>>,
    strings: Vec<String>,
}

impl Interner {
    /// Create an interner with the default table size.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create an interner whose table starts at `capacity` rounded up to a
    /// power of two (minimum 2).
    pub fn with_capacity(capacity: usize) -> Self {
        let size = capacity.max(2).next_power_of_two();
        Interner {
            slots: vec![None; size],
            strings: Vec::new(),
        }
    }

    fn hash(name: &str) -> u32 {
        let bytes = name.as_bytes();
        let mut hash = 0u32;
        for &byte in bytes {
            hash = hash.wrapping_add(u32::from(byte));
        }
        for (i, &byte) in bytes.iter().enumerate() {
            hash = hash.wrapping_add(u32::from(byte).wrapping_mul(MIX_TABLE[i % 7]));
        }
        hash
    }

    /// Intern `name`, returning the existing [`Sym`] if it was seen before.
    ///
    /// # Examples
    ///
    /// ```
    /// use coldread::intern::Interner;
    ///
    /// let mut names = Interner::new();
    /// let a = names.intern("x#0-0");
    /// let b = names.intern("x#0-0");
    /// assert_eq!(a, b);
    /// assert_eq!(names.resolve(a), "x#0-0");
    /// ```
    pub fn intern(&mut self, name: &str) -> Sym {
        let hash = Self::hash(name);
        let mask = self.slots.len() - 1;
        let mut index = (hash as usize) & mask;
        while let Some(slot) = &self.slots[index] {
            if slot.hash == hash && self.strings[slot.sym.0 as usize] == name {
                return slot.sym;
            }
            index = (index + 1) & mask;
        }

        let sym = Sym(self.strings.len() as u32);
        self.strings.push(name.to_owned());
        self.slots[index] = Some(Slot { hash, sym });
        if self.strings.len() * 4 > self.slots.len() * 3 {
            self.grow();
        }
        sym
    }

    /// Look up a name without interning it.
    pub fn lookup(&self, name: &str) -> Option<Sym> {
        let hash = Self::hash(name);
        let mask = self.slots.len() - 1;
        let mut index = (hash as usize) & mask;
        while let Some(slot) = &self.slots[index] {
            if slot.hash == hash && self.strings[slot.sym.0 as usize] == name {
                return Some(slot.sym);
            }
            index = (index + 1) & mask;
        }
        None
    }

    /// The string a [`Sym`] stands for.
    pub fn resolve(&self, sym: Sym) -> &str {
        &self.strings[sym.0 as usize]
    }

    /// Number of distinct interned names.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// True when nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Current slot count of the probe table.
    pub fn table_size(&self) -> usize {
        self.slots.len()
    }

    fn grow(&mut self) {
        let new_size = self.slots.len() * 2;
        let mask = new_size - 1;
        let mut slots: Vec<Option<Slot>> = vec![None; new_size];
        // Reinsert with the stored hashes; strings are never re-read.
        for slot in self.slots.drain(..).flatten() {
            let mut index = (slot.hash as usize) & mask;
            while slots[index].is_some() {
                index = (index + 1) & mask;
            }
            slots[index] = Some(slot);
        }
        self.slots = slots;
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
