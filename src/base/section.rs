//! The sections of a DNS message.

use core::{fmt, mem, slice};

//------------ Section -------------------------------------------------------

/// One of the four sections of a DNS message.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Section {
    /// The question section.
    Question,

    /// The answer section.
    Answer,

    /// The authority section.
    Authority,

    /// The additional section.
    Additional,
}

impl Section {
    /// All sections in the order they appear in a message.
    pub const ALL: [Section; 4] = [
        Section::Question,
        Section::Answer,
        Section::Authority,
        Section::Additional,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Section::Question => "QUESTION",
            Section::Answer => "ANSWER",
            Section::Authority => "AUTHORITY",
            Section::Additional => "ADDITIONAL",
        })
    }
}

//------------ OneOrMany -----------------------------------------------------

/// A sequence that stores a single element without a vec.
///
/// Most messages have exactly one question and often at most one
/// additional record. Keeping such a single entry inline avoids
/// allocating a list for it. Once a list is asked for, the value switches
/// to [`Many`][OneOrMany::Many] and stays there, even if the list is later
/// emptied.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum OneOrMany<T> {
    #[default]
    Empty,
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn len(&self) -> usize {
        match *self {
            OneOrMany::Empty => 0,
            OneOrMany::One(_) => 1,
            OneOrMany::Many(ref vec) => vec.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the first element.
    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn as_slice(&self) -> &[T] {
        match *self {
            OneOrMany::Empty => &[],
            OneOrMany::One(ref item) => slice::from_ref(item),
            OneOrMany::Many(ref vec) => vec,
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match *self {
            OneOrMany::Empty => &mut [],
            OneOrMany::One(ref mut item) => slice::from_mut(item),
            OneOrMany::Many(ref mut vec) => vec,
        }
    }

    /// Returns the elements as a vec, converting into one if necessary.
    pub fn to_mut_vec(&mut self) -> &mut Vec<T> {
        match mem::take(self) {
            OneOrMany::Empty => *self = OneOrMany::Many(Vec::new()),
            OneOrMany::One(item) => *self = OneOrMany::Many(vec![item]),
            many => *self = many,
        }
        match *self {
            OneOrMany::Many(ref mut vec) => vec,
            _ => unreachable!(),
        }
    }

    /// Appends an element.
    ///
    /// An empty value only switches to a single element.
    pub fn push(&mut self, item: T) {
        match *self {
            OneOrMany::Empty => *self = OneOrMany::One(item),
            OneOrMany::Many(ref mut vec) => vec.push(item),
            OneOrMany::One(_) => self.to_mut_vec().push(item),
        }
    }

    /// Replaces all content with a single element.
    ///
    /// Returns the previous content.
    pub fn replace(&mut self, item: T) -> Self {
        mem::replace(self, OneOrMany::One(item))
    }

    /// Takes out all content, leaving an empty value.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(vec: Vec<T>) -> Self {
        OneOrMany::Many(vec)
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//============ Tests =========================================================
