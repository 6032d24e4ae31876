//! Partition keys for the offence catalogue
//!
//! The registry publishes offences in 26 caches, one per leading letter of the
//! offence code. The set is closed: partitions are never created or removed at
//! runtime, so they are modelled as a plain enum rather than a `char`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator};

#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	PartialOrd,
	Ord,
	Hash,
	Serialize,
	Deserialize,
	Display,
	EnumCount,
	EnumIter,
	EnumString,
)]
#[repr(u8)]
pub enum Partition {
	A,
	B,
	C,
	D,
	E,
	F,
	G,
	H,
	I,
	J,
	K,
	L,
	M,
	N,
	O,
	P,
	Q,
	R,
	S,
	T,
	U,
	V,
	W,
	X,
	Y,
	Z,
}

impl Partition {
	/// Every partition, in key order
	pub fn all() -> impl Iterator<Item = Self> {
		Self::iter()
	}

	pub fn as_char(self) -> char {
		(b'A' + self as u8) as char
	}

	/// Map an upper-case ASCII letter to its partition
	pub fn from_char(c: char) -> Option<Self> {
		if !c.is_ascii_uppercase() {
			return None;
		}

		Self::iter().nth(usize::from(c as u8 - b'A'))
	}
}
