#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

#[cfg(feature = "std")]
pub(crate) type KeyMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<K, V> = BTreeMap<K, V>;

#[cfg(feature = "std")]
pub(crate) type KeySet<K> = HashSet<K>;
#[cfg(not(feature = "std"))]
pub(crate) type KeySet<K> = BTreeSet<K>;

/// Identity of a tracked element (a DOM node handle, an arena index, a widget id...).
///
/// Keys must be cheap to clone: the side tables copy them on every observation.
#[cfg(feature = "std")]
#[doc(hidden)]
pub trait ElementKey: core::hash::Hash + Eq + Clone {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq + Clone> ElementKey for K {}

#[cfg(not(feature = "std"))]
#[doc(hidden)]
pub trait ElementKey: Ord + Clone {}
#[cfg(not(feature = "std"))]
impl<K: Ord + Clone> ElementKey for K {}
