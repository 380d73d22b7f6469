/// A two-slot record of consecutive observations.
///
/// Every write moves the current `new` value into `old` first, so `old` is always what `new` was
/// one observation earlier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoubleBuffer<T> {
    pub old: T,
    pub new: T,
}

impl<T: Copy> DoubleBuffer<T> {
    /// A buffer whose first observation is `value`; `old` starts at `initial`.
    pub fn first(initial: T, value: T) -> Self {
        Self {
            old: initial,
            new: value,
        }
    }

    pub fn push(&mut self, value: T) {
        self.old = self.new;
        self.new = value;
    }

    pub fn map<U>(&self, f: impl Fn(T) -> U) -> DoubleBuffer<U> {
        DoubleBuffer {
            old: f(self.old),
            new: f(self.new),
        }
    }
}

impl<T: PartialEq> DoubleBuffer<T> {
    pub fn changed(&self) -> bool {
        self.old != self.new
    }
}
