#[cfg(feature = "tracing")]
macro_rules! sstrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "smart_scroller", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! sstrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! ssdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "smart_scroller", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! ssdebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! sswarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "smart_scroller", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! sswarn {
    ($($tt:tt)*) => {};
}
