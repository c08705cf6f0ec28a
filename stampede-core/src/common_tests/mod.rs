//! Test bodies shared by every guard implementation.
//!
//! Each function is generic over the list's `Guard` so the same scenarios run
//! against `DeferredGuard` here and `EpochGuard` in `stampede-crossbeam`.
